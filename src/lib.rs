pub mod buffer;
pub mod config;
pub mod disk;
pub mod pool;
pub mod storage;
