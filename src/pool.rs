// Clock (second-chance) による追い出し方針
pub mod clock;

// Clock-sweep を使った buffer pool による buffermanager の具体的な実装
pub mod clocksweep;

// スレッド間で共有するためのラッパー
pub mod shared;
