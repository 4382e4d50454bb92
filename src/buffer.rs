// フレーム記述子とピンの種類
pub mod entity;

// buffer pool manager のインターフェースとエラー
pub mod manager;
