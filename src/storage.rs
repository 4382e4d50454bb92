// ページIDとページ本体
pub mod entity;

// ディスク側の協調者 (ページの採番・解放・読み書き)
pub mod manager;
