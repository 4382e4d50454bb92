// ヒープファイルを使った storagemanager の具体的な実装
pub mod file;

// メモリ上の storagemanager。テストやデモ用
pub mod memory;
