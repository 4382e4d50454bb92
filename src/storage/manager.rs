use super::entity::PageId;

use std::io::Result;

pub trait StorageManager {
    // 連続した run_size 個のページIDを採番し、先頭を返す
    fn allocate_pages(&mut self, run_size: usize) -> Result<PageId>;
    // ページIDを解放する
    fn deallocate_page(&mut self, page_id: PageId) -> Result<()>;
    // ページのデータを読み出す
    fn read_page_data(&mut self, page_id: PageId, data: &mut [u8]) -> Result<()>;
    // データをページに書き出す
    fn write_page_data(&mut self, page_id: PageId, data: &[u8]) -> Result<()>;
    // 同期処理
    fn sync(&mut self) -> Result<()>;
}
