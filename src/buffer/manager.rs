use super::entity::{PageHandle, PinContents};
use crate::storage::entity::{Page, PageId};

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("pool exhausted: all frames pinned")]
    NoFreeBuffer,
    #[error("page {0:?} is not in the buffer pool")]
    PageNotResident(PageId),
    #[error("page {0:?} is not pinned")]
    PageNotPinned(PageId),
    #[error("page {0:?} is pinned")]
    PagePinned(PageId),
    #[error("{0:?} is not a valid page id")]
    InvalidPageId(PageId),
    #[error("handle for page {0:?} is no longer pinned")]
    StaleHandle(PageId),
    #[error("run size must be at least 1")]
    InvalidRunSize,
    #[error("pool size must be at least 1")]
    InvalidPoolSize,
    #[error("buffer pool lock poisoned")]
    Poisoned,
}

impl Error {
    // 全フレームがピンされている。呼び出し側が何か unpin してから再試行する
    pub fn is_capacity(&self) -> bool {
        matches!(self, Error::NoFreeBuffer)
    }

    // 呼び出し側のプロトコル違反
    pub fn is_argument(&self) -> bool {
        matches!(
            self,
            Error::InvalidPageId(_)
                | Error::PageNotResident(_)
                | Error::PageNotPinned(_)
                | Error::PagePinned(_)
                | Error::StaleHandle(_)
                | Error::InvalidRunSize
        )
    }
}

pub trait BufferPoolManager {
    // ページをピンする
    fn pin_page(&mut self, page_id: PageId, contents: PinContents) -> Result<PageHandle, Error>;
    // ピンを外す
    fn unpin_page(&mut self, page_id: PageId, is_dirty: bool) -> Result<(), Error>;
    // 連続ページを確保し、先頭を first_page の内容でピンする
    fn new_page(&mut self, first_page: &Page, run_size: usize) -> Result<PageHandle, Error>;
    // ページを解放する
    fn free_page(&mut self, page_id: PageId) -> Result<(), Error>;
    // 1ページをストレージに書き出す
    fn flush_page(&mut self, page_id: PageId) -> Result<(), Error>;
    // ストレージに書き出す
    fn flush_all(&mut self) -> Result<(), Error>;
    // フレームの総数
    fn pool_size(&self) -> usize;
    // ピンされていないフレームの数
    fn unpinned_count(&self) -> usize;
}
