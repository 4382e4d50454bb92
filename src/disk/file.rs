use std::fs::{File, OpenOptions};
use std::io::{prelude::*, Error, ErrorKind, Result, SeekFrom};
use std::path::Path;

use crate::storage::{entity::*, manager::*};

// ファイル上のオフセット。u64 に収まらない ID はエラー
fn page_offset(page_id: PageId) -> Result<u64> {
    page_id
        .to_u64()
        .checked_mul(PAGE_SIZE as u64)
        .ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidInput,
                format!("{:?} is out of range", page_id),
            )
        })
}

pub struct DiskManager {
    // ヒープファイルのファイルディスクリプタ
    heap_file: File,
    // 採番するページを決めるカウンタ
    next_page_id: u64,
    // 解放済みで再利用できるページ。ファイルには残さない
    free_pages: Vec<PageId>,
}

impl DiskManager {
    pub fn new(heap_file: File) -> Result<Self> {
        let heap_file_size = heap_file.metadata()?.len();
        let next_page_id = heap_file_size / PAGE_SIZE as u64;
        Ok(Self {
            heap_file,
            next_page_id,
            free_pages: vec![],
        })
    }

    pub fn open(heap_file_path: impl AsRef<Path>) -> Result<Self> {
        let heap_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(heap_file_path)?;
        Self::new(heap_file)
    }

    pub fn num_pages(&self) -> u64 {
        self.next_page_id
    }

    fn check_allocated(&self, page_id: PageId) -> Result<()> {
        if page_id.to_u64() >= self.next_page_id || self.free_pages.contains(&page_id) {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("{:?} is not allocated", page_id),
            ));
        }
        Ok(())
    }

    fn seek_page(&mut self, page_id: PageId) -> Result<()> {
        // オフセットを計算
        let offset = page_offset(page_id)?;
        // ページ先頭へシーク
        self.heap_file.seek(SeekFrom::Start(offset))?;
        Ok(())
    }
}

impl StorageManager for DiskManager {
    fn allocate_pages(&mut self, run_size: usize) -> Result<PageId> {
        if run_size == 0 {
            return Err(Error::new(ErrorKind::InvalidInput, "empty run"));
        }
        if run_size == 1 {
            if let Some(page_id) = self.free_pages.pop() {
                self.write_page_data(page_id, &[0; PAGE_SIZE])?;
                return Ok(page_id);
            }
        }
        let page_id = self.next_page_id;
        let next_page_id = page_id
            .checked_add(run_size as u64)
            .ok_or_else(|| Error::new(ErrorKind::InvalidInput, "run is out of range"))?;
        // ゼロで埋めて伸ばすので、確保直後のページも読み出せる
        self.heap_file.set_len(page_offset(PageId(next_page_id))?)?;
        self.next_page_id = next_page_id;
        Ok(PageId(page_id))
    }
    fn deallocate_page(&mut self, page_id: PageId) -> Result<()> {
        self.check_allocated(page_id)?;
        self.free_pages.push(page_id);
        Ok(())
    }
    fn read_page_data(&mut self, page_id: PageId, data: &mut [u8]) -> Result<()> {
        self.check_allocated(page_id)?;
        self.seek_page(page_id)?;
        // データを読み出す
        self.heap_file.read_exact(data)
    }
    fn write_page_data(&mut self, page_id: PageId, data: &[u8]) -> Result<()> {
        self.check_allocated(page_id)?;
        self.seek_page(page_id)?;
        // データを書きこむ
        self.heap_file.write_all(data)
    }
    fn sync(&mut self) -> Result<()> {
        self.heap_file.flush()?;
        self.heap_file.sync_all()
    }
}
