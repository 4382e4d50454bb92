use std::io::{Error, ErrorKind, Result};

use crate::storage::{entity::*, manager::*};

pub struct MemoryManager {
    heap: Vec<Page>,
    // 解放済みで再利用できるページ
    free_pages: Vec<PageId>,
}

impl MemoryManager {
    pub fn new() -> Self {
        Self {
            heap: vec![],
            free_pages: vec![],
        }
    }

    pub fn num_pages(&self) -> usize {
        self.heap.len()
    }

    fn slot(&mut self, page_id: PageId) -> Result<&mut Page> {
        if self.free_pages.contains(&page_id) {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("{:?} is deallocated", page_id),
            ));
        }
        self.heap.get_mut(page_id.to_u64() as usize).ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidInput,
                format!("{:?} is not allocated", page_id),
            )
        })
    }
}

impl Default for MemoryManager {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageManager for MemoryManager {
    fn allocate_pages(&mut self, run_size: usize) -> Result<PageId> {
        if run_size == 0 {
            return Err(Error::new(ErrorKind::InvalidInput, "empty run"));
        }
        if run_size == 1 {
            if let Some(page_id) = self.free_pages.pop() {
                *self.slot(page_id)? = [0; PAGE_SIZE];
                return Ok(page_id);
            }
        }
        let page_id = PageId(self.heap.len() as u64);
        self.heap.resize(self.heap.len() + run_size, [0; PAGE_SIZE]);
        Ok(page_id)
    }
    fn deallocate_page(&mut self, page_id: PageId) -> Result<()> {
        self.slot(page_id)?;
        self.free_pages.push(page_id);
        Ok(())
    }
    fn read_page_data(&mut self, page_id: PageId, data: &mut [u8]) -> Result<()> {
        let page = self.slot(page_id)?;
        data.copy_from_slice(&page[..data.len()]);
        Ok(())
    }
    fn write_page_data(&mut self, page_id: PageId, data: &[u8]) -> Result<()> {
        let page = self.slot(page_id)?;
        page[..data.len()].copy_from_slice(data);
        Ok(())
    }
    fn sync(&mut self) -> Result<()> {
        Ok(())
    }
}
