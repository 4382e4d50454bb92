use std::sync::{Arc, Mutex, MutexGuard};

use super::clocksweep::ClockSweepManager;
use crate::buffer::{entity::*, manager::*};
use crate::storage::{entity::*, manager::*};

// 複数スレッドから使うときはプール全体を1つのロックで守る。
// ディスク I/O もロックを握ったまま行う
pub struct SharedBufferPool<T: StorageManager> {
    inner: Arc<Mutex<ClockSweepManager<T>>>,
}

impl<T: StorageManager> Clone for SharedBufferPool<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: StorageManager> SharedBufferPool<T> {
    pub fn new(bufmgr: ClockSweepManager<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(bufmgr)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, ClockSweepManager<T>>, Error> {
        self.inner.lock().map_err(|_| Error::Poisoned)
    }

    pub fn pin_page(&self, page_id: PageId, contents: PinContents) -> Result<PageHandle, Error> {
        self.lock()?.pin_page(page_id, contents)
    }

    pub fn unpin_page(&self, page_id: PageId, is_dirty: bool) -> Result<(), Error> {
        self.lock()?.unpin_page(page_id, is_dirty)
    }

    pub fn new_page(&self, first_page: &Page, run_size: usize) -> Result<PageHandle, Error> {
        self.lock()?.new_page(first_page, run_size)
    }

    pub fn free_page(&self, page_id: PageId) -> Result<(), Error> {
        self.lock()?.free_page(page_id)
    }

    pub fn flush_page(&self, page_id: PageId) -> Result<(), Error> {
        self.lock()?.flush_page(page_id)
    }

    pub fn flush_all(&self) -> Result<(), Error> {
        self.lock()?.flush_all()
    }

    pub fn pool_size(&self) -> Result<usize, Error> {
        Ok(self.lock()?.pool_size())
    }

    pub fn unpinned_count(&self) -> Result<usize, Error> {
        Ok(self.lock()?.unpinned_count())
    }

    // ページの参照はロックの外に持ち出させない
    pub fn with_page<R>(
        &self,
        handle: &PageHandle,
        f: impl FnOnce(&Page) -> R,
    ) -> Result<R, Error> {
        let bufmgr = self.lock()?;
        let page = bufmgr.page(handle)?;
        Ok(f(page))
    }

    pub fn with_page_mut<R>(
        &self,
        handle: &PageHandle,
        f: impl FnOnce(&mut Page) -> R,
    ) -> Result<R, Error> {
        let mut bufmgr = self.lock()?;
        let page = bufmgr.page_mut(handle)?;
        Ok(f(page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk::memory::MemoryManager;
    use std::thread;

    #[test]
    fn concurrent_pin_unpin() {
        let mut memory = MemoryManager::new();
        let first = memory.allocate_pages(16).unwrap();
        let bufmgr = ClockSweepManager::new(memory, 4).unwrap();
        let pool = SharedBufferPool::new(bufmgr);

        let workers: Vec<_> = (0..4u64)
            .map(|worker| {
                let pool = pool.clone();
                thread::spawn(move || {
                    for i in 0..4u64 {
                        let page_id = first.offset(worker * 4 + i);
                        let handle = pool.pin_page(page_id, PinContents::DiskIo).unwrap();
                        pool.with_page_mut(&handle, |page| {
                            page[..8].copy_from_slice(&page_id.to_u64().to_le_bytes())
                        })
                        .unwrap();
                        pool.unpin_page(page_id, true).unwrap();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        assert_eq!(4, pool.unpinned_count().unwrap());
        pool.flush_all().unwrap();

        for n in 0..16u64 {
            let page_id = first.offset(n);
            let handle = pool.pin_page(page_id, PinContents::DiskIo).unwrap();
            let stored = pool
                .with_page(&handle, |page| {
                    let mut bytes = [0u8; 8];
                    bytes.copy_from_slice(&page[..8]);
                    u64::from_le_bytes(bytes)
                })
                .unwrap();
            assert_eq!(page_id.to_u64(), stored);
            pool.unpin_page(page_id, false).unwrap();
        }
    }

    #[test]
    fn capacity_error_does_not_block() {
        let bufmgr = ClockSweepManager::new(MemoryManager::new(), 1).unwrap();
        let pool = SharedBufferPool::new(bufmgr);
        let handle = pool.new_page(&[1u8; PAGE_SIZE], 2).unwrap();
        let err = pool
            .pin_page(handle.page_id().offset(1), PinContents::DiskIo)
            .unwrap_err();
        assert!(err.is_capacity());

        pool.unpin_page(handle.page_id(), false).unwrap();
        assert!(pool.with_page(&handle, |_| ()).is_err());
        pool.free_page(handle.page_id()).unwrap();
        assert_eq!(1, pool.pool_size().unwrap());
        assert_eq!(1, pool.unpinned_count().unwrap());
    }
}
