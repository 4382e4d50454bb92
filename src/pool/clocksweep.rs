use log::{debug, warn};

use std::collections::HashMap;
use std::ops::{Index, IndexMut};

use super::clock::ClockReplacer;
use crate::buffer::{entity::*, manager::*};
use crate::config::{BufferPoolConfig, DirtyPolicy};
use crate::storage::{entity::*, manager::*};

struct BufferPool {
    frames: Vec<Frame>,
    // まだ一度も使われていないフレーム。使い切ったら補充しない
    free_list: Vec<FrameId>,
    replacer: ClockReplacer,
}

impl Index<FrameId> for BufferPool {
    type Output = Frame;
    fn index(&self, index: FrameId) -> &Self::Output {
        &self.frames[index.0]
    }
}

impl IndexMut<FrameId> for BufferPool {
    fn index_mut(&mut self, index: FrameId) -> &mut Self::Output {
        &mut self.frames[index.0]
    }
}

impl BufferPool {
    fn new(pool_size: usize) -> Self {
        let mut frames = vec![];
        frames.resize_with(pool_size, Default::default);
        // pop でスロット順に払い出す
        let free_list = (0..pool_size).rev().map(FrameId).collect();
        Self {
            frames,
            free_list,
            replacer: ClockReplacer::new(),
        }
    }

    fn size(&self) -> usize {
        self.frames.len()
    }

    fn get(&self, frame_id: FrameId) -> Option<&Frame> {
        self.frames.get(frame_id.0)
    }

    fn get_mut(&mut self, frame_id: FrameId) -> Option<&mut Frame> {
        self.frames.get_mut(frame_id.0)
    }

    // 空きフレームを優先し、無ければ Clock で追い出す
    fn acquire(&mut self) -> Option<(FrameId, bool)> {
        if let Some(frame_id) = self.free_list.pop() {
            return Some((frame_id, true));
        }
        self.replacer
            .pick_victim(&mut self.frames)
            .map(|frame_id| (frame_id, false))
    }

    // 空きフレームはピン数 0 なのでまとめて数えられる
    fn unpinned_count(&self) -> usize {
        self.frames.iter().filter(|frame| !frame.is_pinned()).count()
    }
}

pub struct ClockSweepManager<T: StorageManager> {
    disk: T,
    pool: BufferPool,
    page_table: HashMap<PageId, FrameId>,
    dirty_policy: DirtyPolicy,
}

impl<T: StorageManager> ClockSweepManager<T> {
    pub fn new(disk: T, pool_size: usize) -> Result<Self, Error> {
        let config = BufferPoolConfig {
            pool_size,
            ..Default::default()
        };
        Self::with_config(disk, &config)
    }

    pub fn with_config(disk: T, config: &BufferPoolConfig) -> Result<Self, Error> {
        config.validate()?;
        let pool = BufferPool::new(config.pool_size);
        let page_table = HashMap::new();
        Ok(Self {
            disk,
            pool,
            page_table,
            dirty_policy: config.dirty_policy,
        })
    }

    pub fn storage(&self) -> &T {
        &self.disk
    }

    pub fn into_storage(self) -> T {
        self.disk
    }

    pub fn resident_count(&self) -> usize {
        self.page_table.len()
    }

    pub fn pin_count(&self, page_id: PageId) -> Option<usize> {
        let &frame_id = self.page_table.get(&page_id)?;
        Some(self.pool[frame_id].pin_count)
    }

    pub fn is_dirty(&self, page_id: PageId) -> Option<bool> {
        let &frame_id = self.page_table.get(&page_id)?;
        Some(self.pool[frame_id].is_dirty)
    }

    // ピン中のページだけ中身を見せる
    pub fn page(&self, handle: &PageHandle) -> Result<&Page, Error> {
        match self.pool.get(handle.frame_id) {
            Some(frame) if frame.holds(handle.page_id) && frame.is_pinned() => {
                Ok(&*frame.data)
            }
            _ => Err(Error::StaleHandle(handle.page_id)),
        }
    }

    pub fn page_mut(&mut self, handle: &PageHandle) -> Result<&mut Page, Error> {
        match self.pool.get_mut(handle.frame_id) {
            Some(frame) if frame.holds(handle.page_id) && frame.is_pinned() => {
                Ok(&mut *frame.data)
            }
            _ => Err(Error::StaleHandle(handle.page_id)),
        }
    }

    fn write_back(&mut self, frame_id: FrameId) -> Result<(), Error> {
        let frame = &mut self.pool[frame_id];
        if frame.is_valid && frame.is_dirty {
            debug!("write back {:?} from frame {:?}", frame.page_id, frame_id);
            self.disk.write_page_data(frame.page_id, &frame.data[..])?;
            frame.is_dirty = false;
        }
        Ok(())
    }

    // フレームを確保し、元のページを書き戻して索引から外す
    fn reclaim_frame(&mut self) -> Result<(FrameId, bool), Error> {
        let (frame_id, from_free_list) = match self.pool.acquire() {
            Some(acquired) => acquired,
            None => {
                warn!("all {} frames are pinned", self.pool.size());
                return Err(Error::NoFreeBuffer);
            }
        };
        if let Err(err) = self.write_back(frame_id) {
            if from_free_list {
                self.pool.free_list.push(frame_id);
            }
            return Err(err);
        }
        let frame = &mut self.pool[frame_id];
        if frame.is_valid {
            debug!("evict {:?} from frame {:?}", frame.page_id, frame_id);
            self.page_table.remove(&frame.page_id);
        }
        frame.invalidate();
        Ok((frame_id, from_free_list))
    }
}

impl<T: StorageManager> BufferPoolManager for ClockSweepManager<T> {
    fn pin_page(&mut self, page_id: PageId, contents: PinContents) -> Result<PageHandle, Error> {
        if !page_id.is_valid() {
            return Err(Error::InvalidPageId(page_id));
        }
        if let Some(&frame_id) = self.page_table.get(&page_id) {
            let frame = &mut self.pool[frame_id];
            if frame.is_pinned() {
                if let PinContents::MemCopy(_) = contents {
                    return Err(Error::PagePinned(page_id));
                }
            }
            frame.pin_count += 1;
            debug!("pin {:?} (hit, pin count {})", page_id, frame.pin_count);
            return Ok(PageHandle { page_id, frame_id });
        }
        let (frame_id, from_free_list) = self.reclaim_frame()?;
        let frame = &mut self.pool[frame_id];
        let loaded = match contents {
            PinContents::DiskIo => self.disk.read_page_data(page_id, &mut frame.data[..]),
            PinContents::MemCopy(page) => {
                frame.data.copy_from_slice(page);
                Ok(())
            }
            PinContents::NoOp => Ok(()),
        };
        if let Err(err) = loaded {
            warn!("failed to load {:?} into frame {:?}: {}", page_id, frame_id, err);
            if from_free_list {
                self.pool.free_list.push(frame_id);
            }
            return Err(err.into());
        }
        frame.load(page_id);
        self.page_table.insert(page_id, frame_id);
        debug!("pin {:?} (miss, frame {:?})", page_id, frame_id);
        Ok(PageHandle { page_id, frame_id })
    }

    fn unpin_page(&mut self, page_id: PageId, is_dirty: bool) -> Result<(), Error> {
        let &frame_id = self
            .page_table
            .get(&page_id)
            .ok_or(Error::PageNotResident(page_id))?;
        let frame = &mut self.pool[frame_id];
        if !frame.is_pinned() {
            return Err(Error::PageNotPinned(page_id));
        }
        frame.is_dirty = match self.dirty_policy {
            DirtyPolicy::Overwrite => is_dirty,
            DirtyPolicy::Accumulate => frame.is_dirty || is_dirty,
        };
        frame.pin_count -= 1;
        if frame.pin_count == 0 {
            frame.ref_bit = true;
        }
        debug!(
            "unpin {:?} (dirty {}, pin count {})",
            page_id, frame.is_dirty, frame.pin_count
        );
        Ok(())
    }

    fn new_page(&mut self, first_page: &Page, run_size: usize) -> Result<PageHandle, Error> {
        if run_size == 0 {
            return Err(Error::InvalidRunSize);
        }
        // 採番してから失敗するとディスク上のページが漏れるので先に確認する
        if self.unpinned_count() == 0 {
            warn!("cannot allocate a new page: all frames are pinned");
            return Err(Error::NoFreeBuffer);
        }
        let page_id = self.disk.allocate_pages(run_size)?;
        debug!("allocated {} page(s) from {:?}", run_size, page_id);
        self.pin_page(page_id, PinContents::MemCopy(first_page))
    }

    fn free_page(&mut self, page_id: PageId) -> Result<(), Error> {
        let frame_id = self.page_table.get(&page_id).copied();
        if let Some(frame_id) = frame_id {
            if self.pool[frame_id].is_pinned() {
                return Err(Error::PagePinned(page_id));
            }
        }
        self.disk.deallocate_page(page_id)?;
        // 解放されたページは書き戻さずに捨てる
        if let Some(frame_id) = frame_id {
            self.pool[frame_id].invalidate();
            self.page_table.remove(&page_id);
        }
        debug!("free {:?}", page_id);
        Ok(())
    }

    fn flush_page(&mut self, page_id: PageId) -> Result<(), Error> {
        let &frame_id = self
            .page_table
            .get(&page_id)
            .ok_or(Error::PageNotResident(page_id))?;
        self.write_back(frame_id)
    }

    fn flush_all(&mut self) -> Result<(), Error> {
        // HashMap の順序に依らないようスロット順で書き出す
        for i in 0..self.pool.size() {
            self.write_back(FrameId(i))?;
        }
        self.disk.sync()?;
        Ok(())
    }

    fn pool_size(&self) -> usize {
        self.pool.size()
    }

    fn unpinned_count(&self) -> usize {
        self.pool.unpinned_count()
    }
}
