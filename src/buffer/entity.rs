use crate::storage::entity::{Page, PageId, PAGE_SIZE};

#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash)]
pub struct FrameId(pub usize);

// ピン時にフレームの中身をどう用意するか
#[derive(Debug, Clone, Copy)]
pub enum PinContents<'a> {
    // ディスクから読み込む
    DiskIo,
    // 渡されたページをコピーする (I/O なし)
    MemCopy(&'a Page),
    // 何もしない。呼び出し側がページ全体を上書きする前提
    NoOp,
}

// ピン中のページを指すハンドル。フレームへの参照は外に出さない
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct PageHandle {
    pub(crate) page_id: PageId,
    pub(crate) frame_id: FrameId,
}

impl PageHandle {
    pub fn page_id(&self) -> PageId {
        self.page_id
    }
}

#[derive(Debug)]
pub struct Frame {
    pub(crate) data: Box<Page>,
    pub(crate) page_id: PageId,
    pub(crate) is_valid: bool,
    pub(crate) is_dirty: bool,
    pub(crate) pin_count: usize,
    pub(crate) ref_bit: bool,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            data: Box::new([0u8; PAGE_SIZE]),
            page_id: Default::default(),
            is_valid: false,
            is_dirty: false,
            pin_count: 0,
            ref_bit: false,
        }
    }
}

impl Frame {
    pub fn is_pinned(&self) -> bool {
        self.pin_count > 0
    }

    pub fn holds(&self, page_id: PageId) -> bool {
        self.is_valid && self.page_id == page_id
    }

    // 新しいページを載せた直後の状態にする
    pub(crate) fn load(&mut self, page_id: PageId) {
        self.page_id = page_id;
        self.is_valid = true;
        self.is_dirty = false;
        self.pin_count = 1;
        self.ref_bit = true;
    }

    // 中身は捨てて空きフレームに戻す
    pub(crate) fn invalidate(&mut self) {
        self.page_id = PageId::INVALID_PAGE_ID;
        self.is_valid = false;
        self.is_dirty = false;
        self.pin_count = 0;
        self.ref_bit = false;
    }
}
