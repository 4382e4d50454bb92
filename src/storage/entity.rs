pub const PAGE_SIZE: usize = 4096;

pub type Page = [u8; PAGE_SIZE];

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct PageId(pub u64);
impl PageId {
    pub const INVALID_PAGE_ID: PageId = PageId(u64::MAX);

    pub fn to_u64(self) -> u64 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self != Self::INVALID_PAGE_ID
    }

    // n 番目の後続ページ
    pub fn offset(self, n: u64) -> PageId {
        PageId(self.0 + n)
    }
}

impl Default for PageId {
    fn default() -> Self {
        Self::INVALID_PAGE_ID
    }
}
