use log::trace;

use crate::buffer::entity::{Frame, FrameId};

// Clock (second-chance)。走査順はフレームテーブルのスロット順で固定
#[derive(Debug, Default)]
pub struct ClockReplacer {
    hand: FrameId,
}

impl ClockReplacer {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn hand(&self) -> FrameId {
        self.hand
    }

    fn advance(&mut self, size: usize) {
        self.hand = FrameId((self.hand.0 + 1) % size);
    }

    // 最大2周する。1周目で ref_bit を落とされたフレームは2周目で選ばれうる
    pub fn pick_victim(&mut self, frames: &mut [Frame]) -> Option<FrameId> {
        let size = frames.len();
        if size == 0 {
            return None;
        }
        if self.hand.0 >= size {
            self.hand = FrameId::default();
        }
        for _ in 0..size * 2 {
            let frame_id = self.hand;
            let frame = &mut frames[frame_id.0];
            self.advance(size);
            if !frame.is_valid {
                trace!("clock: frame {:?} is invalid, take it", frame_id);
                return Some(frame_id);
            }
            if frame.is_pinned() {
                continue;
            }
            if frame.ref_bit {
                trace!("clock: second chance for frame {:?}", frame_id);
                frame.ref_bit = false;
            } else {
                trace!("clock: victim frame {:?} ({:?})", frame_id, frame.page_id);
                return Some(frame_id);
            }
        }
        None
    }
}
