use serde::{Deserialize, Serialize};

/// Block pinned for a historical query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRef {
    pub number: u64,
    pub timestamp: u64,
}

impl BlockRef {
    pub fn new(number: u64, timestamp: u64) -> Self {
        Self { number, timestamp }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockSlot {
    OneDay,
    TwoDay,
}

/// Transition applied to a [`BlockState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockEvent {
    /// First resolution of a slot
    Set(BlockSlot, BlockRef),
    /// Re-resolution on a later poll tick
    Update(BlockSlot, BlockRef),
}

/// Blocks currently used to pin the -24h and -48h queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockState {
    pub one_day: Option<BlockRef>,
    pub two_day: Option<BlockRef>,
}

impl BlockState {
    /// Returns the state after `event`. Both tags overwrite only their slot.
    pub fn reduce(self, event: BlockEvent) -> Self {
        let (slot, block) = match event {
            BlockEvent::Set(slot, block) | BlockEvent::Update(slot, block) => (slot, block),
        };
        let mut next = self;
        match slot {
            BlockSlot::OneDay => next.one_day = Some(block),
            BlockSlot::TwoDay => next.two_day = Some(block),
        }
        next
    }

    /// Block numbers for the -24h and -48h queries once both are known.
    pub fn historical(&self) -> Option<(u64, u64)> {
        Some((self.one_day?.number, self.two_day?.number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduce_touches_only_its_slot() {
        let state = BlockState::default()
            .reduce(BlockEvent::Set(BlockSlot::OneDay, BlockRef::new(100, 1)))
            .reduce(BlockEvent::Set(BlockSlot::TwoDay, BlockRef::new(50, 0)));
        assert_eq!(state.historical(), Some((100, 50)));
        assert_eq!(BlockState::default().historical(), None);

        let updated = state.reduce(BlockEvent::Update(BlockSlot::OneDay, BlockRef::new(101, 2)));
        assert_eq!(updated.historical(), Some((101, 50)));
        // the previous state value is untouched
        assert_eq!(state.one_day.map(|b| b.number), Some(100));
    }
}
