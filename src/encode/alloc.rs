//! Component address and circuit-state id allocation.
//!
//! Generated components must not collide with anything already in the save,
//! so both counters continue from the maxima found in the file.

use crate::save::SaveFile;

/// Hands out fresh component addresses and circuit-state ids.
#[derive(Debug)]
pub struct IdAllocator {
    last_address: u32,
    last_state: i32,
}

impl IdAllocator {
    /// Start allocating after the highest ids already present in `save`.
    pub fn seeded_from(save: &SaveFile) -> Self {
        Self {
            last_address: save.max_component_address(),
            last_state: save.max_state_id(),
        }
    }

    /// Next unused component address.
    pub fn address(&mut self) -> u32 {
        self.last_address += 1;
        self.last_address
    }

    /// Next unused circuit-state id.
    pub fn state(&mut self) -> i32 {
        self.last_state += 1;
        self.last_state
    }

    /// `count` consecutive fresh addresses.
    pub fn addresses(&mut self, count: usize) -> Vec<u32> {
        std::iter::repeat_with(|| self.address()).take(count).collect()
    }

    /// `count` consecutive fresh state ids.
    pub fn states(&mut self, count: usize) -> Vec<i32> {
        std::iter::repeat_with(|| self.state()).take(count).collect()
    }

    /// Highest state id handed out (or found in the save) so far.
    pub fn last_state(&self) -> i32 {
        self.last_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::save::{Component, SaveFile};

    #[test]
    fn fresh_save_allocates_from_one() {
        let save = SaveFile::empty_world([0, 91, 3, 1015]);
        let mut alloc = IdAllocator::seeded_from(&save);
        assert_eq!(alloc.address(), 1);
        assert_eq!(alloc.address(), 2);
        assert_eq!(alloc.state(), 1);
    }

    #[test]
    fn allocation_continues_past_existing_ids() {
        let mut save = SaveFile::empty_world([0, 91, 3, 1015]);
        save.components.push(Component {
            address: 40,
            parent: 0,
            type_id: 1,
            position: [0.0; 3],
            rotation: [0.0, 0.0, 0.0, 1.0],
            inputs: vec![17],
            outputs: vec![23],
            custom_data: None,
        });
        let mut alloc = IdAllocator::seeded_from(&save);
        assert_eq!(alloc.address(), 41);
        assert_eq!(alloc.state(), 24);
    }

    #[test]
    fn batch_allocation_is_consecutive() {
        let save = SaveFile::empty_world([0, 91, 3, 1015]);
        let mut alloc = IdAllocator::seeded_from(&save);
        assert_eq!(alloc.addresses(3), vec![1, 2, 3]);
        assert_eq!(alloc.states(2), vec![1, 2]);
        assert_eq!(alloc.last_state(), 2);
    }
}
