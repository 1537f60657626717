//! Slot arena addressed by stable integer handles.
//!
//! Nodes of the recency list live here; links between them are `SlotId`s,
//! never references, so the node graph has a single owner and no cycles.
//! Freed slots are recycled through a free list.

use std::collections::TryReserveError;

/// Stable handle into a [`SlotArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(pub(crate) usize);

impl SlotId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
pub struct SlotArena<T> {
    slots: Vec<Option<T>>,
    free_list: Vec<usize>,
    len: usize,
}

impl<T> SlotArena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Makes sure the next [`insert`](Self::insert) does not allocate.
    ///
    /// A recycled slot needs no new storage, but the free list has to be able
    /// to take the slot back on removal, so both vectors are reserved.
    pub fn try_reserve_one(&mut self) -> Result<(), TryReserveError> {
        if self.free_list.is_empty() {
            self.slots.try_reserve(1)?;
        }
        let needed = self.slots.len() + 1;
        if self.free_list.capacity() < needed {
            self.free_list.try_reserve(needed - self.free_list.len())?;
        }
        Ok(())
    }

    pub fn insert(&mut self, value: T) -> SlotId {
        let idx = if let Some(idx) = self.free_list.pop() {
            self.slots[idx] = Some(value);
            idx
        } else {
            self.slots.push(Some(value));
            self.slots.len() - 1
        };
        self.len += 1;
        SlotId(idx)
    }

    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        let slot = self.slots.get_mut(id.0)?;
        let value = slot.take()?;
        self.free_list.push(id.0);
        self.len -= 1;
        Some(value)
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.slots.get(id.0).and_then(|slot| slot.as_ref())
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.slots.get_mut(id.0).and_then(|slot| slot.as_mut())
    }

    pub fn contains(&self, id: SlotId) -> bool {
        self.slots
            .get(id.0)
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Empties the arena and hands every live value back to the caller.
    ///
    /// The values are returned rather than dropped in place so their
    /// destructors can run wherever the caller decides.
    pub fn take_all(&mut self) -> Vec<T> {
        self.free_list.clear();
        self.len = 0;
        std::mem::take(&mut self.slots)
            .into_iter()
            .flatten()
            .collect()
    }
}

impl<T> Default for SlotArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_arena_insert_remove_reuse() {
        let mut arena = SlotArena::new();
        let id1 = arena.insert("a");
        let id2 = arena.insert("b");
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(id1), Some(&"a"));
        assert_eq!(arena.get(id2), Some(&"b"));

        assert_eq!(arena.remove(id1), Some("a"));
        assert_eq!(arena.len(), 1);
        assert!(!arena.contains(id1));

        let id3 = arena.insert("c");
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(id3), Some(&"c"));
        assert_eq!(id1.index(), id3.index());
    }

    #[test]
    fn remove_twice_is_none() {
        let mut arena = SlotArena::new();
        let id = arena.insert(7u32);
        assert_eq!(arena.remove(id), Some(7));
        assert_eq!(arena.remove(id), None);
        assert!(arena.is_empty());
    }

    #[test]
    fn take_all_returns_live_values_only() {
        let mut arena = SlotArena::new();
        let a = arena.insert(1);
        arena.insert(2);
        arena.insert(3);
        arena.remove(a);

        let mut values = arena.take_all();
        values.sort();
        assert_eq!(values, vec![2, 3]);
        assert!(arena.is_empty());

        let id = arena.insert(9);
        assert_eq!(id.index(), 0);
    }

    #[test]
    fn reserve_then_insert() {
        let mut arena: SlotArena<u64> = SlotArena::new();
        arena.try_reserve_one().unwrap();
        let id = arena.insert(42);
        assert_eq!(arena.get_mut(id).map(|v| *v), Some(42));
    }
}
