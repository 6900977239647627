// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Generational slot arena, the Rust stand-in for libtess bucketalloc.c/h.
//
// Slots are addressed by plain u32 indices inside the tessellator. Freed
// slots become tombstones on a free list and their generation is bumped, so
// a `Handle` captured before the free no longer resolves.

use std::ops::{Index, IndexMut};

/// A generation-checked reference to an arena slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Handle {
    pub index: u32,
    pub generation: u32,
}

#[derive(Clone, Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

#[derive(Clone, Debug)]
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free_list: Vec<u32>,
    live: usize,
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Arena {
            slots: Vec::new(),
            free_list: Vec::new(),
            live: 0,
        }
    }

    /// Stores `value`, reusing a tombstoned slot when one is available.
    /// Returns `None` once the u32 index space is exhausted.
    pub fn alloc(&mut self, value: T) -> Option<u32> {
        self.live += 1;
        if let Some(idx) = self.free_list.pop() {
            self.slots[idx as usize].value = Some(value);
            return Some(idx);
        }
        let idx = u32::try_from(self.slots.len()).ok().filter(|&i| i != u32::MAX);
        let Some(idx) = idx else {
            self.live -= 1;
            return None;
        };
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        Some(idx)
    }

    /// Tombstones the slot and returns its value. Freeing a vacant slot is a
    /// no-op returning `None`.
    pub fn free(&mut self, idx: u32) -> Option<T> {
        let slot = self.slots.get_mut(idx as usize)?;
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(idx);
        self.live -= 1;
        Some(value)
    }

    pub fn get(&self, idx: u32) -> Option<&T> {
        self.slots.get(idx as usize)?.value.as_ref()
    }

    pub fn get_mut(&mut self, idx: u32) -> Option<&mut T> {
        self.slots.get_mut(idx as usize)?.value.as_mut()
    }

    pub fn contains(&self, idx: u32) -> bool {
        self.get(idx).is_some()
    }

    /// Handle for a live slot.
    pub fn handle(&self, idx: u32) -> Option<Handle> {
        let slot = self.slots.get(idx as usize)?;
        slot.value.as_ref().map(|_| Handle {
            index: idx,
            generation: slot.generation,
        })
    }

    /// Resolves a handle, failing if the slot was freed since the handle
    /// was taken (even if it has been reused).
    pub fn resolve(&self, handle: Handle) -> Option<&T> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_ref()
    }

    /// Number of live slots.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Live slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.value.as_ref().map(|v| (i as u32, v)))
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<u32> for Arena<T> {
    type Output = T;

    #[inline]
    fn index(&self, idx: u32) -> &T {
        match self.get(idx) {
            Some(v) => v,
            None => panic!("arena slot {idx} is vacant"),
        }
    }
}

impl<T> IndexMut<u32> for Arena<T> {
    #[inline]
    fn index_mut(&mut self, idx: u32) -> &mut T {
        match self.get_mut(idx) {
            Some(v) => v,
            None => panic!("arena slot {idx} is vacant"),
        }
    }
}
