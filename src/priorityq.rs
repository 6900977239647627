// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Port of GLU libtess priorityq-heap.c
//
// The sweep's event queue: an indexed binary min-heap of vertices keyed by
// (s, t, id). Handles stay valid until the entry is extracted or deleted,
// so a queued vertex can be withdrawn when it is merged into another.

use crate::geom::Real;
use crate::mesh::{VertIdx, INVALID};
use std::cmp::Ordering;

/// Total event order: s, then t, then vertex id. Two distinct vertices
/// never compare equal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EventKey {
    pub s: Real,
    pub t: Real,
    pub id: u32,
}

impl EventKey {
    pub fn cmp_order(&self, other: &EventKey) -> Ordering {
        self.s
            .total_cmp(&other.s)
            .then(self.t.total_cmp(&other.t))
            .then(self.id.cmp(&other.id))
    }

    #[inline]
    fn leq(&self, other: &EventKey) -> bool {
        self.cmp_order(other) != Ordering::Greater
    }
}

#[derive(Clone, Debug)]
struct Entry {
    key: EventKey,
    vertex: VertIdx,
    /// Position in `heap`, or INVALID while the handle is on the free list.
    pos: u32,
}

#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    /// Heap order, holding handles.
    heap: Vec<u32>,
    /// Entries indexed by handle.
    entries: Vec<Entry>,
    free_handles: Vec<u32>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the queue from a batch in O(n).
    pub fn from_events(events: impl IntoIterator<Item = (VertIdx, EventKey)>) -> (Self, Vec<u32>) {
        let mut pq = EventQueue::new();
        let mut handles = Vec::new();
        for (vertex, key) in events {
            let handle = pq.entries.len() as u32;
            pq.entries.push(Entry {
                key,
                vertex,
                pos: pq.heap.len() as u32,
            });
            pq.heap.push(handle);
            handles.push(handle);
        }
        for i in (0..pq.heap.len() / 2).rev() {
            pq.sift_down(i);
        }
        (pq, handles)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn insert(&mut self, vertex: VertIdx, key: EventKey) -> u32 {
        let pos = self.heap.len() as u32;
        let handle = match self.free_handles.pop() {
            Some(h) => {
                self.entries[h as usize] = Entry { key, vertex, pos };
                h
            }
            None => {
                self.entries.push(Entry { key, vertex, pos });
                (self.entries.len() - 1) as u32
            }
        };
        self.heap.push(handle);
        self.sift_up(pos as usize);
        handle
    }

    pub fn minimum(&self) -> Option<VertIdx> {
        self.heap.first().map(|&h| self.entries[h as usize].vertex)
    }

    pub fn extract_min(&mut self) -> Option<VertIdx> {
        let &h = self.heap.first()?;
        let vertex = self.entries[h as usize].vertex;
        self.remove_at(0);
        Some(vertex)
    }

    /// Withdraws a queued entry. Stale handles are ignored.
    pub fn delete(&mut self, handle: u32) {
        let Some(entry) = self.entries.get(handle as usize) else {
            return;
        };
        if entry.pos == INVALID {
            return;
        }
        self.remove_at(entry.pos as usize);
    }

    fn remove_at(&mut self, pos: usize) {
        let handle = self.heap[pos];
        let last = self.heap.len() - 1;
        self.heap.swap(pos, last);
        self.heap.pop();
        self.entries[handle as usize].pos = INVALID;
        self.free_handles.push(handle);

        if pos < self.heap.len() {
            let moved = self.heap[pos];
            self.entries[moved as usize].pos = pos as u32;
            if pos > 0 && self.key_at(pos).leq(&self.key_at((pos - 1) / 2)) {
                self.sift_up(pos);
            } else {
                self.sift_down(pos);
            }
        }
    }

    #[inline]
    fn key_at(&self, pos: usize) -> EventKey {
        self.entries[self.heap[pos] as usize].key
    }

    fn place(&mut self, pos: usize, handle: u32) {
        self.heap[pos] = handle;
        self.entries[handle as usize].pos = pos as u32;
    }

    fn sift_up(&mut self, mut pos: usize) {
        let handle = self.heap[pos];
        let key = self.entries[handle as usize].key;
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if self.key_at(parent).leq(&key) {
                break;
            }
            let moved = self.heap[parent];
            self.place(pos, moved);
            pos = parent;
        }
        self.place(pos, handle);
    }

    fn sift_down(&mut self, mut pos: usize) {
        let handle = self.heap[pos];
        let key = self.entries[handle as usize].key;
        let n = self.heap.len();
        loop {
            let mut child = 2 * pos + 1;
            if child >= n {
                break;
            }
            if child + 1 < n && self.key_at(child + 1).leq(&self.key_at(child)) {
                child += 1;
            }
            if key.leq(&self.key_at(child)) {
                break;
            }
            let moved = self.heap[child];
            self.place(pos, moved);
            pos = child;
        }
        self.place(pos, handle);
    }
}
