// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Port of GLU libtess dict-list.c/h
//
// A sorted circular doubly-linked list holding the sweep's active regions,
// ordered by a caller-supplied `leq`. Keys are region indices; the head
// sentinel (node 0) carries no key. Nodes live in an arena so deleted
// slots are reused by later inserts.

use crate::arena::Arena;
use crate::mesh::INVALID;

pub type NodeIdx = u32;

pub const DICT_HEAD: NodeIdx = 0;

#[derive(Clone, Debug)]
pub struct DictNode {
    /// Region index, INVALID for the head.
    pub key: u32,
    pub next: NodeIdx,
    pub prev: NodeIdx,
}

#[derive(Clone, Debug)]
pub struct Dict {
    nodes: Arena<DictNode>,
}

impl Dict {
    pub fn new() -> Self {
        let mut nodes = Arena::new();
        let head = nodes.alloc(DictNode {
            key: INVALID,
            next: DICT_HEAD,
            prev: DICT_HEAD,
        });
        debug_assert_eq!(head, Some(DICT_HEAD));
        Dict { nodes }
    }

    /// Inserts `key` before `node`, walking backward past every entry that
    /// does not satisfy `leq(entry, key)`. Returns `None` if the node arena
    /// is exhausted.
    pub fn insert_before<F>(&mut self, mut node: NodeIdx, key: u32, mut leq: F) -> Option<NodeIdx>
    where
        F: FnMut(u32, u32) -> bool,
    {
        loop {
            node = self.nodes[node].prev;
            let k = self.nodes[node].key;
            if k == INVALID || leq(k, key) {
                break;
            }
        }

        let next = self.nodes[node].next;
        let new = self.nodes.alloc(DictNode { key, next, prev: node })?;
        self.nodes[node].next = new;
        self.nodes[next].prev = new;
        Some(new)
    }

    pub fn delete(&mut self, node: NodeIdx) {
        let DictNode { next, prev, .. } = self.nodes[node];
        self.nodes[next].prev = prev;
        self.nodes[prev].next = next;
        self.nodes.free(node);
    }

    /// First node whose key satisfies `leq(key, node_key)`, or the head.
    pub fn search<F>(&self, key: u32, mut leq: F) -> NodeIdx
    where
        F: FnMut(u32, u32) -> bool,
    {
        let mut node = DICT_HEAD;
        loop {
            node = self.nodes[node].next;
            let k = self.nodes[node].key;
            if k == INVALID || leq(key, k) {
                return node;
            }
        }
    }

    #[inline]
    pub fn key(&self, node: NodeIdx) -> u32 {
        self.nodes[node].key
    }

    #[inline]
    pub fn min(&self) -> NodeIdx {
        self.nodes[DICT_HEAD].next
    }

    #[inline]
    pub fn succ(&self, node: NodeIdx) -> NodeIdx {
        self.nodes[node].next
    }

    #[inline]
    pub fn pred(&self, node: NodeIdx) -> NodeIdx {
        self.nodes[node].prev
    }

    /// Number of keyed entries.
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Dict {
    fn default() -> Self {
        Self::new()
    }
}
