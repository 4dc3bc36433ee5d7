// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Sorted doubly-linked list holding the sweep's active regions, ordered
// bottom to top by their upper edges at the current event.
//
// The ordering is supplied per call as a `leq(k1, k2)` closure, so the caller
// decides what "current event" means. Keys are region indices; the head
// sentinel carries INVALID and closes the circular list.

use crate::bucketalloc::BucketAlloc;
use crate::error::Result;
use crate::mesh::{RegionIdx, INVALID};

/// Index into the node arena.
pub type NodeIdx = u32;

#[derive(Clone, Debug)]
pub struct DictNode {
    pub key: RegionIdx,
    pub next: NodeIdx,
    pub prev: NodeIdx,
}

pub struct Dict {
    nodes: BucketAlloc<DictNode>,
    head: NodeIdx,
}

impl Dict {
    pub fn new() -> Result<Self> {
        let mut nodes = BucketAlloc::new("dictionary node");
        let head = nodes.alloc(DictNode {
            key: INVALID,
            next: 0,
            prev: 0,
        })?;
        nodes[head].next = head;
        nodes[head].prev = head;
        Ok(Dict { nodes, head })
    }

    #[inline]
    pub fn head(&self) -> NodeIdx {
        self.head
    }

    /// Insert at the top (just below the head).
    pub fn insert<F>(&mut self, key: RegionIdx, leq: F) -> Result<NodeIdx>
    where
        F: Fn(RegionIdx, RegionIdx) -> bool,
    {
        self.insert_before(self.head, key, leq)
    }

    /// Insert `key` below `node`, walking down past every node whose key is
    /// not `<= key`. Callers pass a node already close to the final position.
    pub fn insert_before<F>(&mut self, mut node: NodeIdx, key: RegionIdx, leq: F) -> Result<NodeIdx>
    where
        F: Fn(RegionIdx, RegionIdx) -> bool,
    {
        loop {
            node = self.nodes[node].prev;
            let node_key = self.nodes[node].key;
            if node_key == INVALID || leq(node_key, key) {
                break;
            }
        }

        let next = self.nodes[node].next;
        let new_node = self.nodes.alloc(DictNode {
            key,
            next,
            prev: node,
        })?;
        self.nodes[node].next = new_node;
        self.nodes[next].prev = new_node;
        Ok(new_node)
    }

    pub fn delete(&mut self, node: NodeIdx) {
        let next = self.nodes[node].next;
        let prev = self.nodes[node].prev;
        self.nodes[next].prev = prev;
        self.nodes[prev].next = next;
        self.nodes.free(node);
    }

    /// First node from the bottom whose key is `>= key`, or the head.
    pub fn search<F>(&self, key: RegionIdx, leq: F) -> NodeIdx
    where
        F: Fn(RegionIdx, RegionIdx) -> bool,
    {
        let mut node = self.head;
        loop {
            node = self.nodes[node].next;
            let node_key = self.nodes[node].key;
            if node_key == INVALID || leq(key, node_key) {
                return node;
            }
        }
    }

    #[inline]
    pub fn key(&self, node: NodeIdx) -> RegionIdx {
        self.nodes[node].key
    }

    /// Bottom-most node (the head when empty).
    #[inline]
    pub fn min(&self) -> NodeIdx {
        self.nodes[self.head].next
    }

    #[inline]
    pub fn succ(&self, node: NodeIdx) -> NodeIdx {
        self.nodes[node].next
    }

    #[inline]
    pub fn pred(&self, node: NodeIdx) -> NodeIdx {
        self.nodes[node].prev
    }

    /// Number of regions held.
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
