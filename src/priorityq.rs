// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Event queue for the sweep.
//
// Two phases:
//   Phase 1 (before `init`): inserts append to a key array, which `init`
//   sorts once in descending order so the minimum sits at the end.
//   Phase 2 (after `init`): inserts (intersection vertices) go into a binary
//   min-heap. `extract_min` takes the smaller of the two fronts.
// Either kind of entry can be deleted through its handle.
//
// Keys are vertex positions; a key never changes while it is queued.

use std::cmp::Ordering;

use crate::error::{Result, TessellationError};
use crate::geom::{vert_leq, Point};
use crate::mesh::VertIdx;

/// Where a queued vertex lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PqHandle {
    Sorted(u32),
    Heap(u32),
}

#[derive(Debug, Clone, Copy)]
struct Key {
    pos: Point,
    vert: VertIdx,
}

#[inline]
fn key_leq(a: &Key, b: &Key) -> bool {
    vert_leq(a.pos, b.pos)
}

/// Total order used for the initial sort: sweep order, then vertex index so
/// coincident vertices always come out in the same order.
fn key_cmp(a: &Key, b: &Key) -> Ordering {
    a.pos
        .x
        .total_cmp(&b.pos.x)
        .then(a.pos.y.total_cmp(&b.pos.y))
        .then(a.vert.cmp(&b.vert))
}

fn grow<T>(v: &mut Vec<T>) -> Result<()> {
    v.try_reserve(1)
        .map_err(|_| TessellationError::AllocationFailure("event queue"))
}

/// Binary min-heap with stable handles. `nodes[1..=size]` holds handles;
/// `handles[h]` holds the key and its node position.
struct Heap {
    nodes: Vec<u32>,
    handles: Vec<(Option<Key>, usize)>,
    free_handles: Vec<u32>,
    size: usize,
}

impl Heap {
    fn new() -> Self {
        Heap {
            nodes: vec![0],
            handles: Vec::new(),
            free_handles: Vec::new(),
            size: 0,
        }
    }

    #[inline]
    fn key_of(&self, h: u32) -> &Key {
        match &self.handles[h as usize].0 {
            Some(k) => k,
            None => panic!("heap handle {} is free", h),
        }
    }

    #[inline]
    fn leq(&self, a: u32, b: u32) -> bool {
        key_leq(self.key_of(a), self.key_of(b))
    }

    fn place(&mut self, pos: usize, h: u32) {
        self.nodes[pos] = h;
        self.handles[h as usize].1 = pos;
    }

    fn float_down(&mut self, mut curr: usize) {
        let h_curr = self.nodes[curr];
        loop {
            let mut child = curr << 1;
            if child < self.size && self.leq(self.nodes[child + 1], self.nodes[child]) {
                child += 1;
            }
            if child > self.size || self.leq(h_curr, self.nodes[child]) {
                self.place(curr, h_curr);
                break;
            }
            let h_child = self.nodes[child];
            self.place(curr, h_child);
            curr = child;
        }
    }

    fn float_up(&mut self, mut curr: usize) {
        let h_curr = self.nodes[curr];
        loop {
            let parent = curr >> 1;
            if parent == 0 || self.leq(self.nodes[parent], h_curr) {
                self.place(curr, h_curr);
                break;
            }
            let h_parent = self.nodes[parent];
            self.place(curr, h_parent);
            curr = parent;
        }
    }

    fn insert(&mut self, key: Key) -> Result<u32> {
        self.size += 1;
        let curr = self.size;
        if curr >= self.nodes.len() {
            grow(&mut self.nodes)?;
            self.nodes.push(0);
        }
        let h = match self.free_handles.pop() {
            Some(h) => {
                self.handles[h as usize] = (Some(key), curr);
                h
            }
            None => {
                grow(&mut self.handles)?;
                self.handles.push((Some(key), curr));
                (self.handles.len() - 1) as u32
            }
        };
        self.nodes[curr] = h;
        self.float_up(curr);
        Ok(h)
    }

    fn minimum(&self) -> Option<&Key> {
        if self.size == 0 {
            None
        } else {
            Some(self.key_of(self.nodes[1]))
        }
    }

    fn extract_min(&mut self) -> Option<Key> {
        if self.size == 0 {
            return None;
        }
        let h_min = self.nodes[1];
        let key = self.handles[h_min as usize].0.take();
        let last = self.nodes[self.size];
        self.place(1, last);
        self.free_handles.push(h_min);
        self.size -= 1;
        if self.size > 0 {
            self.float_down(1);
        }
        key
    }

    fn delete(&mut self, h: u32) {
        let curr = self.handles[h as usize].1;
        let last = self.nodes[self.size];
        self.size -= 1;
        if curr <= self.size {
            self.place(curr, last);
            if curr <= 1 || self.leq(self.nodes[curr >> 1], last) {
                self.float_down(curr);
            } else {
                self.float_up(curr);
            }
        }
        self.handles[h as usize].0 = None;
        self.free_handles.push(h);
    }
}

/// The event queue: a sorted array of the initial vertices plus a heap for
/// vertices created during the sweep.
pub struct PriorityQ {
    heap: Heap,
    keys: Vec<Option<Key>>,
    /// Indices into `keys`, sorted descending; `order[..size]` is live.
    order: Vec<u32>,
    size: usize,
    initialized: bool,
}

impl Default for PriorityQ {
    fn default() -> Self {
        Self::new()
    }
}

impl PriorityQ {
    pub fn new() -> Self {
        PriorityQ {
            heap: Heap::new(),
            keys: Vec::new(),
            order: Vec::new(),
            size: 0,
            initialized: false,
        }
    }

    /// Queue vertex `vert` at `pos`.
    pub fn insert(&mut self, pos: Point, vert: VertIdx) -> Result<PqHandle> {
        let key = Key { pos, vert };
        if self.initialized {
            return Ok(PqHandle::Heap(self.heap.insert(key)?));
        }
        grow(&mut self.keys)?;
        self.keys.push(Some(key));
        Ok(PqHandle::Sorted((self.keys.len() - 1) as u32))
    }

    /// Sort the phase-1 keys. Later inserts go to the heap.
    pub fn init(&mut self) -> Result<()> {
        self.order
            .try_reserve(self.keys.len())
            .map_err(|_| TessellationError::AllocationFailure("event queue"))?;
        self.order.clear();
        self.order
            .extend((0..self.keys.len() as u32).filter(|&i| self.keys[i as usize].is_some()));
        let keys = &self.keys;
        self.order.sort_by(|&a, &b| match (&keys[a as usize], &keys[b as usize]) {
            (Some(ka), Some(kb)) => key_cmp(kb, ka),
            _ => Ordering::Equal,
        });
        self.size = self.order.len();
        self.initialized = true;
        Ok(())
    }

    fn sorted_min(&self) -> Option<&Key> {
        if self.size == 0 {
            return None;
        }
        self.keys[self.order[self.size - 1] as usize].as_ref()
    }

    fn trim_sorted(&mut self) {
        while self.size > 0 && self.keys[self.order[self.size - 1] as usize].is_none() {
            self.size -= 1;
        }
    }

    /// True when the heap front precedes (or ties) the sorted front.
    fn heap_first(&self) -> bool {
        match (self.heap.minimum(), self.sorted_min()) {
            (Some(h), Some(s)) => key_leq(h, s),
            (Some(_), None) => true,
            _ => false,
        }
    }

    /// The next vertex without removing it.
    pub fn minimum(&self) -> Option<VertIdx> {
        if self.heap_first() {
            self.heap.minimum().map(|k| k.vert)
        } else {
            self.sorted_min().map(|k| k.vert)
        }
    }

    /// Position of the next vertex.
    pub fn minimum_pos(&self) -> Option<Point> {
        if self.heap_first() {
            self.heap.minimum().map(|k| k.pos)
        } else {
            self.sorted_min().map(|k| k.pos)
        }
    }

    pub fn extract_min(&mut self) -> Option<VertIdx> {
        if self.heap_first() {
            return self.heap.extract_min().map(|k| k.vert);
        }
        if self.size == 0 {
            return None;
        }
        self.size -= 1;
        let idx = self.order[self.size] as usize;
        let key = self.keys[idx].take();
        self.trim_sorted();
        key.map(|k| k.vert)
    }

    /// Remove a queued entry.
    pub fn delete(&mut self, handle: PqHandle) {
        match handle {
            PqHandle::Heap(h) => self.heap.delete(h),
            PqHandle::Sorted(i) => {
                debug_assert!(self.keys[i as usize].is_some());
                self.keys[i as usize] = None;
                self.trim_sorted();
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0 && self.heap.size == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn drain(pq: &mut PriorityQ) -> Vec<VertIdx> {
        let mut out = Vec::new();
        while let Some(v) = pq.extract_min() {
            out.push(v);
        }
        out
    }

    #[test]
    fn sorted_phase_orders_by_x_then_y() {
        let mut pq = PriorityQ::new();
        pq.insert(p(5.0, 0.0), 0).unwrap();
        pq.insert(p(2.0, 3.0), 1).unwrap();
        pq.insert(p(8.0, -1.0), 2).unwrap();
        pq.insert(p(2.0, 1.0), 3).unwrap();
        pq.init().unwrap();
        assert_eq!(pq.minimum(), Some(3));
        assert_eq!(pq.minimum_pos(), Some(p(2.0, 1.0)));
        assert_eq!(drain(&mut pq), vec![3, 1, 0, 2]);
        assert!(pq.is_empty());
    }

    #[test]
    fn heap_alone() {
        let mut pq = PriorityQ::new();
        pq.init().unwrap();
        for (i, x) in [3.0, 1.0, 4.0, 1.5, 9.0, 2.6].iter().enumerate() {
            pq.insert(p(*x, 0.0), i as VertIdx).unwrap();
        }
        assert_eq!(drain(&mut pq), vec![1, 3, 5, 0, 2, 4]);
    }

    #[test]
    fn delete_from_sorted_array() {
        let mut pq = PriorityQ::new();
        let h1 = pq.insert(p(10.0, 0.0), 1).unwrap();
        pq.insert(p(5.0, 0.0), 2).unwrap();
        let h3 = pq.insert(p(1.0, 0.0), 3).unwrap();
        pq.init().unwrap();
        pq.delete(h1);
        pq.delete(h3);
        assert_eq!(pq.minimum(), Some(2));
        assert_eq!(drain(&mut pq), vec![2]);
        assert!(pq.is_empty());
    }

    #[test]
    fn post_init_inserts_interleave() {
        let mut pq = PriorityQ::new();
        pq.insert(p(3.0, 0.0), 0).unwrap();
        pq.insert(p(6.0, 0.0), 1).unwrap();
        pq.init().unwrap();
        let h = pq.insert(p(4.0, 0.0), 2).unwrap();
        assert!(matches!(h, PqHandle::Heap(_)));
        pq.insert(p(1.0, 0.0), 3).unwrap();
        assert_eq!(drain(&mut pq), vec![3, 0, 2, 1]);
    }

    #[test]
    fn delete_from_heap_keeps_order() {
        let mut pq = PriorityQ::new();
        pq.init().unwrap();
        let handles: Vec<PqHandle> = (0..8)
            .map(|i| pq.insert(p(i as f64, 0.0), i).unwrap())
            .collect();
        pq.delete(handles[0]);
        pq.delete(handles[5]);
        pq.delete(handles[7]);
        assert_eq!(drain(&mut pq), vec![1, 2, 3, 4, 6]);
    }

    #[test]
    fn heap_handles_are_reused() {
        let mut pq = PriorityQ::new();
        pq.init().unwrap();
        let a = pq.insert(p(1.0, 0.0), 0).unwrap();
        assert_eq!(pq.extract_min(), Some(0));
        let b = pq.insert(p(2.0, 0.0), 1).unwrap();
        assert_eq!(a, b);
        assert_eq!(pq.extract_min(), Some(1));
        assert_eq!(pq.extract_min(), None);
    }
}
