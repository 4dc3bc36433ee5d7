// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Typed arenas backing the mesh, the edge dictionary and the region pool.
// Slots are addressed by stable u32 indices; freed slots go on a free list
// and are handed out again by the next allocation.

use std::ops::{Index, IndexMut};

use crate::error::{Result, TessellationError};

pub struct BucketAlloc<T> {
    items: Vec<Option<T>>,
    free_list: Vec<u32>,
    live: usize,
    name: &'static str,
}

impl<T> BucketAlloc<T> {
    /// `name` identifies the object kind in allocation-failure errors.
    pub fn new(name: &'static str) -> Self {
        Self {
            items: Vec::new(),
            free_list: Vec::new(),
            live: 0,
            name,
        }
    }

    /// Store `value`, returning its index.
    pub fn alloc(&mut self, value: T) -> Result<u32> {
        if let Some(idx) = self.free_list.pop() {
            self.items[idx as usize] = Some(value);
            self.live += 1;
            return Ok(idx);
        }
        if self.items.len() >= u32::MAX as usize {
            return Err(TessellationError::AllocationFailure(self.name));
        }
        self.items
            .try_reserve(1)
            .map_err(|_| TessellationError::AllocationFailure(self.name))?;
        let idx = self.items.len() as u32;
        self.items.push(Some(value));
        self.live += 1;
        Ok(idx)
    }

    /// Free a slot. Freeing an already-free slot is a no-op.
    pub fn free(&mut self, idx: u32) {
        if let Some(slot) = self.items.get_mut(idx as usize) {
            if slot.take().is_some() {
                self.free_list.push(idx);
                self.live -= 1;
            }
        }
    }

    pub fn get(&self, idx: u32) -> Option<&T> {
        self.items.get(idx as usize)?.as_ref()
    }

    pub fn get_mut(&mut self, idx: u32) -> Option<&mut T> {
        self.items.get_mut(idx as usize)?.as_mut()
    }

    #[inline]
    pub fn is_live(&self, idx: u32) -> bool {
        self.get(idx).is_some()
    }

    /// Number of live slots.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Snapshot of the live indices in slot order. Passes that delete while
    /// walking iterate over this and skip slots that died meanwhile.
    pub fn indices(&self) -> Vec<u32> {
        self.iter().map(|(i, _)| i).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> + '_ {
        self.items
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|v| (i as u32, v)))
    }
}

impl<T> Index<u32> for BucketAlloc<T> {
    type Output = T;

    #[inline]
    fn index(&self, idx: u32) -> &T {
        match self.items.get(idx as usize) {
            Some(Some(v)) => v,
            _ => panic!("{} slot {} is not live", self.name, idx),
        }
    }
}

impl<T> IndexMut<u32> for BucketAlloc<T> {
    #[inline]
    fn index_mut(&mut self, idx: u32) -> &mut T {
        let name = self.name;
        match self.items.get_mut(idx as usize) {
            Some(Some(v)) => v,
            _ => panic!("{} slot {} is not live", name, idx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_and_free() {
        let mut ba: BucketAlloc<u32> = BucketAlloc::new("test");
        let a = ba.alloc(1).unwrap();
        let b = ba.alloc(2).unwrap();
        assert_ne!(a, b);
        ba.free(a);
        let c = ba.alloc(3).unwrap();
        // c should reuse a's slot
        assert_eq!(c, a);
        assert_eq!(ba[c], 3);
        assert_eq!(ba.len(), 2);
    }

    #[test]
    fn get_after_free_returns_none() {
        let mut ba: BucketAlloc<i32> = BucketAlloc::new("test");
        let idx = ba.alloc(7).unwrap();
        ba.free(idx);
        assert!(ba.get(idx).is_none());
        assert!(!ba.is_live(idx));
        assert!(ba.is_empty());
    }

    #[test]
    fn double_free_is_harmless() {
        let mut ba: BucketAlloc<i32> = BucketAlloc::new("test");
        let idx = ba.alloc(7).unwrap();
        ba.free(idx);
        ba.free(idx);
        let a = ba.alloc(1).unwrap();
        let b = ba.alloc(2).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn indices_skip_free_slots() {
        let mut ba: BucketAlloc<char> = BucketAlloc::new("test");
        let a = ba.alloc('a').unwrap();
        let b = ba.alloc('b').unwrap();
        let c = ba.alloc('c').unwrap();
        ba.free(b);
        assert_eq!(ba.indices(), vec![a, c]);
    }

    #[test]
    #[should_panic(expected = "not live")]
    fn indexing_freed_slot_panics() {
        let mut ba: BucketAlloc<i32> = BucketAlloc::new("test");
        let idx = ba.alloc(7).unwrap();
        ba.free(idx);
        let _ = ba[idx];
    }
}
