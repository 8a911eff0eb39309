//! Slot arena with generation-checked handles.
//!
//! Layout records (font runs) are allocated here and recycled on every
//! layout pass.  A handle remembers the generation of the slot it was
//! issued for; once the slot is freed its generation moves on and the old
//! handle stops resolving, so a stale handle can never observe a recycled
//! record.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Handle to an arena slot.  Copy-able, 8 bytes.
pub struct Handle<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    /// Slot index, stable for the lifetime of the handle.
    pub fn index(self) -> usize {
        self.index as usize
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}/{})", self.index, self.generation)
    }
}

/// Arena of `T` records with a free list.
pub struct Arena<T> {
    objects: Vec<Option<T>>,
    generations: Vec<u32>,
    free_list: Vec<u32>,
    len: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn insert(&mut self, value: T) -> Handle<T> {
        self.len += 1;
        if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.objects[i] = Some(value);
            Handle {
                index: idx,
                generation: self.generations[i],
                _marker: PhantomData,
            }
        } else {
            let idx = self.objects.len() as u32;
            self.objects.push(Some(value));
            self.generations.push(0);
            Handle {
                index: idx,
                generation: 0,
                _marker: PhantomData,
            }
        }
    }

    #[inline]
    fn live(&self, handle: Handle<T>) -> bool {
        let i = handle.index as usize;
        i < self.objects.len() && self.generations[i] == handle.generation
    }

    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.live(handle) && self.objects[handle.index as usize].is_some()
    }

    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        if !self.live(handle) {
            return None;
        }
        self.objects[handle.index as usize].as_ref()
    }

    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        if !self.live(handle) {
            return None;
        }
        self.objects[handle.index as usize].as_mut()
    }

    /// Free a slot, returning its record.  The handle (and every copy of
    /// it) is dead afterwards.
    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        if !self.live(handle) {
            return None;
        }
        let i = handle.index as usize;
        let value = self.objects[i].take()?;
        self.generations[i] = self.generations[i].wrapping_add(1);
        self.free_list.push(handle.index);
        self.len -= 1;
        Some(value)
    }

    /// Free every slot, keeping the allocation for reuse.
    pub fn clear(&mut self) {
        for i in 0..self.objects.len() {
            if self.objects[i].take().is_some() {
                self.generations[i] = self.generations[i].wrapping_add(1);
                self.free_list.push(i as u32);
            }
        }
        self.len = 0;
    }
}

impl<T> std::ops::Index<Handle<T>> for Arena<T> {
    type Output = T;

    /// Panics on a stale handle.  Layout code only indexes with handles it
    /// allocated in the current pass.
    fn index(&self, handle: Handle<T>) -> &T {
        match self.get(handle) {
            Some(value) => value,
            None => panic!("stale arena handle: {:?}", handle),
        }
    }
}

impl<T> std::ops::IndexMut<Handle<T>> for Arena<T> {
    fn index_mut(&mut self, handle: Handle<T>) -> &mut T {
        match self.get_mut(handle) {
            Some(value) => value,
            None => panic!("stale arena handle: {:?}", handle),
        }
    }
}
