//! Generational slot tables backing every handle type.
//!
//! A handle is an (index, generation) pair. Closing a handle bumps the slot's
//! generation, so a stale handle never resolves to whatever reuses the slot.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Marker trait for the resource a handle refers to.
pub trait HandleKind {
    /// Human-readable name used in errors and logs.
    const NAME: &'static str;
}

/// Marker for document handles.
#[derive(Debug)]
pub enum DocumentKind {}
/// Marker for page handles.
#[derive(Debug)]
pub enum PageKind {}
/// Marker for text layer handles.
#[derive(Debug)]
pub enum TextKind {}
/// Marker for search cursor handles.
#[derive(Debug)]
pub enum SearchKind {}

impl HandleKind for DocumentKind {
    const NAME: &'static str = "document";
}
impl HandleKind for PageKind {
    const NAME: &'static str = "page";
}
impl HandleKind for TextKind {
    const NAME: &'static str = "text";
}
impl HandleKind for SearchKind {
    const NAME: &'static str = "search";
}

/// Handle to an open document.
pub type DocumentHandle = Handle<DocumentKind>;
/// Handle to an open page.
pub type PageHandle = Handle<PageKind>;
/// Handle to an open text layer.
pub type TextHandle = Handle<TextKind>;
/// Handle to an open search cursor.
pub type SearchHandle = Handle<SearchKind>;

/// Opaque typed reference to a registry slot.
///
/// Handles of different kinds are distinct types, so passing a page handle
/// where a document is expected does not compile.
pub struct Handle<K> {
    index: u32,
    generation: u32,
    _kind: PhantomData<fn() -> K>,
}

impl<K> Handle<K> {
    fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _kind: PhantomData,
        }
    }

    /// Pack into a non-zero integer for hosts that store handles as `long`.
    ///
    /// `0` is never produced, so hosts can keep using it as "not opened".
    pub fn to_raw(self) -> u64 {
        (u64::from(self.generation) << 32) | (u64::from(self.index) + 1)
    }

    /// Unpack a value produced by [`Handle::to_raw`]. `0` yields `None`.
    pub fn from_raw(raw: u64) -> Option<Self> {
        let index = (raw & 0xFFFF_FFFF).checked_sub(1)?;
        Some(Self::new(index as u32, (raw >> 32) as u32))
    }
}

impl<K> Clone for Handle<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for Handle<K> {}

impl<K> PartialEq for Handle<K> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<K> Eq for Handle<K> {}

impl<K> Hash for Handle<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<K: HandleKind> fmt::Debug for Handle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}v{}", K::NAME, self.index, self.generation)
    }
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slot table for one resource type.
pub(crate) struct Slots<K, T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    _kind: PhantomData<fn() -> K>,
}

impl<K, T> Default for Slots<K, T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            _kind: PhantomData,
        }
    }
}

impl<K, T> Slots<K, T> {
    pub(crate) fn insert(&mut self, value: T) -> Handle<K> {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return Handle::new(index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 1,
            value: Some(value),
        });
        Handle::new(index, 1)
    }

    pub(crate) fn get(&self, handle: Handle<K>) -> Option<&T> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.value.as_ref())
    }

    pub(crate) fn get_mut(&mut self, handle: Handle<K>) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.value.as_mut())
    }

    pub(crate) fn contains(&self, handle: Handle<K>) -> bool {
        self.get(handle).is_some()
    }

    /// Take the value out and invalidate every copy of `handle`.
    pub(crate) fn remove(&mut self, handle: Handle<K>) -> Option<T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1).max(1);
        self.free.push(handle.index);
        Some(value)
    }

    pub(crate) fn handles(&self) -> Vec<Handle<K>> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.value.is_some())
            .map(|(index, slot)| Handle::new(index as u32, slot.generation))
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}
