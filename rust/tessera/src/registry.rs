//! Generational handle registry.
//!
//! Values handed across the host boundary (rule sets, sessions) live in a
//! [`Handles`] arena; the host only ever sees an opaque [`Handle`]. Every
//! slot carries a generation that is bumped when its value is released, so a
//! stale or twice-released handle is detected and reported as
//! `InvalidHandle` instead of aliasing whatever reused the slot.

use std::fmt;

use tessera_common::{Result, error::Error};

/// Opaque reference to a value stored in a [`Handles`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    index: u32,
    generation: u32,
}

impl Handle {
    /// Packs the handle into a single integer for hosts that can only carry
    /// scalars.
    pub fn into_raw(self) -> u64 {
        (u64::from(self.generation) << 32) | u64::from(self.index)
    }

    /// Reverses [`into_raw`](Self::into_raw). Any integer is accepted; a value
    /// that was never issued simply fails the registry lookup.
    pub fn from_raw(raw: u64) -> Handle {
        Handle {
            index: raw as u32,
            generation: (raw >> 32) as u32,
        }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Arena of values addressed by [`Handle`].
pub struct Handles<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> Handles<T> {
    pub fn new() -> Handles<T> {
        Handles {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Stores `value` and returns its handle. Released slots are reused under
    /// a new generation.
    pub fn insert(&mut self, value: T) -> Result<Handle> {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return Ok(Handle {
                index,
                generation: slot.generation,
            });
        }
        let Ok(index) = u32::try_from(self.slots.len()) else {
            self.len -= 1;
            return Err(Error::invalid_operation("insert: handle space exhausted"));
        };
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        Ok(Handle {
            index,
            generation: 0,
        })
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.get(handle).is_ok()
    }

    pub fn get(&self, handle: Handle) -> Result<&T> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.value.as_ref())
            .ok_or_else(|| Error::invalid_handle(handle.to_string()))
    }

    pub fn get_mut(&mut self, handle: Handle) -> Result<&mut T> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.value.as_mut())
            .ok_or_else(|| Error::invalid_handle(handle.to_string()))
    }

    /// Releases the value behind `handle` and returns it.
    ///
    /// # Errors
    ///
    /// `InvalidHandle` if the handle was never issued by this arena or was
    /// already released.
    pub fn remove(&mut self, handle: Handle) -> Result<T> {
        let slot = self
            .slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation && slot.value.is_some())
            .ok_or_else(|| Error::invalid_handle(handle.to_string()))?;
        let value = slot.value.take();
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.len -= 1;
        value.ok_or_else(|| Error::invalid_handle(handle.to_string()))
    }
}

impl<T> Default for Handles<T> {
    fn default() -> Self {
        Self::new()
    }
}
