//! Memory sources backing the heap region.
//!
//! The heap never asks for anything but "give me `n` more bytes right after
//! the ones you gave me before":
//!
//! ```text
//!   first grow          second grow        third grow
//!   ┌──────────────────┬──────────────────┬─────────┐
//!   │                  │                  │         │
//!   └──────────────────┴──────────────────┴─────────┘
//!   ▲                  ▲                  ▲         ▲
//!   base               returned           returned  break
//! ```

use std::ptr::{self, NonNull};

use libc::{c_void, intptr_t, sbrk};
use log::debug;

use crate::{align, align::ALIGNMENT, error::HeapError};

/// Default [`Arena`] capacity, 20 MiB.
pub const DEFAULT_ARENA_SIZE: usize = 20 * (1 << 20);

/// Monotonic, contiguous memory provider.
pub trait MemorySource {
  /// Grows the managed range by `bytes` and returns the address of the first
  /// new byte. Memory returned by previous calls must stay where it is, and
  /// every call must return the end of the range returned by the previous
  /// one.
  fn grow(
    &mut self,
    bytes: usize,
  ) -> Result<NonNull<u8>, HeapError>;
}

impl<M: MemorySource + ?Sized> MemorySource for &mut M {
  fn grow(
    &mut self,
    bytes: usize,
  ) -> Result<NonNull<u8>, HeapError> {
    (**self).grow(bytes)
  }
}

/// Fixed capacity buffer with its own break pointer. Behaves like `sbrk`
/// with a hard limit, which makes exhaustion reproducible.
pub struct Arena {
  start: NonNull<u64>,
  capacity: usize,
  brk: usize,
}

impl Arena {
  pub fn new() -> Self {
    Self::with_capacity(DEFAULT_ARENA_SIZE)
  }

  /// Reserves `capacity` bytes, rounded up to [`ALIGNMENT`].
  pub fn with_capacity(capacity: usize) -> Self {
    let capacity = align!(capacity);
    let memory = vec![0u64; capacity / ALIGNMENT].into_boxed_slice();
    let start = NonNull::new(Box::into_raw(memory).cast::<u64>()).unwrap_or(NonNull::dangling());

    Self {
      start,
      capacity,
      brk: 0,
    }
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  /// Bytes handed out so far.
  pub fn used(&self) -> usize {
    self.brk
  }
}

impl Default for Arena {
  fn default() -> Self {
    Self::new()
  }
}

impl MemorySource for Arena {
  fn grow(
    &mut self,
    bytes: usize,
  ) -> Result<NonNull<u8>, HeapError> {
    let Some(brk) = self.brk.checked_add(bytes).filter(|brk| *brk <= self.capacity) else {
      debug!(
        "arena exhausted: {} of {} bytes used, asked for {bytes}",
        self.brk, self.capacity
      );
      return Err(HeapError::OutOfMemory { requested: bytes });
    };

    // SAFETY: `self.brk <= self.capacity`, so the offset stays inside the
    // buffer or points one past its end.
    let address = unsafe { self.start.cast::<u8>().add(self.brk) };
    self.brk = brk;

    Ok(address)
  }
}

impl Drop for Arena {
  fn drop(&mut self) {
    // SAFETY: `start` and `capacity` describe the boxed slice leaked in
    // `with_capacity`, and nothing else owns it.
    unsafe {
      drop(Box::from_raw(ptr::slice_from_raw_parts_mut(
        self.start.as_ptr(),
        self.capacity / ALIGNMENT,
      )));
    }
  }
}

/// Grows the process data segment with `sbrk(2)`.
///
/// The heap relies on every growth being contiguous. Anything else moving
/// the program break in between (including the system allocator) makes the
/// next growth fail with [`HeapError::Discontiguous`] instead of corrupting
/// the heap.
pub struct Sbrk {
  _private: (),
}

impl Sbrk {
  /// Moves the program break up to the next [`ALIGNMENT`] boundary so the
  /// first growth yields an aligned region base.
  ///
  /// # Safety
  ///
  /// At most one [`Sbrk`] may be alive per process and the caller must not
  /// shrink the program break while it is.
  pub unsafe fn new() -> Result<Self, HeapError> {
    unsafe {
      let current = sbrk(0) as usize;
      let padding = align!(current) - current;

      if padding > 0 && sbrk(padding as intptr_t) == usize::MAX as *mut c_void {
        return Err(HeapError::OutOfMemory { requested: padding });
      }
    }

    Ok(Self { _private: () })
  }
}

impl MemorySource for Sbrk {
  fn grow(
    &mut self,
    bytes: usize,
  ) -> Result<NonNull<u8>, HeapError> {
    let increment = intptr_t::try_from(bytes).map_err(|_| HeapError::TooLarge { requested: bytes })?;

    // SAFETY: only ever moves the break forward, see `Sbrk::new`.
    let address = unsafe { sbrk(increment) };

    if address == usize::MAX as *mut c_void {
      return Err(HeapError::OutOfMemory { requested: bytes });
    }

    NonNull::new(address.cast()).ok_or(HeapError::OutOfMemory { requested: bytes })
  }
}

/// Current program break, `sbrk(0)`.
pub fn program_break() -> *mut u8 {
  // SAFETY: `sbrk(0)` only queries the break.
  unsafe { sbrk(0).cast() }
}
