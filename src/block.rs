//! Boundary tag codec.
//!
//! Every block starts with an 8 byte header and ends with an identical 8 byte
//! footer:
//!
//! ```text
//!   63          32 31              1   0
//!   +-------------+-----------------+-----+
//!   |  reserved   |   block size    | a/f |
//!   +-------------+-----------------+-----+
//! ```
//!
//! Free blocks reuse the first two payload words for their free list links:
//!
//! ```text
//!   block                                              block + size
//!   +----------+----------+----------+-- ... --+----------+
//!   |  header  |   next   |   prev   |         |  footer  |
//!   +----------+----------+----------+-- ... --+----------+
//!              ^
//!              +-- payload starts here when the block is allocated
//! ```

use crate::align::{ALIGNMENT, checked_align};

/// Header size in bytes.
pub const HEADER_SIZE: usize = 8;

/// Footer size in bytes.
pub const FOOTER_SIZE: usize = 8;

/// Bytes of every block that the caller can't use.
pub const OVERHEAD: usize = HEADER_SIZE + FOOTER_SIZE;

/// Smallest block that can hold a header, a footer and both free list links.
pub const MIN_BLOCK_SIZE: usize = OVERHEAD + 2 * LINK_SIZE;

/// Largest block size that fits the 31 bit size field.
pub const MAX_BLOCK_SIZE: usize = (SIZE_MASK as usize) & !(ALIGNMENT - 1);

/// Size of the prologue sentinel, a lone header.
pub const PROLOGUE_SIZE: usize = HEADER_SIZE;

/// Size of a free list link field.
pub const LINK_SIZE: usize = 8;

/// Offset of the `next` link from the block base.
pub const NEXT_LINK: usize = HEADER_SIZE;

/// Offset of the `prev` link from the block base.
pub const PREV_LINK: usize = NEXT_LINK + LINK_SIZE;

const ALLOCATED_BIT: u64 = 1;

const SIZE_MASK: u64 = 0x7fff_ffff;

/// Decoded header or footer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tag {
  pub size: usize,
  pub allocated: bool,
}

impl Tag {
  pub const fn new(
    size: usize,
    allocated: bool,
  ) -> Self {
    Self { size, allocated }
  }

  pub const fn free(size: usize) -> Self {
    Self::new(size, false)
  }

  pub const fn allocated(size: usize) -> Self {
    Self::new(size, true)
  }

  /// Packs the tag into its on-heap word. Reserved bits are always zero.
  #[inline]
  pub const fn encode(self) -> u64 {
    debug_assert!(self.size <= MAX_BLOCK_SIZE);
    (((self.size as u64) & SIZE_MASK) << 1) | (self.allocated as u64)
  }

  /// Unpacks an on-heap word, ignoring the reserved high half.
  #[inline]
  pub const fn decode(word: u64) -> Self {
    Self {
      size: ((word >> 1) & SIZE_MASK) as usize,
      allocated: word & ALLOCATED_BIT != 0,
    }
  }

  pub fn flag(&self) -> char {
    if self.allocated { 'a' } else { 'f' }
  }
}

/// Offset of the footer of the block at `block` whose size is `size`.
#[inline]
pub const fn footer_of(
  block: usize,
  size: usize,
) -> usize {
  block + size - FOOTER_SIZE
}

/// Offset of the first payload byte of the block at `block`.
#[inline]
pub const fn payload_of(block: usize) -> usize {
  block + HEADER_SIZE
}

/// Inverse of [`payload_of`].
#[inline]
pub const fn block_of(payload: usize) -> usize {
  payload - HEADER_SIZE
}

/// Block size needed to serve a request of `size` payload bytes, or `None`
/// if it can't be encoded in a header.
pub fn adjusted_size(size: usize) -> Option<usize> {
  let asize = checked_align(size.checked_add(OVERHEAD)?)?.max(MIN_BLOCK_SIZE);

  (asize <= MAX_BLOCK_SIZE).then_some(asize)
}

/// Payload bytes available in a block of `size` bytes.
#[inline]
pub const fn capacity_of(size: usize) -> usize {
  size - OVERHEAD
}

/// What lives between header and footer, selected by the allocated flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Body {
  /// Caller owned bytes, `len` of them starting at `offset`.
  Payload { offset: usize, len: usize },
  /// Free list links, `0` meaning null.
  Links { next: usize, prev: usize },
}
