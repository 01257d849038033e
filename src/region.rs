//! The heap region: one contiguous byte range addressed by offsets.
//!
//! ```text
//!   offset 0                                                   len - 8
//!   ┌──────────┬──────────────────────────────────────────────┬──────────┐
//!   │ prologue │        zero or more user blocks              │ epilogue │
//!   │  (8:a)   │                                              │  (0:a)   │
//!   └──────────┴──────────────────────────────────────────────┴──────────┘
//! ```
//!
//! Blocks are referred to by their offset from the region base. The prologue
//! occupies offset 0, which is why 0 doubles as the null free list link.

use std::ptr::NonNull;

use crate::{
  align::is_aligned,
  block::{self, Body, NEXT_LINK, PREV_LINK, Tag},
  error::HeapError,
};

/// Offset of the prologue, also used as the null link.
pub const NIL: usize = 0;

pub struct Region {
  base: NonNull<u8>,
  len: usize,
}

impl Region {
  /// Adopts the memory returned by the first growth of a memory source.
  pub fn new(
    base: NonNull<u8>,
    len: usize,
  ) -> Result<Self, HeapError> {
    let address = base.as_ptr() as usize;

    if !is_aligned(address) {
      return Err(HeapError::Misaligned { address });
    }

    Ok(Self { base, len })
  }

  /// Takes ownership of `bytes` more bytes starting at `address`, which must
  /// be the current end of the region.
  pub fn append(
    &mut self,
    address: NonNull<u8>,
    bytes: usize,
  ) -> Result<(), HeapError> {
    let expected = self.base.as_ptr() as usize + self.len;
    let found = address.as_ptr() as usize;

    if found != expected {
      return Err(HeapError::Discontiguous { expected, found });
    }

    self.len += bytes;

    Ok(())
  }

  pub fn len(&self) -> usize {
    self.len
  }

  pub fn base(&self) -> NonNull<u8> {
    self.base
  }

  /// Offset of the epilogue header.
  pub fn epilogue(&self) -> usize {
    self.len - block::HEADER_SIZE
  }

  /// Whether a word at `offset` lies entirely inside the region.
  pub fn contains_word(
    &self,
    offset: usize,
  ) -> bool {
    is_aligned(offset) && offset.checked_add(8).is_some_and(|end| end <= self.len)
  }

  #[inline]
  fn read_word(
    &self,
    offset: usize,
  ) -> u64 {
    debug_assert!(self.contains_word(offset), "read outside region at {offset}");
    // SAFETY: offsets handed to the region are 8 byte aligned and in bounds,
    // the base is 8 byte aligned.
    unsafe { self.base.add(offset).cast::<u64>().read() }
  }

  #[inline]
  fn write_word(
    &mut self,
    offset: usize,
    word: u64,
  ) {
    debug_assert!(self.contains_word(offset), "write outside region at {offset}");
    // SAFETY: see `read_word`.
    unsafe { self.base.add(offset).cast::<u64>().write(word) }
  }

  /// Decoded header of the block at `block`.
  #[inline]
  pub fn header(
    &self,
    block: usize,
  ) -> Tag {
    Tag::decode(self.read_word(block))
  }

  /// Decoded footer of the block at `block`, located through its header.
  #[inline]
  pub fn footer(
    &self,
    block: usize,
  ) -> Tag {
    let size = self.header(block).size;
    Tag::decode(self.read_word(block::footer_of(block, size)))
  }

  /// Decoded tag of the word right before `block`, the footer of the block
  /// preceding it.
  #[inline]
  pub fn previous_footer(
    &self,
    block: usize,
  ) -> Tag {
    Tag::decode(self.read_word(block - block::FOOTER_SIZE))
  }

  #[inline]
  pub fn set_header(
    &mut self,
    block: usize,
    tag: Tag,
  ) {
    self.write_word(block, tag.encode());
  }

  /// Writes `tag` to both header and footer. The footer goes where
  /// `tag.size` says it is.
  #[inline]
  pub fn set_tags(
    &mut self,
    block: usize,
    tag: Tag,
  ) {
    let word = tag.encode();
    self.write_word(block, word);
    self.write_word(block::footer_of(block, tag.size), word);
  }

  #[inline]
  pub fn next_link(
    &self,
    block: usize,
  ) -> usize {
    self.read_word(block + NEXT_LINK) as usize
  }

  #[inline]
  pub fn prev_link(
    &self,
    block: usize,
  ) -> usize {
    self.read_word(block + PREV_LINK) as usize
  }

  #[inline]
  pub fn set_next_link(
    &mut self,
    block: usize,
    next: usize,
  ) {
    self.write_word(block + NEXT_LINK, next as u64);
  }

  #[inline]
  pub fn set_prev_link(
    &mut self,
    block: usize,
    prev: usize,
  ) {
    self.write_word(block + PREV_LINK, prev as u64);
  }

  /// Interprets the body of the block at `block` according to its header.
  pub fn body(
    &self,
    block: usize,
  ) -> Body {
    let tag = self.header(block);

    if tag.allocated {
      Body::Payload {
        offset: block::payload_of(block),
        len: block::capacity_of(tag.size),
      }
    } else {
      Body::Links {
        next: self.next_link(block),
        prev: self.prev_link(block),
      }
    }
  }

  /// Address of the byte at `offset`.
  #[inline]
  pub fn pointer_to(
    &self,
    offset: usize,
  ) -> NonNull<u8> {
    // SAFETY: callers only pass offsets inside the region.
    unsafe { self.base.add(offset) }
  }

  /// Offset of `address` from the region base. `address` must have been
  /// produced by [`Self::pointer_to`].
  #[inline]
  pub fn offset_of(
    &self,
    address: NonNull<u8>,
  ) -> usize {
    address.as_ptr() as usize - self.base.as_ptr() as usize
  }
}
