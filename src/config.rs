use crate::{
  align,
  block::{MAX_BLOCK_SIZE, MIN_BLOCK_SIZE, PROLOGUE_SIZE},
  error::HeapError,
};

/// Default initial heap size and minimum growth, 64 KiB.
pub const DEFAULT_CHUNK_SIZE: usize = 1 << 16;

/// Reference threshold for [`HeapConfig::with_small_bypass`].
pub const DEFAULT_SMALL_BYPASS: usize = 64;

/// Tunables of a [`crate::Heap`]. The bucket policy is picked through the
/// heap's type parameter instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeapConfig {
  /// Size of the initial region and lower bound of every growth triggered by
  /// a failed search.
  pub chunk_size: usize,
  /// Adjusted sizes up to this many bytes skip the free list search and are
  /// served from a fresh growth of exactly their size.
  pub small_bypass: Option<usize>,
  /// Whether growths made for the small request bypass are coalesced with a
  /// free predecessor. Growths made after a failed search always are.
  pub coalesce_bypass: bool,
}

impl HeapConfig {
  pub const fn new() -> Self {
    Self {
      chunk_size: DEFAULT_CHUNK_SIZE,
      small_bypass: None,
      coalesce_bypass: false,
    }
  }

  pub const fn with_chunk_size(
    mut self,
    chunk_size: usize,
  ) -> Self {
    self.chunk_size = chunk_size;
    self
  }

  pub const fn with_small_bypass(
    mut self,
    threshold: usize,
  ) -> Self {
    self.small_bypass = Some(threshold);
    self
  }

  pub const fn with_bypass_coalescing(
    mut self,
    coalesce: bool,
  ) -> Self {
    self.coalesce_bypass = coalesce;
    self
  }

  /// Initial region size: the chunk rounded up to the alignment.
  pub(crate) fn initial_size(&self) -> usize {
    align!(self.chunk_size)
  }

  pub(crate) fn validate(&self) -> Result<(), HeapError> {
    // Prologue, epilogue and one minimum block.
    let smallest = 2 * PROLOGUE_SIZE + MIN_BLOCK_SIZE;

    if self.chunk_size < smallest {
      return Err(HeapError::InvalidConfig(
        "chunk size can't hold the sentinels and one minimum block",
      ));
    }

    if self.chunk_size > MAX_BLOCK_SIZE {
      return Err(HeapError::InvalidConfig(
        "chunk size exceeds the maximum block size",
      ));
    }

    Ok(())
  }
}

impl Default for HeapConfig {
  fn default() -> Self {
    Self::new()
  }
}
