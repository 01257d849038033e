use std::{marker::PhantomData, ptr, ptr::NonNull};

use log::{debug, trace, warn};

use crate::{
  Pointer,
  block::{self, HEADER_SIZE, MAX_BLOCK_SIZE, MIN_BLOCK_SIZE, PROLOGUE_SIZE, Tag},
  class::{Segregated, SizeClasses},
  config::HeapConfig,
  error::HeapError,
  freelist::FreeLists,
  region::{NIL, Region},
  source::MemorySource,
};

/// Offset of the prologue sentinel.
pub const PROLOGUE: usize = NIL;

/// Largest region whose every block still fits the 31 bit size field.
pub const MAX_REGION_SIZE: usize = MAX_BLOCK_SIZE + PROLOGUE_SIZE + HEADER_SIZE;

/// Address ordered view of one block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockInfo {
  /// Offset of the header from the region base.
  pub offset: usize,
  /// Total size including header and footer.
  pub size: usize,
  pub allocated: bool,
}

impl BlockInfo {
  /// Offset one past the footer.
  pub fn end(&self) -> usize {
    self.offset + self.size
  }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeapStats {
  pub region_size: usize,
  pub blocks: usize,
  pub free_blocks: usize,
  pub free_bytes: usize,
  pub allocated_bytes: usize,
  pub largest_free: usize,
}

/// Boundary tag allocator over a single growable region.
///
/// `C` picks the free list layout: [`Segregated`] for 22 size classes,
/// [`crate::Single`] for one explicit list. Everything else is shared.
///
/// The heap is not thread safe. All operations take `&mut self`, so sharing
/// one between threads needs an external lock around every call.
pub struct Heap<M: MemorySource, C: SizeClasses = Segregated> {
  pub(crate) source: M,
  pub(crate) region: Region,
  pub(crate) lists: FreeLists,
  pub(crate) config: HeapConfig,
  classes: PhantomData<C>,
}

impl<M: MemorySource, C: SizeClasses> Heap<M, C> {
  /// Builds a fresh heap: grows `source` by the chunk size and lays out the
  /// prologue, one free block spanning everything else, and the epilogue.
  pub fn init(
    mut source: M,
    config: HeapConfig,
  ) -> Result<Self, HeapError> {
    config.validate()?;

    let size = config.initial_size();
    let base = source.grow(size)?;
    let region = Region::new(base, size)?;

    let mut heap = Self {
      source,
      region,
      lists: FreeLists::new(C::COUNT),
      config,
      classes: PhantomData,
    };

    heap
      .region
      .set_header(PROLOGUE, Tag::allocated(PROLOGUE_SIZE));

    let first = PROLOGUE + PROLOGUE_SIZE;
    heap
      .region
      .set_tags(first, Tag::free(size - PROLOGUE_SIZE - HEADER_SIZE));

    let epilogue = heap.region.epilogue();
    heap.region.set_header(epilogue, Tag::allocated(0));

    heap.push(first);

    debug!(
      "heap initialized at {:?}: {size} bytes, {} buckets",
      heap.region.base(),
      C::COUNT
    );

    Ok(heap)
  }

  pub fn config(&self) -> &HeapConfig {
    &self.config
  }

  pub fn source(&self) -> &M {
    &self.source
  }

  /// Bytes currently covered by the region, sentinels included.
  pub fn region_size(&self) -> usize {
    self.region.len()
  }

  pub fn bucket_count(&self) -> usize {
    C::COUNT
  }

  /// Returns a pointer to at least `size` writable bytes, 8 byte aligned, or
  /// `None` if `size` is zero or no memory could be found.
  pub fn allocate(
    &mut self,
    size: usize,
  ) -> Pointer<u8> {
    match self.try_allocate(size) {
      Ok(address) => address,
      Err(err) => {
        warn!("allocation of {size} bytes failed: {err}");
        None
      }
    }
  }

  /// Same as [`Self::allocate`] but tells why it failed. `Ok(None)` means
  /// `size` was zero.
  pub fn try_allocate(
    &mut self,
    size: usize,
  ) -> Result<Pointer<u8>, HeapError> {
    if size == 0 {
      return Ok(None);
    }

    let asize = block::adjusted_size(size).ok_or(HeapError::TooLarge { requested: size })?;

    if let Some(threshold) = self.config.small_bypass {
      if asize <= threshold {
        match self.extend(asize, self.config.coalesce_bypass) {
          Ok(block) => return Ok(Some(self.place(block, asize))),
          Err(err) => debug!("small request growth failed ({err}), searching free lists"),
        }
      }
    }

    let block = match self.find_fit(asize) {
      Some(block) => block,
      None => self.extend(asize.max(self.config.initial_size()), true)?,
    };

    let address = self.place(block, asize);

    trace!("allocate({size}) -> block {block}, {asize} bytes");

    Ok(Some(address))
  }

  /// Gives the block behind `address` back to the heap. `None` is ignored.
  ///
  /// # Safety
  ///
  /// `address` must have been returned by this heap and not released since.
  /// Nothing here can detect a foreign or double released pointer, both
  /// corrupt the heap.
  pub unsafe fn release(
    &mut self,
    address: Pointer<u8>,
  ) {
    let Some(address) = address else {
      return;
    };

    let block = block::block_of(self.region.offset_of(address));
    let size = self.region.header(block).size;

    self.region.set_tags(block, Tag::free(size));
    self.push(block);

    let merged = self.coalesce(block);

    trace!("release(block {block}, {size} bytes) -> free block {merged}");
  }

  /// Moves the allocation behind `address` to a new block of `size` bytes,
  /// copying as much of the old payload as fits. A null `address` allocates,
  /// a zero `size` releases and returns `None`. On failure the original
  /// allocation is left untouched.
  ///
  /// # Safety
  ///
  /// Same as [`Self::release`].
  pub unsafe fn reallocate(
    &mut self,
    address: Pointer<u8>,
    size: usize,
  ) -> Result<Pointer<u8>, HeapError> {
    let Some(old) = address else {
      return self.try_allocate(size);
    };

    if size == 0 {
      unsafe { self.release(address) };
      return Ok(None);
    }

    let capacity = unsafe { self.usable_size(old) };
    let new = self
      .try_allocate(size)?
      .ok_or(HeapError::OutOfMemory { requested: size })?;

    // SAFETY: both blocks are live, distinct allocations of this heap and
    // each one can hold `size.min(capacity)` bytes.
    unsafe {
      ptr::copy_nonoverlapping(old.as_ptr(), new.as_ptr(), size.min(capacity));
      self.release(address);
    }

    Ok(Some(new))
  }

  /// Payload bytes available behind `address`. Reflects the rounded block
  /// size, not the size originally asked for.
  ///
  /// # Safety
  ///
  /// `address` must be a live allocation of this heap.
  pub unsafe fn usable_size(
    &self,
    address: NonNull<u8>,
  ) -> usize {
    let block = block::block_of(self.region.offset_of(address));
    block::capacity_of(self.region.header(block).size)
  }

  /// Every block between the sentinels, in address order.
  pub fn blocks(&self) -> Blocks<'_> {
    Blocks {
      region: &self.region,
      current: PROLOGUE + PROLOGUE_SIZE,
    }
  }

  /// Blocks of one bucket in list order, most recently pushed first. A
  /// bucket the policy doesn't have yields nothing.
  pub fn free_blocks(
    &self,
    bucket: usize,
  ) -> impl Iterator<Item = BlockInfo> + '_ {
    self.lists.iter(&self.region, bucket).map(|offset| {
      let tag = self.region.header(offset);
      BlockInfo {
        offset,
        size: tag.size,
        allocated: tag.allocated,
      }
    })
  }

  pub fn stats(&self) -> HeapStats {
    let mut stats = HeapStats {
      region_size: self.region.len(),
      ..HeapStats::default()
    };

    for block in self.blocks() {
      stats.blocks += 1;

      if block.allocated {
        stats.allocated_bytes += block.size;
      } else {
        stats.free_blocks += 1;
        stats.free_bytes += block.size;
        stats.largest_free = stats.largest_free.max(block.size);
      }
    }

    stats
  }

  #[inline]
  pub(crate) fn bucket_of(
    &self,
    block: usize,
  ) -> usize {
    C::classify(self.region.header(block).size)
  }

  fn push(
    &mut self,
    block: usize,
  ) {
    let bucket = self.bucket_of(block);
    self.lists.push(&mut self.region, block, bucket);
  }

  fn pop(
    &mut self,
    block: usize,
  ) {
    let bucket = self.bucket_of(block);
    self.lists.pop(&mut self.region, block, bucket);
  }

  /// First block of at least `asize` bytes, scanning buckets upwards from the
  /// one `asize` maps to.
  fn find_fit(
    &self,
    asize: usize,
  ) -> Option<usize> {
    (C::classify(asize)..C::COUNT).find_map(|bucket| {
      self
        .lists
        .iter(&self.region, bucket)
        .find(|block| self.region.header(*block).size >= asize)
    })
  }

  /// Turns the free block at `block` into an allocated block of `asize`
  /// bytes, splitting off the tail when it can stand on its own.
  fn place(
    &mut self,
    block: usize,
    asize: usize,
  ) -> NonNull<u8> {
    let size = self.region.header(block).size;
    debug_assert!(size >= asize);

    self.pop(block);

    let remainder = size - asize;
    if remainder >= MIN_BLOCK_SIZE {
      self.region.set_tags(block, Tag::allocated(asize));

      let rest = block + asize;
      self.region.set_tags(rest, Tag::free(remainder));
      self.push(rest);
    } else {
      self.region.set_tags(block, Tag::allocated(size));
    }

    self.region.pointer_to(block::payload_of(block))
  }

  /// Appends a free block of `bytes` bytes where the epilogue used to be and
  /// returns it, merged with a free predecessor if `coalesce` is set. Leaves
  /// the heap untouched on failure.
  fn extend(
    &mut self,
    bytes: usize,
    coalesce: bool,
  ) -> Result<usize, HeapError> {
    let bytes = crate::align::checked_align(bytes).ok_or(HeapError::TooLarge { requested: bytes })?;
    let len = self.region.len();

    if bytes == 0 || bytes > MAX_REGION_SIZE - len {
      return Err(HeapError::TooLarge { requested: bytes });
    }

    let address = self.source.grow(bytes)?;
    self.region.append(address, bytes)?;

    let block = len - HEADER_SIZE;
    self.region.set_tags(block, Tag::free(bytes));

    let epilogue = self.region.epilogue();
    self.region.set_header(epilogue, Tag::allocated(0));

    self.push(block);

    debug!("region grew by {bytes} bytes to {}", self.region.len());

    Ok(if coalesce { self.coalesce(block) } else { block })
  }

  /// Merges the free, already pushed block at `block` with its free address
  /// neighbours and returns the surviving block, always the lowest address.
  fn coalesce(
    &mut self,
    block: usize,
  ) -> usize {
    let size = self.region.header(block).size;
    let prev_tag = self.region.previous_footer(block);
    let next = block + size;
    let next_tag = self.region.header(next);

    match (prev_tag.allocated, next_tag.allocated) {
      (true, true) => block,
      (true, false) => {
        self.pop(next);
        self.pop(block);
        self.region.set_tags(block, Tag::free(size + next_tag.size));
        self.push(block);
        block
      }
      (false, true) => {
        let prev = block - prev_tag.size;
        self.pop(prev);
        self.pop(block);
        self.region.set_tags(prev, Tag::free(prev_tag.size + size));
        self.push(prev);
        prev
      }
      (false, false) => {
        let prev = block - prev_tag.size;
        self.pop(prev);
        self.pop(next);
        self.pop(block);
        self
          .region
          .set_tags(prev, Tag::free(prev_tag.size + size + next_tag.size));
        self.push(prev);
        prev
      }
    }
  }
}

/// See [`Heap::blocks`].
pub struct Blocks<'a> {
  region: &'a Region,
  current: usize,
}

impl Iterator for Blocks<'_> {
  type Item = BlockInfo;

  fn next(&mut self) -> Option<BlockInfo> {
    let tag = self.region.header(self.current);

    if tag.size == 0 {
      return None;
    }

    let info = BlockInfo {
      offset: self.current,
      size: tag.size,
      allocated: tag.allocated,
    };
    self.current += tag.size;

    Some(info)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    class::Single,
    config::DEFAULT_CHUNK_SIZE,
    source::Arena,
  };

  fn heap() -> Heap<Arena> {
    Heap::init(Arena::new(), HeapConfig::default()).unwrap()
  }

  fn offset<M: MemorySource, C: SizeClasses>(
    heap: &Heap<M, C>,
    address: Pointer<u8>,
  ) -> usize {
    heap.region.offset_of(address.unwrap())
  }

  fn snapshot<M: MemorySource, C: SizeClasses>(heap: &Heap<M, C>) -> (Vec<BlockInfo>, Vec<Vec<usize>>) {
    let blocks = heap.blocks().collect();
    let buckets = (0..C::COUNT)
      .map(|bucket| heap.free_blocks(bucket).map(|block| block.offset).collect())
      .collect();

    (blocks, buckets)
  }

  #[test]
  fn test_init_layout() {
    let heap = heap();

    assert_eq!(heap.region_size(), DEFAULT_CHUNK_SIZE);
    assert_eq!(heap.region.header(PROLOGUE), Tag::allocated(8));
    assert_eq!(heap.region.header(DEFAULT_CHUNK_SIZE - 8), Tag::allocated(0));
    assert_eq!(
      heap.blocks().collect::<Vec<_>>(),
      [BlockInfo {
        offset: 8,
        size: 65520,
        allocated: false
      }]
    );
    assert_eq!(heap.free_blocks(21).count(), 1);
    assert_eq!(heap.free_blocks(22).count(), 0);
    assert_eq!(heap.free_blocks(usize::MAX).count(), 0);
    assert!(heap.check(false).is_ok());
  }

  #[test]
  fn test_allocate_zero_is_a_no_op() {
    let mut heap = heap();
    let before = snapshot(&heap);

    assert_eq!(heap.allocate(0), None);
    assert_eq!(heap.try_allocate(0), Ok(None));
    assert_eq!(snapshot(&heap), before);
  }

  #[test]
  fn test_payload_alignment_and_minimum_rounding() {
    let mut heap = heap();

    let address = heap.allocate(1).unwrap();

    assert_eq!(address.as_ptr() as usize % 8, 0);
    assert_eq!(offset(&heap, Some(address)), 16);
    assert_eq!(heap.region.header(8), Tag::allocated(MIN_BLOCK_SIZE));
    assert_eq!(unsafe { heap.usable_size(address) }, 16);
  }

  #[test]
  fn test_released_block_is_reused_first() {
    let mut heap = heap();

    let a = heap.allocate(40);
    let b = heap.allocate(40);

    assert_eq!(offset(&heap, b), offset(&heap, a) + 56);

    unsafe { heap.release(a) };
    let c = heap.allocate(40);

    assert_eq!(c, a);
    assert!(heap.check(false).is_ok());
  }

  #[test]
  fn test_most_recently_freed_wins_within_a_bucket() {
    let mut heap = heap();

    let a = heap.allocate(40);
    let _x = heap.allocate(40);
    let b = heap.allocate(40);
    let _y = heap.allocate(40);

    unsafe {
      heap.release(a);
      heap.release(b);
    }

    assert_eq!(heap.allocate(40), b);
    assert_eq!(heap.allocate(40), a);
  }

  #[test]
  fn test_search_prefers_lower_buckets() {
    let mut heap = heap();

    let a = heap.allocate(184);
    let _spacer = heap.allocate(40);
    unsafe { heap.release(a) };

    let c = heap.allocate(40);

    assert_eq!(c, a);
    // 200 byte block split into 56 allocated and 144 free.
    let rest = offset(&heap, a) - 8 + 56;
    assert_eq!(heap.region.header(rest), Tag::free(144));
    assert_eq!(heap.free_blocks(Segregated::classify(144)).next().unwrap().offset, rest);
  }

  #[test]
  fn test_adjacent_releases_coalesce() {
    let mut heap = heap();

    let a = heap.allocate(40);
    let b = heap.allocate(40);

    unsafe {
      heap.release(a);
      heap.release(b);
    }

    assert_eq!(
      heap.blocks().collect::<Vec<_>>(),
      [BlockInfo {
        offset: 8,
        size: 65520,
        allocated: false
      }]
    );
    assert_eq!(heap.free_blocks(21).count(), 1);
    assert!(heap.check(false).is_ok());
  }

  #[test]
  fn test_coalesce_with_previous_only() {
    let mut heap = heap();

    let a = heap.allocate(40);
    let b = heap.allocate(40);
    let _guard = heap.allocate(40);
    let block = offset(&heap, a) - 8;

    unsafe {
      heap.release(a);
      heap.release(b);
    }

    assert_eq!(heap.region.header(block), Tag::free(112));
    assert_eq!(heap.region.footer(block), Tag::free(112));
    assert!(heap.check(false).is_ok());
  }

  #[test]
  fn test_coalesce_with_both_neighbours() {
    let mut heap = heap();

    let a = heap.allocate(40);
    let b = heap.allocate(40);
    let c = heap.allocate(40);
    let _guard = heap.allocate(40);
    let block = offset(&heap, a) - 8;

    unsafe {
      heap.release(a);
      heap.release(c);
      heap.release(b);
    }

    assert_eq!(heap.region.header(block), Tag::free(168));
    assert_eq!(
      heap.free_blocks(Segregated::classify(168)).map(|b| b.offset).collect::<Vec<_>>(),
      [block]
    );
    assert!(heap.free_blocks(Segregated::classify(56)).next().is_none());
    assert!(heap.check(false).is_ok());
  }

  #[test]
  fn test_coalesce_with_next_only() {
    let mut heap = heap();

    let a = heap.allocate(40);
    let b = heap.allocate(40);
    let _guard = heap.allocate(40);
    let block = offset(&heap, a) - 8;

    unsafe {
      heap.release(b);
      heap.release(a);
    }

    assert_eq!(heap.region.header(block), Tag::free(112));
    assert_eq!(
      heap.free_blocks(Segregated::classify(112)).map(|b| b.offset).collect::<Vec<_>>(),
      [block]
    );
  }

  #[test]
  fn test_remainder_too_small_is_not_split() {
    let config = HeapConfig::new().with_chunk_size(96);
    let mut heap: Heap<Arena> = Heap::init(Arena::with_capacity(96), config).unwrap();

    // 80 byte free block, 56 needed, 24 left over is a splinter.
    let address = heap.allocate(40).unwrap();

    assert_eq!(heap.region.header(8), Tag::allocated(80));
    assert_eq!(unsafe { heap.usable_size(address) }, 64);
    assert!(heap.lists.is_empty());
  }

  #[test]
  fn test_growth_coalesces_with_free_tail() {
    let config = HeapConfig::new().with_chunk_size(4096);
    let mut heap: Heap<Arena> = Heap::init(Arena::new(), config).unwrap();

    let address = heap.allocate(5000);

    assert_eq!(offset(&heap, address), 16);
    assert_eq!(heap.region_size(), 4096 + 5016);
    assert_eq!(heap.region.header(8), Tag::allocated(5016));
    assert_eq!(heap.region.header(5024), Tag::free(4080));
    assert!(heap.check(false).is_ok());
  }

  #[test]
  fn test_growth_exhaustion_leaves_heap_untouched() {
    let mut heap: Heap<Arena> = Heap::init(
      Arena::with_capacity(DEFAULT_CHUNK_SIZE),
      HeapConfig::default(),
    )
    .unwrap();

    let _a = heap.allocate(100);
    let before = snapshot(&heap);

    assert_eq!(heap.allocate(70000), None);
    assert_eq!(
      heap.try_allocate(70000),
      Err(HeapError::OutOfMemory { requested: 70016 })
    );
    assert_eq!(snapshot(&heap), before);
    assert_eq!(heap.region_size(), DEFAULT_CHUNK_SIZE);
  }

  #[test]
  fn test_unencodable_request() {
    let mut heap = heap();

    assert_eq!(heap.allocate(MAX_BLOCK_SIZE), None);
    assert_eq!(
      heap.try_allocate(usize::MAX),
      Err(HeapError::TooLarge {
        requested: usize::MAX
      })
    );
    assert_eq!(
      heap.try_allocate(MAX_BLOCK_SIZE - 16),
      Err(HeapError::TooLarge {
        requested: MAX_BLOCK_SIZE
      })
    );
    assert_eq!(heap.source().used(), DEFAULT_CHUNK_SIZE);
  }

  #[test]
  fn test_small_bypass_grows_without_coalescing() {
    let config = HeapConfig::new().with_small_bypass(64);
    let mut heap: Heap<Arena> = Heap::init(Arena::new(), config).unwrap();

    let a = heap.allocate(8);

    assert_eq!(offset(&heap, a), DEFAULT_CHUNK_SIZE);
    assert_eq!(heap.region_size(), DEFAULT_CHUNK_SIZE + 32);
    assert_eq!(heap.region.header(8), Tag::free(65520));

    unsafe { heap.release(a) };

    assert_eq!(heap.region.header(8), Tag::free(65552));
    assert!(heap.check(false).is_ok());
  }

  #[test]
  fn test_small_bypass_with_coalescing() {
    let config = HeapConfig::new()
      .with_small_bypass(64)
      .with_bypass_coalescing(true);
    let mut heap: Heap<Arena> = Heap::init(Arena::new(), config).unwrap();

    let a = heap.allocate(8);

    assert_eq!(offset(&heap, a), 16);
    assert_eq!(heap.region.header(40), Tag::free(65520));
  }

  #[test]
  fn test_small_bypass_falls_back_to_search() {
    let config = HeapConfig::new().with_small_bypass(64);
    let mut heap: Heap<Arena> =
      Heap::init(Arena::with_capacity(DEFAULT_CHUNK_SIZE), config).unwrap();

    let a = heap.allocate(8);

    assert_eq!(offset(&heap, a), 16);
    assert_eq!(heap.region_size(), DEFAULT_CHUNK_SIZE);

    // Above the threshold the bypass is never taken.
    let b = heap.allocate(100);
    assert_eq!(offset(&heap, b), 48);
  }

  #[test]
  fn test_single_list_policy() {
    let mut heap: Heap<Arena, Single> = Heap::init(Arena::new(), HeapConfig::default()).unwrap();

    assert_eq!(heap.bucket_count(), 1);

    let a = heap.allocate(40);
    let b = heap.allocate(500);
    let _c = heap.allocate(40);

    unsafe { heap.release(b) };
    unsafe { heap.release(a) };

    // a and b merged, then the merged block is the first fit.
    assert_eq!(heap.allocate(40), a);
    assert!(heap.check(false).is_ok());
  }

  #[test]
  fn test_reallocate_moves_and_copies() {
    let mut heap = heap();

    let old = heap.allocate(16).unwrap();
    unsafe {
      for i in 0..16 {
        old.add(i).write(i as u8);
      }

      let grown = heap.reallocate(Some(old), 200).unwrap().unwrap();
      assert_ne!(grown, old);
      for i in 0..16 {
        assert_eq!(grown.add(i).read(), i as u8);
      }
      assert!(!heap.region.header(8).allocated);

      let shrunk = heap.reallocate(Some(grown), 4).unwrap().unwrap();
      for i in 0..4 {
        assert_eq!(shrunk.add(i).read(), i as u8);
      }
    }
    assert!(heap.check(false).is_ok());
  }

  #[test]
  fn test_reallocate_edge_cases() {
    let mut heap = heap();

    let fresh = unsafe { heap.reallocate(None, 24) }.unwrap();
    assert!(fresh.is_some());

    assert_eq!(unsafe { heap.reallocate(fresh, 0) }, Ok(None));
    assert_eq!(heap.stats().free_blocks, 1);
  }

  #[test]
  fn test_reallocate_failure_keeps_original() {
    let mut heap: Heap<Arena> = Heap::init(
      Arena::with_capacity(DEFAULT_CHUNK_SIZE),
      HeapConfig::default(),
    )
    .unwrap();

    let old = heap.allocate(8).unwrap();
    unsafe {
      old.cast::<u64>().write(0xdead_beef);

      assert_eq!(
        heap.reallocate(Some(old), 70000),
        Err(HeapError::OutOfMemory { requested: 70016 })
      );
      assert_eq!(old.cast::<u64>().read(), 0xdead_beef);
    }
    assert!(heap.region.header(8).allocated);
  }

  #[test]
  fn test_release_null_is_ignored() {
    let mut heap = heap();
    let before = snapshot(&heap);

    unsafe { heap.release(None) };

    assert_eq!(snapshot(&heap), before);
  }

  #[test]
  fn test_stats() {
    let mut heap = heap();

    heap.allocate(40);
    heap.allocate(1);

    assert_eq!(
      heap.stats(),
      HeapStats {
        region_size: 65536,
        blocks: 3,
        free_blocks: 1,
        free_bytes: 65520 - 88,
        allocated_bytes: 88,
        largest_free: 65520 - 88,
      }
    );
  }
}
