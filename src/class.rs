//! Size classes.
//!
//! A block stores no bucket tag, so the bucket a block lives in is always
//! recomputed from its current size. Pushing and popping the same block must
//! therefore see the same size.

use crate::block::MIN_BLOCK_SIZE;

/// Upper bound on the number of buckets a policy may use.
pub const MAX_CLASSES: usize = 32;

/// Maps block sizes to free list buckets.
///
/// Implementations must be pure and monotonic: `a <= b` implies
/// `classify(a) <= classify(b)`, and every result is below [`Self::COUNT`].
pub trait SizeClasses {
  /// Number of buckets, between 1 and [`MAX_CLASSES`].
  const COUNT: usize;

  fn classify(size: usize) -> usize;
}

/// Segregated fits with 22 buckets.
///
/// ```text
///   size          bucket
///   32..=47         0
///   48..=63         1
///   ...            ...
///   240..=255      13
///   256..=511      14
///   512..=1023     15
///   ...            ...
///   2^14..2^15     20
///   2^15..         21
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Segregated;

const SMALL_LIMIT: usize = 256;

const SMALL_STEP: usize = 16;

const SMALL_CLASSES: usize = (SMALL_LIMIT - MIN_BLOCK_SIZE).div_ceil(SMALL_STEP);

impl SizeClasses for Segregated {
  const COUNT: usize = 22;

  #[inline]
  fn classify(size: usize) -> usize {
    if size < SMALL_LIMIT {
      return size.saturating_sub(MIN_BLOCK_SIZE) / SMALL_STEP;
    }

    // log2(256) - 5 == 3 has to land right after the small classes.
    let index = size.ilog2() as usize - 5;
    if index < 10 {
      return index + SMALL_CLASSES - 3;
    }

    Self::COUNT - 1
  }
}

/// A single explicit free list holding every free block.
#[derive(Clone, Copy, Debug, Default)]
pub struct Single;

impl SizeClasses for Single {
  const COUNT: usize = 1;

  #[inline]
  fn classify(_size: usize) -> usize {
    0
  }
}
