//! Segregated free lists.
//!
//! Each bucket is a null terminated, doubly linked list threaded through the
//! bodies of its free blocks. New blocks go to the front (LIFO), so the most
//! recently freed block of a bucket is the first one a search sees:
//!
//! ```text
//!   heads[b] ──► ┌──────┐ next ┌──────┐ next ┌──────┐
//!                │ free │ ───► │ free │ ───► │ free │ ───► 0
//!          0 ◄── │      │ ◄─── │      │ ◄─── │      │
//!           prev └──────┘ prev └──────┘ prev └──────┘
//! ```
//!
//! List order has nothing to do with address order.

use crate::{
  class::MAX_CLASSES,
  region::{NIL, Region},
};

pub struct FreeLists {
  heads: [usize; MAX_CLASSES],
  count: usize,
}

impl FreeLists {
  /// `count` empty buckets.
  pub const fn new(count: usize) -> Self {
    assert!(count >= 1 && count <= MAX_CLASSES);

    Self {
      heads: [NIL; MAX_CLASSES],
      count,
    }
  }

  pub fn count(&self) -> usize {
    self.count
  }

  pub fn head(
    &self,
    bucket: usize,
  ) -> usize {
    self.heads[bucket]
  }

  #[cfg(test)]
  pub fn is_empty(&self) -> bool {
    self.heads[..self.count].iter().all(|head| *head == NIL)
  }

  /// Inserts `block` at the front of `bucket`.
  pub fn push(
    &mut self,
    region: &mut Region,
    block: usize,
    bucket: usize,
  ) {
    let head = self.heads[bucket];

    region.set_prev_link(block, NIL);
    region.set_next_link(block, head);

    if head != NIL {
      region.set_prev_link(head, block);
    }

    self.heads[bucket] = block;
  }

  /// Unlinks `block` from `bucket`. The bucket must be the one `block` was
  /// pushed to, which is not checked. The links of `block` are left as they
  /// were and must not be trusted afterwards.
  pub fn pop(
    &mut self,
    region: &mut Region,
    block: usize,
    bucket: usize,
  ) {
    let next = region.next_link(block);
    let prev = region.prev_link(block);

    match (prev, next) {
      (NIL, NIL) => self.heads[bucket] = NIL,
      (NIL, next) => {
        self.heads[bucket] = next;
        region.set_prev_link(next, NIL);
      }
      (prev, NIL) => region.set_next_link(prev, NIL),
      (prev, next) => {
        region.set_next_link(prev, next);
        region.set_prev_link(next, prev);
      }
    }
  }

  /// Blocks of `bucket` in list order. Buckets past [`Self::count`] are
  /// empty.
  pub fn iter<'a>(
    &self,
    region: &'a Region,
    bucket: usize,
  ) -> Iter<'a> {
    let current = if bucket < self.count { self.heads[bucket] } else { NIL };

    Iter { region, current }
  }
}

pub struct Iter<'a> {
  region: &'a Region,
  current: usize,
}

impl Iterator for Iter<'_> {
  type Item = usize;

  fn next(&mut self) -> Option<usize> {
    if self.current == NIL {
      return None;
    }

    let block = self.current;
    self.current = self.region.next_link(block);

    Some(block)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::source::{Arena, MemorySource};

  fn region() -> (Arena, Region) {
    let mut arena = Arena::with_capacity(512);
    let base = arena.grow(512).unwrap();

    (arena, Region::new(base, 512).unwrap())
  }

  fn collect(
    lists: &FreeLists,
    region: &Region,
    bucket: usize,
  ) -> Vec<usize> {
    lists.iter(region, bucket).collect()
  }

  #[test]
  fn test_push_is_lifo() {
    let (_arena, mut region) = region();
    let mut lists = FreeLists::new(2);

    lists.push(&mut region, 8, 1);
    lists.push(&mut region, 40, 1);
    lists.push(&mut region, 72, 1);

    assert_eq!(collect(&lists, &region, 1), [72, 40, 8]);
    assert_eq!(region.prev_link(40), 72);
    assert_eq!(region.prev_link(72), NIL);
    assert!(collect(&lists, &region, 0).is_empty());
  }

  #[test]
  fn test_pop_every_position() {
    let (_arena, mut region) = region();
    let mut lists = FreeLists::new(1);

    for block in [8, 40, 72, 104] {
      lists.push(&mut region, block, 0);
    }

    // Interior.
    lists.pop(&mut region, 40, 0);
    assert_eq!(collect(&lists, &region, 0), [104, 72, 8]);
    assert_eq!(region.prev_link(8), 72);

    // Tail.
    lists.pop(&mut region, 8, 0);
    assert_eq!(collect(&lists, &region, 0), [104, 72]);

    // Head.
    lists.pop(&mut region, 104, 0);
    assert_eq!(collect(&lists, &region, 0), [72]);
    assert_eq!(region.prev_link(72), NIL);

    // Sole member.
    lists.pop(&mut region, 72, 0);
    assert!(lists.is_empty());
  }

  #[test]
  fn test_buckets_past_count_are_empty() {
    let (_arena, mut region) = region();
    let mut lists = FreeLists::new(1);

    lists.push(&mut region, 8, 0);

    assert!(collect(&lists, &region, 1).is_empty());
    assert!(collect(&lists, &region, MAX_CLASSES + 3).is_empty());
  }

  #[test]
  #[should_panic]
  fn test_too_many_buckets() {
    FreeLists::new(MAX_CLASSES + 1);
  }
}
