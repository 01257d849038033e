//! Heap consistency checker.
//!
//! Purely diagnostic: walks the block chain from prologue to epilogue, then
//! every bucket, and reports what doesn't add up. Findings go to the log
//! and are returned in a [`CheckReport`]. Two address adjacent free blocks
//! mean coalescing is broken and abort the check with a panic.

use std::fmt;

use log::{error, info};

use crate::{
  align::is_aligned,
  block::{self, Body, MIN_BLOCK_SIZE, PROLOGUE_SIZE, Tag},
  class::SizeClasses,
  heap::{Heap, PROLOGUE},
  region::NIL,
  source::MemorySource,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Violation {
  BadPrologue { tag: Tag },
  BadEpilogue { offset: usize, tag: Tag },
  /// A header size that can't be right: too small or running past the
  /// epilogue. The walk stops here.
  BadSize { offset: usize, size: usize },
  /// The walk or a list left the region.
  OutOfBounds { offset: usize },
  HeaderFooterMismatch { offset: usize, header: Tag, footer: Tag },
  /// A block size that is not a multiple of 8 puts the block at `offset`
  /// and every payload after it off alignment. The walk stops here.
  MisalignedPayload { offset: usize },
  /// Block sizes don't add up to the region size.
  Conservation { counted: usize, region: usize },
  /// The `position`th member of `bucket` is allocated.
  NotFree { bucket: usize, position: usize, offset: usize },
  /// A free block filed under a bucket its size doesn't map to.
  WrongBucket { bucket: usize, offset: usize, expected: usize },
  /// A member whose `prev` link doesn't point at its predecessor.
  BrokenLink { bucket: usize, offset: usize },
  /// A bucket longer than the region could possibly hold.
  Cycle { bucket: usize },
  /// Free blocks found walking the region vs. walking the lists.
  FreeCount { walked: usize, listed: usize },
}

impl fmt::Display for Violation {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    match self {
      Self::BadPrologue { tag } => {
        write!(f, "bad prologue header [{}:{}]", tag.size, tag.flag())
      }
      Self::BadEpilogue { offset, tag } => write!(
        f,
        "{offset}: bad epilogue header [{}:{}]",
        tag.size,
        tag.flag()
      ),
      Self::BadSize { offset, size } => write!(f, "{offset}: impossible block size {size}"),
      Self::OutOfBounds { offset } => write!(f, "{offset}: outside the region"),
      Self::HeaderFooterMismatch {
        offset,
        header,
        footer,
      } => write!(
        f,
        "{offset}: header [{}:{}] does not match footer [{}:{}]",
        header.size,
        header.flag(),
        footer.size,
        footer.flag()
      ),
      Self::MisalignedPayload { offset } => {
        write!(f, "{offset}: block and payload are not aligned")
      }
      Self::Conservation { counted, region } => write!(
        f,
        "blocks add up to {counted} bytes, region has {region}"
      ),
      Self::NotFree {
        bucket,
        position,
        offset,
      } => write!(
        f,
        "{offset}: block number {position} of bucket {bucket} is not free"
      ),
      Self::WrongBucket {
        bucket,
        offset,
        expected,
      } => write!(f, "{offset}: listed in bucket {bucket}, belongs in {expected}"),
      Self::BrokenLink { bucket, offset } => {
        write!(f, "{offset}: prev link broken in bucket {bucket}")
      }
      Self::Cycle { bucket } => write!(f, "bucket {bucket} does not terminate"),
      Self::FreeCount { walked, listed } => write!(
        f,
        "{walked} free blocks in the region but {listed} in the free lists"
      ),
    }
  }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckReport {
  /// Blocks visited between the sentinels.
  pub blocks: usize,
  /// Free blocks among them.
  pub free_blocks: usize,
  pub violations: Vec<Violation>,
}

impl CheckReport {
  pub fn is_ok(&self) -> bool {
    self.violations.is_empty()
  }

  fn report(
    &mut self,
    violation: Violation,
  ) {
    error!("{violation}");
    self.violations.push(violation);
  }
}

impl<M: MemorySource, C: SizeClasses> Heap<M, C> {
  /// Checks every heap invariant. With `verbose` set, every block is logged
  /// at info level as well.
  ///
  /// # Panics
  ///
  /// If two address adjacent blocks are both free.
  pub fn check(
    &self,
    verbose: bool,
  ) -> CheckReport {
    let mut report = CheckReport::default();

    if verbose {
      info!("heap ({:?}), {} bytes:", self.region.base(), self.region.len());
    }

    self.check_blocks(&mut report, verbose);
    self.check_lists(&mut report);

    report
  }

  fn check_blocks(
    &self,
    report: &mut CheckReport,
    verbose: bool,
  ) {
    let region = &self.region;

    let prologue = region.header(PROLOGUE);
    if prologue != Tag::allocated(PROLOGUE_SIZE) {
      report.report(Violation::BadPrologue { tag: prologue });
    }

    let mut block = PROLOGUE + PROLOGUE_SIZE;
    let mut counted = PROLOGUE_SIZE;
    let mut previous_free = None;

    loop {
      if !region.contains_word(block) {
        report.report(Violation::OutOfBounds { offset: block });
        return;
      }

      let header = region.header(block);
      if header.size == 0 {
        break;
      }

      if header.size < MIN_BLOCK_SIZE || block + header.size > region.epilogue() {
        report.report(Violation::BadSize {
          offset: block,
          size: header.size,
        });
        return;
      }

      if !is_aligned(header.size) {
        report.report(Violation::MisalignedPayload {
          offset: block + header.size,
        });
        return;
      }

      let footer = region.footer(block);

      if verbose {
        info!(
          "{block}: header: [{}:{}] footer: [{}:{}]",
          header.size,
          header.flag(),
          footer.size,
          footer.flag()
        );
      }

      if footer != header {
        report.report(Violation::HeaderFooterMismatch {
          offset: block,
          header,
          footer,
        });
      }

      if !header.allocated {
        if let Some(previous) = previous_free {
          error!("{block}: coalescing error, previous block at {previous} is free too");
          panic!("adjacent free blocks at offsets {previous} and {block}");
        }

        report.free_blocks += 1;
        previous_free = Some(block);
      } else {
        previous_free = None;
      }

      report.blocks += 1;
      counted += header.size;
      block += header.size;
    }

    if verbose {
      info!("{block}: EOL");
    }

    let epilogue = region.header(block);
    if epilogue != Tag::allocated(0) {
      report.report(Violation::BadEpilogue {
        offset: block,
        tag: epilogue,
      });
    }

    counted += block::HEADER_SIZE;
    if counted != region.len() {
      report.report(Violation::Conservation {
        counted,
        region: region.len(),
      });
    }
  }

  fn check_lists(
    &self,
    report: &mut CheckReport,
  ) {
    let region = &self.region;
    let limit = region.len() / MIN_BLOCK_SIZE;
    let mut listed = 0;

    for bucket in 0..self.lists.count() {
      let mut previous = NIL;
      let mut member = self.lists.head(bucket);
      let mut position = 0;

      while member != NIL {
        if position > limit {
          report.report(Violation::Cycle { bucket });
          break;
        }

        // Bounding `member` by the region first keeps the link offset from
        // overflowing.
        if member < PROLOGUE_SIZE
          || member >= region.len()
          || !region.contains_word(member + block::PREV_LINK)
        {
          report.report(Violation::OutOfBounds { offset: member });
          break;
        }

        let tag = region.header(member);
        if tag.allocated {
          report.report(Violation::NotFree {
            bucket,
            position,
            offset: member,
          });
        } else if C::classify(tag.size) != bucket {
          report.report(Violation::WrongBucket {
            bucket,
            offset: member,
            expected: C::classify(tag.size),
          });
        }

        if let Body::Links { prev, .. } = region.body(member) {
          if prev != previous {
            report.report(Violation::BrokenLink {
              bucket,
              offset: member,
            });
          }
        }

        listed += 1;
        position += 1;
        previous = member;
        member = region.next_link(member);
      }
    }

    if listed != report.free_blocks {
      report.report(Violation::FreeCount {
        walked: report.free_blocks,
        listed,
      });
    }
  }
}
