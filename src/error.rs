use std::{error, fmt};

/// Everything that can go wrong while managing the heap. Misuse of pointers
/// handed out by the heap is not detected and is not part of this type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeapError {
  /// The memory source refused to grow by `requested` bytes.
  OutOfMemory { requested: usize },
  /// The block needed for `requested` bytes can't be encoded in a header, or
  /// growing would push the region past the largest encodable size.
  TooLarge { requested: usize },
  /// The memory source returned memory that doesn't continue the region.
  Discontiguous { expected: usize, found: usize },
  /// The region base is not 8 byte aligned.
  Misaligned { address: usize },
  /// The heap configuration can't be used.
  InvalidConfig(&'static str),
}

impl fmt::Display for HeapError {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    match self {
      Self::OutOfMemory { requested } => {
        write!(f, "memory source could not grow by {requested} bytes")
      }
      Self::TooLarge { requested } => {
        write!(f, "request of {requested} bytes exceeds the maximum block size")
      }
      Self::Discontiguous { expected, found } => write!(
        f,
        "memory source returned {found:#x}, expected the region to continue at {expected:#x}"
      ),
      Self::Misaligned { address } => {
        write!(f, "region base {address:#x} is not 8 byte aligned")
      }
      Self::InvalidConfig(reason) => write!(f, "invalid heap configuration: {reason}"),
    }
  }
}

impl error::Error for HeapError {}
