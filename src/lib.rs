//! # segalloc - A Segregated Free List Heap Allocator
//!
//! This crate implements `malloc`/`free`/`realloc` on top of a single region
//! of memory that can only ever grow, like the one managed by `sbrk(2)`.
//! Free space is tracked with boundary tags and segregated, explicit free
//! lists.
//!
//! ## Overview
//!
//! ```text
//!   Heap Region:
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                                                                      │
//!   │  ┌────┬──────────┬──────┬────────────┬──────┬───────────────────┬──┐ │
//!   │  │ P  │  alloc   │ free │   alloc    │ free │       alloc       │E │ │
//!   │  └────┴──────────┴──┬───┴────────────┴──┬───┴───────────────────┴──┘ │
//!   │                     │                   │                            │
//!   │  buckets[0]  ──► ...                    │                            │
//!   │  buckets[3]  ──► ───┘                   │                            │
//!   │  ...                                    │                            │
//!   │  buckets[21] ──► ───────────────────────┘                            │
//!   │                                                                      │
//!   └──────────────────────────────────────────────────────────────────────┘
//!
//!   P = prologue (8:a), E = epilogue (0:a).
//! ```
//!
//! - **Allocation**: round the request up to a block size, search the
//!   buckets from the request's size class upwards, first fit wins. The
//!   block is split if the rest can stand on its own. No fit means growing
//!   the region.
//! - **Release**: mark the block free, push it to its bucket and merge it
//!   with free neighbours right away, so two free blocks are never adjacent.
//! - **Reallocation**: always allocate, copy and release.
//!
//! ## Crate Structure
//!
//! ```text
//!   segalloc
//!   ├── align      - Alignment macro and helpers (align!)
//!   ├── block      - Header/footer codec and block layout constants
//!   ├── class      - Size class policies (Segregated, Single)
//!   ├── freelist   - Intrusive LIFO free lists, one per bucket
//!   ├── region     - Offset based access to the heap region
//!   ├── source     - Memory sources (Sbrk, Arena)
//!   ├── config     - HeapConfig
//!   ├── heap       - The allocator engine
//!   ├── check      - Consistency checker
//!   └── error      - HeapError
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use segalloc::{Arena, Heap, HeapConfig};
//!
//! let mut heap: Heap<Arena> = Heap::init(Arena::new(), HeapConfig::default()).unwrap();
//!
//! let address = heap.allocate(40).unwrap();
//! unsafe {
//!     address.cast::<u64>().write(42);
//!     assert_eq!(address.cast::<u64>().read(), 42);
//!     heap.release(Some(address));
//! }
//!
//! assert!(heap.check(false).is_ok());
//! ```
//!
//! ## Limitations
//!
//! - **Single-threaded only**: every operation needs `&mut Heap`
//! - **8 byte alignment**: payloads are never aligned to more than 8 bytes
//! - **Never returns memory**: the region only grows
//! - **Regions up to 2 GiB**: block sizes live in a 31 bit field
//!
//! ## Safety
//!
//! Allocating is safe. Releasing and reallocating trust the pointer they are
//! given, so they are `unsafe`: a pointer that wasn't handed out by the same
//! heap, or one released twice, corrupts the heap silently.

use std::ptr::NonNull;

pub mod align;
pub mod block;
mod check;
pub mod class;
mod config;
mod error;
mod freelist;
mod heap;
mod region;
mod source;

/// Nullable pointer handed out by the heap, `None` playing the role of a
/// null pointer.
pub type Pointer<T> = Option<NonNull<T>>;

pub use check::{CheckReport, Violation};
pub use class::{Segregated, Single, SizeClasses};
pub use config::{DEFAULT_CHUNK_SIZE, DEFAULT_SMALL_BYPASS, HeapConfig};
pub use error::HeapError;
pub use heap::{BlockInfo, Blocks, Heap, HeapStats, MAX_REGION_SIZE};
pub use source::{Arena, DEFAULT_ARENA_SIZE, MemorySource, Sbrk, program_break};
