//! # chunkalloc - Chunked Bump Allocation with Shared Groups
//!
//! This crate provides a typed **chunked bump allocator**. Storage is carved
//! out of fixed-size chunks, and copies of an allocator share those chunks
//! instead of duplicating them.
//!
//! ## Overview
//!
//! ```text
//!   Chunked Bump Allocation:
//!
//!   ┌──────────────────────────────┐   ┌──────────────────────────────┐
//!   │ chunk #0                     │   │ chunk #1                     │
//!   │ ┌────┬────┬────┬───────────┐ │   │ ┌────┬─────────────────────┐ │
//!   │ │ A1 │ A2 │ A3 │   free    │ │   │ │ A4 │        free         │ │
//!   │ └────┴────┴────┴───────────┘ │   │ └────┴─────────────────────┘ │
//!   │                ▲             │   │      ▲                       │
//!   │              cursor          │   │    cursor                    │
//!   └──────────────────────────────┘   └──────────────────────────────┘
//!
//!   A request is served from the first chunk with enough room.
//!   When none has room, a new chunk of the same capacity joins the chain.
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   chunkalloc
//!   ├── align      - Alignment macro (align_up!)
//!   ├── allocator  - Allocator<T>, the typed handle
//!   ├── api2       - allocator_api2::alloc::Allocator implementation
//!   ├── chunk      - Fixed-size buffer with a bump cursor (internal)
//!   ├── config     - Config, SearchMode and chunk constants
//!   ├── error      - AllocError
//!   └── group      - Shared chunk chain, GroupStats, WeakGroup
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use chunkalloc::{Allocator, Config};
//!
//! let allocator = Allocator::<i32>::with_config(Config::new(8)).unwrap();
//!
//! let ptr = allocator.allocate(1).unwrap();
//! unsafe {
//!   allocator.construct(ptr, 42);
//!   assert_eq!(ptr.read(), 42);
//!   allocator.destroy(ptr);
//! }
//!
//! // Freeing is a no-op; the bytes stay reserved.
//! allocator.deallocate(ptr, 1);
//! assert_eq!(allocator.stats().bytes_used, 4);
//! ```
//!
//! ## Groups
//!
//! Every allocator created with [`Allocator::new`] or
//! [`Allocator::with_config`] starts a group of its own. Cloning it, or
//! calling [`Allocator::rebind`], adds a member to that group:
//!
//! ```text
//!   a = Allocator::new()      group { members: 1, chunks: [] }
//!   b = a.clone()             group { members: 2, chunks: [] }
//!   b.allocate(1)             group { members: 2, chunks: [#0] }
//!   drop(a)                   group { members: 1, chunks: [#0] }
//!   drop(b)                   torn down, #0 released
//! ```
//!
//! Growth made through one member is visible to all of them. Assigning over
//! a handle with [`Clone::clone_from`] leaves its old group first, which
//! tears that group down if the handle was its last member.
//!
//! ```rust
//! use chunkalloc::{Allocator, Config};
//!
//! let a = Allocator::<u32>::with_config(Config::new(8)).unwrap();
//! a.allocate(1).unwrap();
//!
//! let b = a.clone();
//! b.allocate(1).unwrap(); // fills the rest of chunk #0
//! a.allocate(1).unwrap(); // needs chunk #1
//!
//! assert_eq!(b.chunk_count(), 2);
//! ```
//!
//! ## Limitations
//!
//! - **Single-threaded only**: handles are neither `Send` nor `Sync`
//! - **No reuse**: `deallocate` never frees; memory returns only at teardown
//! - **Bounded requests**: one request must fit in one chunk
//! - **Bounded alignment**: element alignment up to [`CHUNK_ALIGN`]
//!
//! ## Safety
//!
//! Allocation is safe. Writing to, reading from, or dropping values behind the
//! returned pointers is `unsafe`, as with any raw allocator.

pub mod align;
mod allocator;
mod api2;
mod chunk;
mod config;
mod error;
mod group;

pub use allocator::Allocator;
pub use config::{CHUNK_ALIGN, Config, DEFAULT_CHUNK_CAPACITY, SearchMode};
pub use error::AllocError;
pub use group::{GroupStats, WeakGroup};
