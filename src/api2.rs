//! Lets an [`Allocator`] back the collections of `allocator_api2`.
//!
//! ```rust
//! use allocator_api2::vec::Vec;
//! use chunkalloc::{Allocator, Config};
//!
//! let arena = Allocator::<u8>::with_config(Config::new(256)).unwrap();
//! let mut values = Vec::new_in(arena.clone());
//! values.extend_from_slice(&[1u32, 2, 3]);
//!
//! assert_eq!(values.iter().sum::<u32>(), 6);
//! assert_eq!(arena.chunk_count(), 1);
//! ```

use std::{alloc::Layout, ptr::NonNull};

use allocator_api2::alloc::{AllocError as ApiAllocError, Allocator as ApiAllocator};
use tracing::trace;

use crate::allocator::Allocator;

// SAFETY: blocks live in chunks owned by the group, and every clone of a
// handle shares that group, so blocks stay valid until the last clone is
// dropped.
unsafe impl<T> ApiAllocator for Allocator<T> {
  fn allocate(
    &self,
    layout: Layout,
  ) -> Result<NonNull<[u8]>, ApiAllocError> {
    let ptr = self.allocate_layout(layout).map_err(|err| {
      trace!(%err, "container allocation refused");
      ApiAllocError
    })?;

    Ok(NonNull::slice_from_raw_parts(ptr, layout.size()))
  }

  unsafe fn deallocate(
    &self,
    ptr: NonNull<u8>,
    layout: Layout,
  ) {
    trace!(?ptr, size = layout.size(), "deallocate ignored");
  }
}
