use std::{
  alloc::{self, Layout},
  ptr::NonNull,
};

use crate::align_up;

/// One fixed-size buffer with a bump cursor.
///
/// ```text
///   ┌──────────┬──────────┬─────┬──────────────────────────┐
///   │ request  │ request  │ pad │         free             │
///   └──────────┴──────────┴─────┴──────────────────────────┘
///   0                                ▲                capacity
///                                  cursor
/// ```
///
/// The cursor only moves forward. Space is returned to the system when the
/// chunk is dropped together with the rest of its group.
pub(crate) struct Chunk {
  buffer: NonNull<u8>,
  layout: Layout,
  cursor: usize,
}

impl Chunk {
  /// Allocates a buffer for `layout`, which must have a non-zero size.
  pub fn new(layout: Layout) -> Self {
    debug_assert!(layout.size() > 0);

    let buffer = unsafe { alloc::alloc(layout) };
    let Some(buffer) = NonNull::new(buffer) else {
      alloc::handle_alloc_error(layout);
    };

    Self {
      buffer,
      layout,
      cursor: 0,
    }
  }

  pub fn capacity(&self) -> usize {
    self.layout.size()
  }

  pub fn used(&self) -> usize {
    self.cursor
  }

  pub fn remaining(&self) -> usize {
    self.capacity() - self.cursor
  }

  /// Bytes to skip before the cursor sits on a multiple of `align`.
  ///
  /// The buffer itself is aligned to the chunk alignment, so for any `align`
  /// up to that value an aligned offset is also an aligned address.
  fn padding(
    &self,
    align: usize,
  ) -> usize {
    align_up!(self.cursor, align) - self.cursor
  }

  pub fn fits(
    &self,
    size: usize,
    align: usize,
  ) -> bool {
    self.padding(align) + size <= self.remaining()
  }

  /// Advances the cursor by `bytes` and returns the offset it started at.
  ///
  /// Callers check [`Chunk::remaining`] first.
  pub fn reserve(
    &mut self,
    bytes: usize,
  ) -> usize {
    debug_assert!(bytes <= self.remaining());

    let offset = self.cursor;
    self.cursor += bytes;
    offset
  }

  /// Skips alignment padding, then reserves `size` bytes.
  ///
  /// Callers check [`Chunk::fits`] first.
  pub fn reserve_aligned(
    &mut self,
    size: usize,
    align: usize,
  ) -> usize {
    let padding = self.padding(align);
    self.reserve(padding);
    self.reserve(size)
  }

  pub fn ptr_at(
    &self,
    offset: usize,
  ) -> NonNull<u8> {
    debug_assert!(offset <= self.capacity());

    unsafe { self.buffer.add(offset) }
  }
}

impl Drop for Chunk {
  fn drop(&mut self) {
    unsafe { alloc::dealloc(self.buffer.as_ptr(), self.layout) };
  }
}
