use std::{
  alloc::Layout,
  cell::RefCell,
  ptr::{self, NonNull},
  rc::{Rc, Weak},
};

use tracing::{debug, trace};

use crate::{
  chunk::Chunk,
  config::{CHUNK_ALIGN, Config, SearchMode},
  error::AllocError,
};

/// State shared by every allocator handle cloned or rebound from one another.
pub(crate) type SharedGroup = Rc<RefCell<Group>>;

/// The chunk chain of one allocator group.
///
/// Chunks are kept in creation order; index 0 is the oldest. The number of
/// handles sharing a group is the strong count of its [`SharedGroup`], and
/// dropping the last one drops the group and every chunk in it.
pub(crate) struct Group {
  chunks: Vec<Chunk>,
  config: Config,
  chunk_layout: Layout,
}

impl Group {
  pub fn new(
    config: Config,
    chunk_layout: Layout,
  ) -> Self {
    debug!(
      capacity = chunk_layout.size(),
      search_mode = ?config.search_mode(),
      "allocator group created"
    );

    Self {
      chunks: Vec::new(),
      config,
      chunk_layout,
    }
  }

  pub fn shared(
    config: Config,
    chunk_layout: Layout,
  ) -> SharedGroup {
    Rc::new(RefCell::new(Self::new(config, chunk_layout)))
  }

  pub fn config(&self) -> Config {
    self.config
  }

  pub fn capacity(&self) -> usize {
    self.chunk_layout.size()
  }

  pub fn chunk_count(&self) -> usize {
    self.chunks.len()
  }

  /// Carves `layout` out of the first chunk with room for it, creating a
  /// chunk when none has.
  ///
  /// A request is never split across chunks and never causes an oversized
  /// chunk to be created.
  pub fn allocate(
    &mut self,
    layout: Layout,
  ) -> Result<NonNull<u8>, AllocError> {
    let (size, align) = (layout.size(), layout.align());

    if align > CHUNK_ALIGN {
      return Err(AllocError::UnsupportedAlignment {
        align,
        max: CHUNK_ALIGN,
      });
    }

    if size > self.capacity() {
      return Err(AllocError::RequestTooLarge {
        requested: size,
        capacity: self.capacity(),
      });
    }

    if size == 0 {
      // SAFETY: alignments are never zero.
      return Ok(unsafe { NonNull::new_unchecked(ptr::without_provenance_mut(align)) });
    }

    let index = match self.find_chunk(size, align) {
      Some(index) => index,
      None => self.push_chunk(),
    };

    let chunk = &mut self.chunks[index];
    let offset = chunk.reserve_aligned(size, align);

    trace!(requested = size, chunk = index, offset, "reserved");

    Ok(chunk.ptr_at(offset))
  }

  fn find_chunk(
    &self,
    size: usize,
    align: usize,
  ) -> Option<usize> {
    let mut chunks = self.chunks.iter();

    match self.config.search_mode() {
      SearchMode::NewestFirst => chunks.rposition(|chunk| chunk.fits(size, align)),
      SearchMode::OldestFirst => chunks.position(|chunk| chunk.fits(size, align)),
    }
  }

  fn push_chunk(&mut self) -> usize {
    self.chunks.push(Chunk::new(self.chunk_layout));

    let index = self.chunks.len() - 1;
    debug!(chunk = index, capacity = self.capacity(), "chunk created");

    index
  }

  pub fn stats(
    &self,
    members: usize,
  ) -> GroupStats {
    GroupStats {
      members,
      chunks: self.chunks.len(),
      chunk_capacity: self.capacity(),
      bytes_reserved: self.chunks.iter().map(Chunk::capacity).sum(),
      bytes_used: self.chunks.iter().map(Chunk::used).sum(),
    }
  }
}

impl Drop for Group {
  fn drop(&mut self) {
    debug!(
      chunks = self.chunks.len(),
      bytes = self.chunks.len() * self.capacity(),
      "allocator group torn down"
    );
  }
}

/// A snapshot of a group's footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupStats {
  /// Allocator handles sharing the group.
  pub members: usize,
  /// Chunks in the chain.
  pub chunks: usize,
  pub chunk_capacity: usize,
  /// Bytes held from the system, `chunks * chunk_capacity`.
  pub bytes_reserved: usize,
  /// Bytes handed out, alignment padding included.
  pub bytes_used: usize,
}

/// Observes a group without keeping it alive.
///
/// Obtained from [`Allocator::downgrade`](crate::Allocator::downgrade).
#[derive(Debug, Clone)]
pub struct WeakGroup {
  group: Weak<RefCell<Group>>,
}

impl WeakGroup {
  pub(crate) fn new(group: &SharedGroup) -> Self {
    Self {
      group: Rc::downgrade(group),
    }
  }

  /// Allocator handles still sharing the group.
  pub fn member_count(&self) -> usize {
    self.group.strong_count()
  }

  /// Whether the last handle is gone and the chain has been released.
  pub fn is_torn_down(&self) -> bool {
    self.member_count() == 0
  }
}
