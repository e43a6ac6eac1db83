use std::alloc::Layout;

use crate::error::AllocError;

/// Chunk size used by [`Config::default`].
pub const DEFAULT_CHUNK_CAPACITY: usize = 4096;

/// Alignment of every chunk buffer, and therefore the largest element
/// alignment an allocator can serve.
pub const CHUNK_ALIGN: usize = 16;

// SAFETY: CHUNK_ALIGN is a power of two and the capacity is far below isize::MAX.
pub(crate) const DEFAULT_CHUNK_LAYOUT: Layout =
  unsafe { Layout::from_size_align_unchecked(DEFAULT_CHUNK_CAPACITY, CHUNK_ALIGN) };

/// Order in which a group scans its chunks for free space.
///
/// ```text
///   chain (creation order):   [ #0 ] [ #1 ] [ #2 ]
///
///   OldestFirst:                #0 ──► #1 ──► #2
///   NewestFirst:                #0 ◄── #1 ◄── #2
/// ```
///
/// New chunks always join the newest end of the chain, so a `NewestFirst`
/// scan visits a fresh chunk first and an `OldestFirst` scan visits it last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
  /// Prefer the most recently created chunk. Cheapest when requests have
  /// similar sizes, since older chunks are usually exhausted.
  #[default]
  NewestFirst,
  /// Fill older chunks before touching newer ones.
  OldestFirst,
}

/// Settings fixed for the lifetime of an allocator group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
  chunk_capacity: usize,
  search_mode: SearchMode,
}

impl Default for Config {
  fn default() -> Self {
    Self::new(DEFAULT_CHUNK_CAPACITY)
  }
}

impl Config {
  pub const fn new(chunk_capacity: usize) -> Self {
    Self {
      chunk_capacity,
      search_mode: SearchMode::NewestFirst,
    }
  }

  pub const fn with_chunk_capacity(
    mut self,
    chunk_capacity: usize,
  ) -> Self {
    self.chunk_capacity = chunk_capacity;
    self
  }

  pub const fn with_search_mode(
    mut self,
    search_mode: SearchMode,
  ) -> Self {
    self.search_mode = search_mode;
    self
  }

  pub const fn chunk_capacity(&self) -> usize {
    self.chunk_capacity
  }

  pub const fn search_mode(&self) -> SearchMode {
    self.search_mode
  }

  /// Checks that chunks of the configured capacity can be allocated.
  pub fn validate(&self) -> Result<(), AllocError> {
    self.chunk_layout().map(|_| ())
  }

  pub(crate) fn chunk_layout(&self) -> Result<Layout, AllocError> {
    if self.chunk_capacity == 0 {
      return Err(AllocError::ZeroCapacity);
    }

    Layout::from_size_align(self.chunk_capacity, CHUNK_ALIGN).map_err(|_| {
      AllocError::CapacityOverflow {
        capacity: self.chunk_capacity,
      }
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.chunk_capacity(), DEFAULT_CHUNK_CAPACITY);
    assert_eq!(config.search_mode(), SearchMode::NewestFirst);
    assert_eq!(config.chunk_layout(), Ok(DEFAULT_CHUNK_LAYOUT));
  }

  #[test]
  fn test_builder_setters() {
    let config = Config::default()
      .with_chunk_capacity(8)
      .with_search_mode(SearchMode::OldestFirst);

    assert_eq!(config.chunk_capacity(), 8);
    assert_eq!(config.search_mode(), SearchMode::OldestFirst);
    assert!(config.validate().is_ok());
  }

  #[test]
  fn test_invalid_capacities() {
    assert_eq!(Config::new(0).validate(), Err(AllocError::ZeroCapacity));
    assert_eq!(
      Config::new(usize::MAX).validate(),
      Err(AllocError::CapacityOverflow {
        capacity: usize::MAX
      })
    );
  }

  #[test]
  fn test_chunk_layout_alignment() {
    let layout = Config::new(24).chunk_layout().unwrap();

    assert_eq!(layout.size(), 24);
    assert_eq!(layout.align(), CHUNK_ALIGN);
  }
}
