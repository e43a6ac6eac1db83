use std::{alloc::Layout, fmt, marker::PhantomData, mem, ptr::NonNull, rc::Rc};

use tracing::{debug, trace};

use crate::{
  config::{Config, DEFAULT_CHUNK_LAYOUT},
  error::AllocError,
  group::{Group, GroupStats, SharedGroup, WeakGroup},
};

/// A typed handle onto a shared chain of bump-allocated chunks.
///
/// Cloning a handle does not copy any memory: the clone joins the same group
/// and draws from the same chunks. Chunks are released only when the last
/// handle of the group is dropped.
///
/// ```text
///   Allocator<A> ──┐
///   Allocator<B> ──┼──► group ──► [ chunk #0 ][ chunk #1 ] ...
///   Allocator<C> ──┘     members = 3
/// ```
///
/// Individual objects are never freed. [`Allocator::deallocate`] does
/// nothing, so containers that release and re-request storage keep growing
/// the chain until the whole group goes away.
///
/// # Examples
///
/// ```rust
/// use chunkalloc::{Allocator, Config};
///
/// let allocator = Allocator::<u32>::with_config(Config::new(8)).unwrap();
///
/// let first = allocator.allocate(1).unwrap();
/// let second = allocator.allocate(1).unwrap();
/// assert_eq!(allocator.chunk_count(), 1);
///
/// // The chunk is full, so the third request opens another one.
/// allocator.allocate(1).unwrap();
/// assert_eq!(allocator.chunk_count(), 2);
///
/// // Twelve bytes never fit in an eight byte chunk.
/// assert!(allocator.allocate(3).is_none());
///
/// unsafe {
///   allocator.construct(first, 1221);
///   allocator.construct(second, 454);
///   assert_eq!(first.read() + second.read(), 1675);
/// }
/// ```
pub struct Allocator<T> {
  group: SharedGroup,
  _marker: PhantomData<fn() -> T>,
}

impl<T> Allocator<T> {
  /// Creates a handle on a fresh, empty group with the default configuration.
  pub fn new() -> Self {
    Self::from_group(Group::shared(Config::default(), DEFAULT_CHUNK_LAYOUT))
  }

  /// Creates a handle on a fresh, empty group.
  pub fn with_config(config: Config) -> Result<Self, AllocError> {
    let chunk_layout = config.chunk_layout()?;

    Ok(Self::from_group(Group::shared(config, chunk_layout)))
  }

  fn from_group(group: SharedGroup) -> Self {
    Self {
      group,
      _marker: PhantomData,
    }
  }

  /// Reserves uninitialized room for `count` consecutive values of `T`.
  ///
  /// Returns `None` when `count * size_of::<T>()` exceeds the chunk capacity
  /// or `T` is aligned more strictly than [`CHUNK_ALIGN`](crate::CHUNK_ALIGN).
  /// Zero-byte requests get a dangling, well-aligned pointer.
  pub fn allocate(
    &self,
    count: usize,
  ) -> Option<NonNull<T>> {
    self.try_allocate(count).ok()
  }

  /// Like [`Allocator::allocate`], but says why a request was refused.
  pub fn try_allocate(
    &self,
    count: usize,
  ) -> Result<NonNull<T>, AllocError> {
    let Ok(layout) = Layout::array::<T>(count) else {
      return Err(AllocError::RequestTooLarge {
        requested: count.saturating_mul(mem::size_of::<T>()),
        capacity: self.group.borrow().capacity(),
      });
    };

    if layout.size() == 0 {
      return Ok(NonNull::dangling());
    }

    self.allocate_layout(layout).map(NonNull::cast)
  }

  pub(crate) fn allocate_layout(
    &self,
    layout: Layout,
  ) -> Result<NonNull<u8>, AllocError> {
    self.group.borrow_mut().allocate(layout)
  }

  /// Does nothing.
  ///
  /// Bytes handed out by a group stay reserved until the group is torn down.
  /// Values left at `ptr` are still readable afterwards.
  pub fn deallocate(
    &self,
    ptr: NonNull<T>,
    count: usize,
  ) {
    trace!(?ptr, count, "deallocate ignored");
  }

  /// Moves `value` into the slot at `ptr` without reading the old contents.
  ///
  /// # Safety
  ///
  /// `ptr` must come from this group and point at room for one `T`.
  pub unsafe fn construct(
    &self,
    ptr: NonNull<T>,
    value: T,
  ) {
    unsafe { ptr.write(value) }
  }

  /// Initializes the slot at `ptr` with the result of `init`.
  ///
  /// # Safety
  ///
  /// Same as [`Allocator::construct`].
  pub unsafe fn construct_with<F>(
    &self,
    ptr: NonNull<T>,
    init: F,
  ) where
    F: FnOnce() -> T,
  {
    unsafe { ptr.write(init()) }
  }

  /// Runs the destructor of the value at `ptr`. The bytes stay reserved.
  ///
  /// # Safety
  ///
  /// `ptr` must hold an initialized `T` that is not used again.
  pub unsafe fn destroy(
    &self,
    ptr: NonNull<T>,
  ) {
    unsafe { ptr.drop_in_place() }
  }

  /// A handle for another element type that shares this group.
  pub fn rebind<U>(&self) -> Allocator<U> {
    let rebound = Allocator::from_group(Rc::clone(&self.group));

    debug!(
      members = rebound.member_count(),
      from = std::any::type_name::<T>(),
      to = std::any::type_name::<U>(),
      "allocator rebound"
    );

    rebound
  }

  /// Whether both handles draw from the same chunks.
  pub fn same_group<U>(
    &self,
    other: &Allocator<U>,
  ) -> bool {
    Rc::ptr_eq(&self.group, &other.group)
  }

  pub fn member_count(&self) -> usize {
    Rc::strong_count(&self.group)
  }

  pub fn chunk_count(&self) -> usize {
    self.group.borrow().chunk_count()
  }

  pub fn config(&self) -> Config {
    self.group.borrow().config()
  }

  pub fn stats(&self) -> GroupStats {
    self.group.borrow().stats(self.member_count())
  }

  /// An observer that reports when the group is torn down.
  pub fn downgrade(&self) -> WeakGroup {
    WeakGroup::new(&self.group)
  }
}

impl<T> Default for Allocator<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T> Clone for Allocator<T> {
  fn clone(&self) -> Self {
    Self::from_group(Rc::clone(&self.group))
  }

  /// Leaves the current group, tearing it down if this was its only handle,
  /// and joins the group of `source`.
  fn clone_from(
    &mut self,
    source: &Self,
  ) {
    if self.same_group(source) {
      return;
    }

    let previous = mem::replace(&mut self.group, Rc::clone(&source.group));
    trace!(
      previous_members = Rc::strong_count(&previous) - 1,
      members = self.member_count(),
      "allocator reassigned"
    );
  }
}

impl<T, U> PartialEq<Allocator<U>> for Allocator<T> {
  fn eq(
    &self,
    other: &Allocator<U>,
  ) -> bool {
    self.same_group(other)
  }
}

impl<T> Eq for Allocator<T> {}

impl<T> fmt::Debug for Allocator<T> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    let group = self.group.borrow();

    f.debug_struct("Allocator")
      .field("element", &std::any::type_name::<T>())
      .field("members", &self.member_count())
      .field("chunks", &group.chunk_count())
      .field("chunk_capacity", &group.capacity())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::Cell, rc::Rc};

  use super::*;
  use crate::{CHUNK_ALIGN, SearchMode};

  fn small<T>() -> Allocator<T> {
    Allocator::with_config(Config::new(8)).unwrap()
  }

  #[test]
  fn test_alloc() {
    let allocator = Allocator::<u64>::new();

    unsafe {
      let first_addr = allocator.allocate(1).unwrap();
      allocator.construct(first_addr, 3);
      assert_eq!(first_addr.read(), 3);

      let size: usize = 6;
      let shorts = allocator.rebind::<u16>();
      let second_addr = shorts.allocate(size).unwrap();

      for i in 0..size {
        shorts.construct(second_addr.add(i), (i + 1) as u16);
      }

      assert_eq!(first_addr.read(), 3);

      for i in 0..size {
        assert_eq!((i + 1) as u16, second_addr.add(i).read());
      }

      allocator.deallocate(first_addr, 1);

      let third_addr = allocator.allocate(1).unwrap();
      assert_ne!(first_addr, third_addr);
      assert!(third_addr.as_ptr() as usize > second_addr.as_ptr() as usize);
    }

    assert_eq!(allocator.chunk_count(), 1);
  }

  #[test]
  fn test_with_config_rejects_zero_capacity() {
    assert_eq!(
      Allocator::<u8>::with_config(Config::new(0)).unwrap_err(),
      AllocError::ZeroCapacity
    );
  }

  #[test]
  fn test_try_allocate_reports_reason() {
    let allocator = small::<u32>();

    assert_eq!(
      allocator.try_allocate(3),
      Err(AllocError::RequestTooLarge {
        requested: 12,
        capacity: 8
      })
    );
    assert_eq!(
      allocator.try_allocate(usize::MAX),
      Err(AllocError::RequestTooLarge {
        requested: usize::MAX,
        capacity: 8
      })
    );
    assert_eq!(allocator.chunk_count(), 0);
  }

  #[test]
  fn test_zero_count_needs_no_chunk() {
    let allocator = small::<u32>();

    assert_eq!(allocator.allocate(0), Some(NonNull::dangling()));
    assert_eq!(allocator.chunk_count(), 0);
  }

  #[test]
  fn test_overaligned_type_is_refused() {
    #[repr(align(64))]
    struct Line(#[allow(dead_code)] [u8; 64]);

    let allocator = Allocator::<Line>::new();

    assert_eq!(
      allocator.try_allocate(1).map(|_| ()),
      Err(AllocError::UnsupportedAlignment {
        align: 64,
        max: CHUNK_ALIGN
      })
    );
  }

  #[test]
  fn test_mixed_element_types_stay_aligned() {
    let bytes = Allocator::<u8>::with_config(Config::new(32)).unwrap();
    let words = bytes.rebind::<u64>();

    bytes.allocate(3).unwrap();
    let word = words.allocate(1).unwrap();

    assert_eq!(word.as_ptr() as usize % mem::align_of::<u64>(), 0);
    assert_eq!(bytes.stats().bytes_used, 16);
  }

  #[test]
  fn test_construct_with_and_destroy() {
    struct Tracked(Rc<Cell<usize>>);

    impl Drop for Tracked {
      fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
      }
    }

    let drops = Rc::new(Cell::new(0));
    let allocator = Allocator::<Tracked>::new();
    let slot = allocator.allocate(1).unwrap();

    unsafe {
      allocator.construct_with(slot, || Tracked(Rc::clone(&drops)));
      assert_eq!(drops.get(), 0);

      allocator.destroy(slot);
    }

    assert_eq!(drops.get(), 1);
    assert_eq!(allocator.stats().bytes_used, mem::size_of::<Tracked>());
  }

  #[test]
  fn test_clone_joins_group() {
    let a = small::<u32>();
    let b = a.clone();

    assert_eq!(a, b);
    assert_eq!(a.member_count(), 2);

    drop(b);
    assert_eq!(a.member_count(), 1);
  }

  #[test]
  fn test_clone_from_tears_down_unique_group() {
    let source = small::<u32>();
    let mut target = small::<u32>();
    target.allocate(1).unwrap();

    let old = target.downgrade();
    target.clone_from(&source);

    assert!(old.is_torn_down());
    assert_eq!(target, source);
    assert_eq!(source.member_count(), 2);
  }

  #[test]
  fn test_clone_from_keeps_shared_group() {
    let source = small::<u32>();
    let mut target = small::<u32>();
    let sibling = target.clone();

    target.clone_from(&source);

    assert_eq!(sibling.member_count(), 1);
    assert_eq!(source.member_count(), 2);
    assert_ne!(sibling, target);
  }

  #[test]
  fn test_clone_from_same_group_is_noop() {
    let a = small::<u32>();
    let mut b = a.clone();

    b.clone_from(&a);

    assert_eq!(a.member_count(), 2);
  }

  #[test]
  fn test_rebind_shares_chunks() {
    let ints = small::<u32>();
    let bytes = ints.rebind::<u8>();

    ints.allocate(1).unwrap();
    bytes.allocate(4).unwrap();

    assert_eq!(ints.chunk_count(), 1);
    assert!(ints.same_group(&bytes));
    assert_eq!(ints.member_count(), 2);
  }

  #[test]
  fn test_config_is_kept() {
    let config = Config::new(64).with_search_mode(SearchMode::OldestFirst);
    let allocator = Allocator::<u8>::with_config(config).unwrap();

    assert_eq!(allocator.clone().config(), config);
    assert_eq!(allocator.stats().chunk_capacity, 64);
  }

  #[test]
  fn test_debug_output() {
    let allocator = small::<u32>();
    allocator.allocate(1).unwrap();

    let text = format!("{allocator:?}");
    assert!(text.contains("members: 1"));
    assert!(text.contains("chunks: 1"));
  }
}
