/// Rounds `value` up to the next multiple of `align`.
///
/// `align` must be a power of two. Chunks use this to place each request at
/// an address suitable for its element type.
///
/// # Examples
///
/// ```rust
/// use chunkalloc::align_up;
///
/// assert_eq!(align_up!(13, 8), 16);
/// assert_eq!(align_up!(16, 8), 16);
/// assert_eq!(align_up!(0, 4), 0);
/// ```
#[macro_export]
macro_rules! align_up {
  ($value:expr, $align:expr) => {
    ($value + $align - 1) & !($align - 1)
  };
}

#[cfg(test)]
mod tests {
  #[test]
  fn test_align_up() {
    for align in [1usize, 2, 4, 8, 16] {
      let mut alignments = Vec::new();

      for i in 0..10 {
        let sizes = (align * i + 1)..=(align * (i + 1));

        let expected_alignment = align * (i + 1);

        alignments.push((sizes, expected_alignment));
      }

      for (sizes, expected) in alignments {
        for size in sizes {
          assert_eq!(expected, align_up!(size, align));
        }
      }
    }
  }

  #[test]
  fn test_align_up_keeps_aligned_values() {
    assert_eq!(align_up!(0usize, 16), 0);
    assert_eq!(align_up!(32usize, 16), 32);
    assert_eq!(align_up!(7usize, 1), 7);
  }
}
