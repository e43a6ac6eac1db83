use thiserror::Error;

/// Reasons an allocation request or a group configuration is refused.
///
/// Running out of memory while creating a chunk is not represented here: it
/// aborts through [`std::alloc::handle_alloc_error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AllocError {
  /// A single request needs more bytes than one chunk holds.
  #[error("request of {requested} bytes exceeds the chunk capacity of {capacity} bytes")]
  RequestTooLarge { requested: usize, capacity: usize },

  /// The element type needs a stricter alignment than chunk buffers provide.
  #[error("alignment of {align} bytes exceeds the chunk alignment of {max} bytes")]
  UnsupportedAlignment { align: usize, max: usize },

  #[error("chunk capacity must be greater than zero")]
  ZeroCapacity,

  #[error("chunk capacity of {capacity} bytes does not fit in a valid layout")]
  CapacityOverflow { capacity: usize },
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_messages_carry_sizes() {
    let err = AllocError::RequestTooLarge {
      requested: 12,
      capacity: 8,
    };
    assert_eq!(
      err.to_string(),
      "request of 12 bytes exceeds the chunk capacity of 8 bytes"
    );

    let err = AllocError::UnsupportedAlignment { align: 64, max: 16 };
    assert!(err.to_string().contains("64"));
  }
}
