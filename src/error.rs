use thiserror::Error;

/// Errors reported by buffer operations.
///
/// A failed operation leaves its container exactly as it was before the call.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum BufError {
  /// The host allocator could not satisfy a request
  #[error("Allocation failure: host allocator refused {requested} bytes")]
  AllocationFailure {
    /// Number of bytes requested from the host
    requested: usize,
  },
  /// The requested capacity does not fit in the address space
  #[error("Capacity overflow: {capacity} elements of {elem_size} bytes")]
  CapacityOverflow {
    /// Capacity that was requested
    capacity: usize,
    /// Size of one element in bytes
    elem_size: usize,
  },
  /// Index is beyond the valid range for the operation
  #[error("Index out of range: index {index} for length {length}")]
  IndexOutOfRange {
    /// Index that was accessed
    index: usize,
    /// Current length of the container
    length: usize,
  },
  /// A fixed capacity cannot hold the requested length
  #[error("Capacity exceeded: {required} elements required, capacity is {capacity}")]
  CapacityExceeded {
    /// Length the operation needed
    required: usize,
    /// Capacity available
    capacity: usize,
  },
  /// Removal from an empty container
  #[error("Length underflow: container is empty")]
  LengthUnderflow,
  /// The handle owns no storage
  #[error("Null handle: buffer is not allocated")]
  NullHandle,
}
