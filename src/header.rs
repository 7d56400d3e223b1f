/// Length and capacity of a growable buffer.
///
/// The header travels beside the payload pointer; it is never stored inside
/// the allocation and never handed out through the payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Header {
  pub len: usize,
  pub cap: usize,
}

impl Header {
  /// Header of a handle that owns no storage.
  pub const EMPTY: Header = Header { len: 0, cap: 0 };

  pub fn new(
    len: usize,
    cap: usize,
  ) -> Self {
    debug_assert!(len <= cap, "header length {len} exceeds capacity {cap}");
    Self { len, cap }
  }

  pub fn is_full(&self) -> bool {
    self.len == self.cap
  }

  /// Slots allocated but not in use.
  pub fn spare(&self) -> usize {
    self.cap - self.len
  }
}
