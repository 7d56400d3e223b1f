//! Build-time sizing constants and the growth policy.

use std::mem;

/// Multiplier applied to a buffer's capacity each time it runs out of room.
pub const GROWTH_FACTOR: f64 = 2.0;

/// Size of the inline buffer of an [`SsoString`](crate::SsoString), terminator
/// included: two machine words.
///
/// A string stays inline while `len < INLINE_CAPACITY` and moves to the heap
/// once its length reaches it.
pub const INLINE_CAPACITY: usize = 2 * mem::size_of::<usize>();

const _: () = assert!(INLINE_CAPACITY <= u8::MAX as usize);

/// How a buffer computes its next capacity.
///
/// Factors below 1.0 and non-finite factors are treated as 1.0; every growth
/// step still adds at least one slot, so such a policy degrades to linear
/// growth instead of stalling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GrowthPolicy {
  factor: f64,
}

impl GrowthPolicy {
  pub const DEFAULT: GrowthPolicy = GrowthPolicy { factor: GROWTH_FACTOR };

  pub fn new(factor: f64) -> Self {
    if factor.is_finite() && factor >= 1.0 {
      Self { factor }
    } else {
      Self { factor: 1.0 }
    }
  }

  pub fn factor(&self) -> f64 {
    self.factor
  }

  /// Capacity after one growth step from `current`.
  ///
  /// Always strictly greater than `current` (saturating at `usize::MAX`).
  pub fn next_capacity(
    &self,
    current: usize,
  ) -> usize {
    self.scale(current).max(current.saturating_add(1))
  }

  /// Capacity that holds `required` slots plus geometric headroom.
  ///
  /// The factor is applied to the requirement itself, so one large append
  /// does not multiply an already large capacity.
  pub fn headroom_for(
    &self,
    required: usize,
  ) -> usize {
    self.scale(required).max(required)
  }

  fn scale(
    &self,
    n: usize,
  ) -> usize {
    // float-to-int `as` floors and saturates
    (n as f64 * self.factor) as usize
  }
}

impl Default for GrowthPolicy {
  fn default() -> Self {
    Self::DEFAULT
  }
}
