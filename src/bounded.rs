//! Fixed-capacity array operations over caller-owned storage.
//!
//! The storage is any initialized slice; its length is the capacity. The
//! number of elements in use is an ordinary `usize` owned by the caller and
//! passed to every call. Operations check it against the capacity first and
//! update it only when they succeed. Nothing here allocates.
//!
//! ```
//! use rbuf::{bounded, BufError};
//!
//! let mut slots = [0i32; 3];
//! let mut len = 0;
//!
//! bounded::push(&mut slots, &mut len, 1).unwrap();
//! bounded::push(&mut slots, &mut len, 3).unwrap();
//! bounded::insert(&mut slots, &mut len, 1, 2).unwrap();
//! assert_eq!(bounded::as_slice(&slots, len), &[1, 2, 3]);
//!
//! assert!(matches!(
//!     bounded::push(&mut slots, &mut len, 4),
//!     Err(BufError::CapacityExceeded { .. })
//! ));
//! assert_eq!(len, 3);
//! ```

use crate::error::BufError;

fn check_len<T>(
  slots: &[T],
  len: usize,
) -> Result<(), BufError> {
  if len > slots.len() {
    return Err(BufError::CapacityExceeded {
      required: len,
      capacity: slots.len(),
    });
  }
  Ok(())
}

fn check_room<T>(
  slots: &[T],
  len: usize,
) -> Result<(), BufError> {
  check_len(slots, len)?;
  if len == slots.len() {
    return Err(BufError::CapacityExceeded {
      required: len + 1,
      capacity: slots.len(),
    });
  }
  Ok(())
}

/// Writes `elem` at `*len` and bumps the length.
///
/// # Errors
///
/// `CapacityExceeded` if the storage is full.
pub fn push<T>(
  slots: &mut [T],
  len: &mut usize,
  elem: T,
) -> Result<(), BufError> {
  check_room(slots, *len)?;
  slots[*len] = elem;
  *len += 1;
  Ok(())
}

/// Drops the last element from the count and returns a reference to it.
///
/// The slot keeps its value until it is overwritten.
///
/// # Errors
///
/// `LengthUnderflow` if `*len` is zero.
pub fn pop<'a, T>(
  slots: &'a [T],
  len: &mut usize,
) -> Result<&'a T, BufError> {
  check_len(slots, *len)?;
  if *len == 0 {
    return Err(BufError::LengthUnderflow);
  }
  *len -= 1;
  Ok(&slots[*len])
}

/// Shifts `[index, len)` one slot right and writes `elem` at `index`.
///
/// # Errors
///
/// - `CapacityExceeded` if the storage is full
/// - `IndexOutOfRange` if `index > *len`
pub fn insert<T>(
  slots: &mut [T],
  len: &mut usize,
  index: usize,
  elem: T,
) -> Result<(), BufError> {
  check_room(slots, *len)?;
  if index > *len {
    return Err(BufError::IndexOutOfRange {
      index,
      length: *len,
    });
  }
  // the free slot at `len` wraps around to `index`
  slots[index..=*len].rotate_right(1);
  slots[index] = elem;
  *len += 1;
  Ok(())
}

/// Shifts `[index + 1, len)` one slot left, closing the gap at `index`.
///
/// The removed value ends up in the slot just past the new length.
///
/// # Errors
///
/// - `LengthUnderflow` if `*len` is zero
/// - `IndexOutOfRange` if `index >= *len`
pub fn remove<T>(
  slots: &mut [T],
  len: &mut usize,
  index: usize,
) -> Result<(), BufError> {
  check_len(slots, *len)?;
  if *len == 0 {
    return Err(BufError::LengthUnderflow);
  }
  if index >= *len {
    return Err(BufError::IndexOutOfRange {
      index,
      length: *len,
    });
  }
  slots[index..*len].rotate_left(1);
  *len -= 1;
  Ok(())
}

/// Replaces the contents with a copy of `src`.
///
/// # Errors
///
/// `CapacityExceeded` if `src` is longer than the storage; nothing is copied.
pub fn copy_from<T: Clone>(
  slots: &mut [T],
  len: &mut usize,
  src: &[T],
) -> Result<(), BufError> {
  if src.len() > slots.len() {
    return Err(BufError::CapacityExceeded {
      required: src.len(),
      capacity: slots.len(),
    });
  }
  slots[..src.len()].clone_from_slice(src);
  *len = src.len();
  Ok(())
}

pub fn clear(len: &mut usize) {
  *len = 0;
}

/// The elements in use. A length beyond the storage is clamped to it.
pub fn as_slice<T>(
  slots: &[T],
  len: usize,
) -> &[T] {
  &slots[..len.min(slots.len())]
}
