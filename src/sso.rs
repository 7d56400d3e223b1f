//! Byte strings with small-string optimization.
//!
//! An [`SsoString`] keeps short contents inside the handle and moves them to
//! a heap buffer only once they outgrow [`INLINE_CAPACITY`]:
//!
//! ```text
//!        append / copy_from reaching INLINE_CAPACITY
//!   ┌────────┐ ───────────────────────────────────────▶ ┌──────┐
//!   │ Inline │                                          │ Heap │
//!   └────────┘ ◀─────────────────────────────────────── └──────┘
//!              fit() while len < INLINE_CAPACITY
//! ```
//!
//! Either way a zero byte follows the contents, so the bytes can always be
//! handed out as a NUL-terminated sequence.

use std::{cmp::Ordering, fmt, ptr};

use crate::{
  config::{GrowthPolicy, INLINE_CAPACITY},
  error::BufError,
  host::{HostAllocator, Libc},
  raw::RawBuf,
};

enum Repr<A: HostAllocator> {
  Inline {
    bytes: [u8; INLINE_CAPACITY],
    len: u8,
  },
  /// `raw.len()` is the content length; slot `len` holds the terminator and
  /// `len < raw.capacity()` always holds.
  Heap(RawBuf<u8, A>),
}

impl<A: HostAllocator> Repr<A> {
  const EMPTY_INLINE: Self = Repr::Inline {
    bytes: [0; INLINE_CAPACITY],
    len: 0,
  };
}

/// A growable byte string that lives inline until it no longer fits.
///
/// The representation is never observable through comparisons or the byte
/// views; [`SsoString::is_inline`] exposes it for diagnostics only.
///
/// ```
/// use rbuf::SsoString;
///
/// let mut s = SsoString::from_bytes(b"Hello, world!").unwrap();
/// assert!(s.is_inline());
///
/// s.append(b" and more").unwrap();
/// assert!(!s.is_inline());
/// assert_eq!(s.as_bytes(), b"Hello, world! and more");
/// assert_eq!(s.as_bytes_with_nul().last(), Some(&0));
/// ```
pub struct SsoString<A: HostAllocator + Clone = Libc> {
  repr: Repr<A>,
  host: A,
}

impl SsoString<Libc> {
  pub const fn new() -> Self {
    Self::new_in(Libc)
  }

  /// Copies `src` into a new string.
  ///
  /// Contents that fit inline never allocate; longer contents are placed
  /// directly on the heap with room for exactly `src.len()` bytes.
  ///
  /// # Errors
  ///
  /// `AllocationFailure` or `CapacityOverflow` if heap storage cannot be allocated.
  pub fn from_bytes(src: &[u8]) -> Result<Self, BufError> {
    Self::from_bytes_in(src, Libc)
  }
}

impl Default for SsoString<Libc> {
  fn default() -> Self {
    Self::new()
  }
}

impl<A: HostAllocator + Clone> SsoString<A> {
  const GROWTH: GrowthPolicy = GrowthPolicy::DEFAULT;

  pub const fn new_in(host: A) -> Self {
    Self {
      repr: Repr::EMPTY_INLINE,
      host,
    }
  }

  /// # Errors
  ///
  /// `AllocationFailure` or `CapacityOverflow` if heap storage cannot be allocated.
  pub fn from_bytes_in(
    src: &[u8],
    host: A,
  ) -> Result<Self, BufError> {
    let mut s = Self::new_in(host);
    if src.len() >= INLINE_CAPACITY {
      let exact = Self::with_terminator(src.len())?;
      s.make_room(src.len(), exact)?;
    }
    s.splice(0, src)?;
    Ok(s)
  }

  pub fn len(&self) -> usize {
    match &self.repr {
      Repr::Inline { len, .. } => usize::from(*len),
      Repr::Heap(raw) => raw.len(),
    }
  }

  /// Longest content the current storage holds without reallocating.
  pub fn capacity(&self) -> usize {
    match &self.repr {
      Repr::Inline { .. } => INLINE_CAPACITY - 1,
      Repr::Heap(raw) => raw.capacity() - 1,
    }
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn is_inline(&self) -> bool {
    matches!(self.repr, Repr::Inline { .. })
  }

  pub fn as_bytes(&self) -> &[u8] {
    match &self.repr {
      Repr::Inline { bytes, len } => &bytes[..usize::from(*len)],
      Repr::Heap(raw) => raw.as_slice(),
    }
  }

  /// The contents followed by their terminating zero byte.
  pub fn as_bytes_with_nul(&self) -> &[u8] {
    match &self.repr {
      Repr::Inline { bytes, len } => &bytes[..=usize::from(*len)],
      // SAFETY: the terminator at slot len is always written and len < cap.
      Repr::Heap(raw) => unsafe { std::slice::from_raw_parts(raw.as_ptr(), raw.len() + 1) },
    }
  }

  /// Byte-wise three-way comparison.
  pub fn compare(
    &self,
    other: &SsoString<A>,
  ) -> Ordering {
    self.compare_bytes(other.as_bytes())
  }

  pub fn compare_bytes(
    &self,
    bytes: &[u8],
  ) -> Ordering {
    self.as_bytes().cmp(bytes)
  }

  /// Replaces the contents with `src`.
  ///
  /// A heap string stays on the heap even if `src` would fit inline; use
  /// [`SsoString::fit`] to move it back.
  ///
  /// # Errors
  ///
  /// `AllocationFailure` or `CapacityOverflow` if more storage is needed and
  /// cannot be had; the previous contents are kept.
  pub fn copy_from(
    &mut self,
    src: &[u8],
  ) -> Result<(), BufError> {
    self.splice(0, src)
  }

  /// Appends `bytes` to the contents.
  ///
  /// # Errors
  ///
  /// `AllocationFailure` or `CapacityOverflow` if more storage is needed and
  /// cannot be had; the previous contents are kept.
  pub fn append(
    &mut self,
    bytes: &[u8],
  ) -> Result<(), BufError> {
    self.splice(self.len(), bytes)
  }

  /// Appends one byte.
  ///
  /// # Errors
  ///
  /// See [`SsoString::append`].
  pub fn push(
    &mut self,
    byte: u8,
  ) -> Result<(), BufError> {
    self.append(&[byte])
  }

  /// Removes and returns the last byte.
  ///
  /// # Errors
  ///
  /// `LengthUnderflow` if the string is empty.
  pub fn pop(&mut self) -> Result<u8, BufError> {
    let len = self.len();
    let Some(&last) = self.as_bytes().last() else {
      return Err(BufError::LengthUnderflow);
    };
    self.terminate(len - 1);
    Ok(last)
  }

  /// Makes room for at least `capacity` bytes of content.
  ///
  /// Heap storage is sized exactly; an inline string that must hold
  /// [`INLINE_CAPACITY`] bytes or more moves to the heap.
  ///
  /// # Errors
  ///
  /// `AllocationFailure` or `CapacityOverflow` if the storage cannot grow.
  pub fn reserve(
    &mut self,
    capacity: usize,
  ) -> Result<(), BufError> {
    let exact = Self::with_terminator(capacity)?;
    self.make_room(capacity, exact)
  }

  /// Sets the length to `new_len`, padding new bytes with `fill`.
  ///
  /// # Errors
  ///
  /// `AllocationFailure` or `CapacityOverflow` if the storage cannot grow.
  pub fn resize(
    &mut self,
    new_len: usize,
    fill: u8,
  ) -> Result<(), BufError> {
    let len = self.len();
    if new_len <= len {
      self.terminate(new_len);
      return Ok(());
    }

    let exact = Self::with_terminator(new_len)?;
    self.make_room(new_len, exact)?;
    self.storage_mut(len, new_len).fill(fill);
    self.terminate(new_len);
    Ok(())
  }

  /// Empties the string; the representation and any allocation are kept.
  pub fn clear(&mut self) {
    self.terminate(0);
  }

  /// Releases slack storage.
  ///
  /// A heap string shorter than [`INLINE_CAPACITY`] moves back inline and
  /// frees its buffer; a longer one is reallocated to exactly its length plus
  /// the terminator.
  ///
  /// # Errors
  ///
  /// `AllocationFailure` if the host refuses the shrinking reallocation.
  pub fn fit(&mut self) -> Result<(), BufError> {
    let Repr::Heap(raw) = &mut self.repr else {
      return Ok(());
    };

    let len = raw.len();
    if len >= INLINE_CAPACITY {
      return raw.resize_exact(len + 1);
    }

    let mut bytes = [0; INLINE_CAPACITY];
    bytes[..len].copy_from_slice(raw.as_slice());
    // the old heap buffer is released when the variant is replaced
    self.repr = Repr::Inline {
      bytes,
      len: len as u8,
    };
    Ok(())
  }

  /// Frees heap storage, if any, and leaves an empty inline string.
  pub fn destroy(&mut self) {
    self.repr = Repr::EMPTY_INLINE;
  }

  fn with_terminator(len: usize) -> Result<usize, BufError> {
    len.checked_add(1).ok_or(BufError::CapacityOverflow {
      capacity: len,
      elem_size: 1,
    })
  }

  /// Rewrites the contents as `self[..offset] ++ bytes`.
  fn splice(
    &mut self,
    offset: usize,
    bytes: &[u8],
  ) -> Result<(), BufError> {
    debug_assert!(offset <= self.len());
    let new_len = offset.checked_add(bytes.len()).ok_or(BufError::CapacityOverflow {
      capacity: usize::MAX,
      elem_size: 1,
    })?;
    let target = Self::GROWTH.headroom_for(Self::with_terminator(new_len)?);

    self.make_room(new_len, target)?;
    self.storage_mut(offset, new_len).copy_from_slice(bytes);
    self.terminate(new_len);
    Ok(())
  }

  /// Ensures `required` bytes of content plus the terminator fit, moving to
  /// the heap or reallocating it to `target` bytes when they do not.
  ///
  /// The current contents are preserved. On failure nothing changes.
  fn make_room(
    &mut self,
    required: usize,
    target: usize,
  ) -> Result<(), BufError> {
    debug_assert!(target > required);
    match &mut self.repr {
      Repr::Inline { .. } if required < INLINE_CAPACITY => Ok(()),
      Repr::Inline { bytes, len } => {
        let len = usize::from(*len);
        let mut raw = RawBuf::with_capacity_in(target, self.host.clone())?;
        // SAFETY: target > required >= INLINE_CAPACITY > len, so the copied
        // contents and their terminator fit in the fresh buffer.
        unsafe {
          ptr::copy_nonoverlapping(bytes.as_ptr(), raw.as_mut_ptr(), len + 1);
          raw.set_len(len);
        }
        self.repr = Repr::Heap(raw);
        Ok(())
      }
      Repr::Heap(raw) if required < raw.capacity() => Ok(()),
      Repr::Heap(raw) => raw.resize_exact(target),
    }
  }

  /// Writable view of content bytes `start..end`; `end` must be within capacity.
  fn storage_mut(
    &mut self,
    start: usize,
    end: usize,
  ) -> &mut [u8] {
    match &mut self.repr {
      Repr::Inline { bytes, .. } => &mut bytes[start..end],
      Repr::Heap(raw) => {
        debug_assert!(end < raw.capacity());
        // SAFETY: start..end lies inside the allocation and u8 has no invalid
        // bit patterns, so exposing bytes beyond len for writing is sound.
        unsafe { std::slice::from_raw_parts_mut(raw.as_mut_ptr().add(start), end - start) }
      }
    }
  }

  /// Sets the length and writes the terminator behind it.
  fn terminate(
    &mut self,
    new_len: usize,
  ) {
    match &mut self.repr {
      Repr::Inline { bytes, len } => {
        bytes[new_len] = 0;
        *len = new_len as u8;
      }
      // SAFETY: callers keep new_len < capacity and bytes 0..new_len written.
      Repr::Heap(raw) => unsafe {
        raw.as_mut_ptr().add(new_len).write(0);
        raw.set_len(new_len);
      },
    }
  }
}

impl TryFrom<&[u8]> for SsoString<Libc> {
  type Error = BufError;

  fn try_from(src: &[u8]) -> Result<Self, BufError> {
    Self::from_bytes(src)
  }
}

impl TryFrom<&str> for SsoString<Libc> {
  type Error = BufError;

  fn try_from(src: &str) -> Result<Self, BufError> {
    Self::from_bytes(src.as_bytes())
  }
}

impl<A: HostAllocator + Clone> PartialEq for SsoString<A> {
  fn eq(
    &self,
    other: &Self,
  ) -> bool {
    self.as_bytes() == other.as_bytes()
  }
}

impl<A: HostAllocator + Clone> Eq for SsoString<A> {}

impl<A: HostAllocator + Clone> PartialOrd for SsoString<A> {
  fn partial_cmp(
    &self,
    other: &Self,
  ) -> Option<Ordering> {
    Some(self.compare(other))
  }
}

impl<A: HostAllocator + Clone> Ord for SsoString<A> {
  fn cmp(
    &self,
    other: &Self,
  ) -> Ordering {
    self.compare(other)
  }
}

impl<A: HostAllocator + Clone> fmt::Debug for SsoString<A> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_struct("SsoString")
      .field("inline", &self.is_inline())
      .field("bytes", &String::from_utf8_lossy(self.as_bytes()))
      .finish()
  }
}
