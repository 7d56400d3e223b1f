//! Header-tracked heap buffers.
//!
//! [`RawBuf`] is the allocation engine behind [`GrowableArray`](crate::GrowableArray)
//! and the heap side of [`SsoString`](crate::SsoString). It owns a payload
//! pointer and a [`Header`] recording how many slots are initialized and how
//! many are allocated:
//!
//! ```text
//!   RawBuf
//!   ┌──────────────────────┐       ┌───┬───┬───┬───┬───────────────┐
//!   │ ptr ─────────────────┼──────▶│ 0 │ 1 │ 2 │ 3 │    spare      │
//!   │ header { len: 4,     │       └───┴───┴───┴───┴───────────────┘
//!   │          cap: 8 }    │       ◀──── len ─────▶
//!   │ host                 │       ◀──────────── cap ──────────────▶
//!   └──────────────────────┘
//! ```
//!
//! Every reallocation goes through the host first and only updates the handle
//! once the host has succeeded, so a refused request leaves the buffer as it was.

use std::{alloc::Layout, fmt, marker::PhantomData, mem, ptr, ptr::NonNull, slice};

use log::{debug, trace};

use crate::{
  config::GrowthPolicy,
  error::BufError,
  header::Header,
  host::{HostAllocator, Libc},
};

/// An owned, growable run of `T` slots.
///
/// Slots `0..len` hold initialized values; `len..cap` are uninitialized. A
/// buffer that owns no storage is the null sentinel: no pointer, header
/// [`Header::EMPTY`].
pub struct RawBuf<T, A: HostAllocator = Libc> {
  ptr: Option<NonNull<T>>,
  header: Header,
  host: A,
  _owns: PhantomData<T>,
}

impl<T> RawBuf<T, Libc> {
  pub const fn new() -> Self {
    Self::new_in(Libc)
  }
}

impl<T> Default for RawBuf<T, Libc> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T, A: HostAllocator> RawBuf<T, A> {
  pub const fn new_in(host: A) -> Self {
    Self {
      ptr: None,
      header: Header::EMPTY,
      host,
      _owns: PhantomData,
    }
  }

  /// Allocates room for exactly `capacity` slots.
  ///
  /// A zero capacity yields the null sentinel.
  ///
  /// # Errors
  ///
  /// `AllocationFailure` if the host refuses, `CapacityOverflow` if the byte
  /// size is not representable.
  pub fn with_capacity_in(
    capacity: usize,
    host: A,
  ) -> Result<Self, BufError> {
    let mut raw = Self::new_in(host);
    raw.resize_exact(capacity)?;
    Ok(raw)
  }

  pub fn len(&self) -> usize {
    self.header.len
  }

  pub fn capacity(&self) -> usize {
    self.header.cap
  }

  pub fn header(&self) -> Header {
    self.header
  }

  pub fn host(&self) -> &A {
    &self.host
  }

  /// True when the buffer owns no storage.
  pub fn is_null(&self) -> bool {
    self.ptr.is_none()
  }

  pub fn as_ptr(&self) -> *const T {
    self.ptr.unwrap_or(NonNull::dangling()).as_ptr()
  }

  pub fn as_mut_ptr(&mut self) -> *mut T {
    self.ptr.unwrap_or(NonNull::dangling()).as_ptr()
  }

  pub fn as_slice(&self) -> &[T] {
    // SAFETY: slots 0..len are initialized; a null buffer has len 0 and the
    // dangling pointer is valid for empty slices.
    unsafe { slice::from_raw_parts(self.as_ptr(), self.header.len) }
  }

  pub fn as_mut_slice(&mut self) -> &mut [T] {
    let len = self.header.len;
    // SAFETY: as in `as_slice`, and `&mut self` makes the view exclusive.
    unsafe { slice::from_raw_parts_mut(self.as_mut_ptr(), len) }
  }

  /// Sets the number of initialized slots.
  ///
  /// # Safety
  ///
  /// `len` must not exceed the capacity and slots `0..len` must be initialized.
  pub unsafe fn set_len(
    &mut self,
    len: usize,
  ) {
    self.header = Header::new(len, self.header.cap);
  }

  /// Grows by one step of `policy`, allocating a single slot when null.
  ///
  /// # Errors
  ///
  /// See [`RawBuf::resize_exact`].
  pub fn grow(
    &mut self,
    policy: &GrowthPolicy,
  ) -> Result<(), BufError> {
    let target = policy.next_capacity(self.header.cap);
    self.resize_exact(target)
  }

  /// Grows to exactly `capacity` if currently smaller; never shrinks.
  ///
  /// # Errors
  ///
  /// See [`RawBuf::resize_exact`].
  pub fn reserve_exact(
    &mut self,
    capacity: usize,
  ) -> Result<(), BufError> {
    if capacity <= self.header.cap {
      return Ok(());
    }
    self.resize_exact(capacity)
  }

  /// Reallocates to exactly `capacity` slots, preserving slots `0..len`.
  ///
  /// Equal capacity is a no-op; zero capacity on an empty buffer releases the
  /// storage and returns the handle to the null sentinel.
  ///
  /// # Errors
  ///
  /// - `CapacityExceeded` if `capacity` is below the current length
  /// - `CapacityOverflow` if the byte size is not representable
  /// - `AllocationFailure` if the host refuses; the buffer is unchanged
  pub fn resize_exact(
    &mut self,
    capacity: usize,
  ) -> Result<(), BufError> {
    if capacity == self.header.cap {
      return Ok(());
    }
    if capacity < self.header.len {
      return Err(BufError::CapacityExceeded {
        required: self.header.len,
        capacity,
      });
    }
    if capacity == 0 {
      self.release();
      return Ok(());
    }

    let new_layout = Self::layout(capacity)?;
    let ptr = if new_layout.size() == 0 {
      NonNull::dangling()
    } else {
      self.reallocate_block(new_layout)?.cast::<T>()
    };

    trace!(
      "resized {}-byte buffer to {} slots ({} bytes), address = {:?}",
      mem::size_of::<T>() * self.header.cap,
      capacity,
      new_layout.size(),
      ptr,
    );

    self.ptr = Some(ptr);
    self.header = Header::new(self.header.len, capacity);
    Ok(())
  }

  /// Drops slots `len..` and shortens the buffer; capacity is kept.
  pub fn truncate(
    &mut self,
    len: usize,
  ) {
    if len >= self.header.len {
      return;
    }
    let tail = self.header.len - len;
    // shorten first so a panicking destructor cannot cause a double drop
    self.header.len = len;
    // SAFETY: slots len..len + tail were initialized and are no longer counted.
    unsafe {
      ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.as_mut_ptr().add(len), tail));
    }
  }

  /// Drops every element, frees the storage and resets to the null sentinel.
  ///
  /// Returns `false` if the buffer was already null.
  pub fn release(&mut self) -> bool {
    if self.ptr.is_none() {
      return false;
    }
    self.truncate(0);

    let cap = mem::replace(&mut self.header, Header::EMPTY).cap;
    let Some(ptr) = self.ptr.take() else {
      return false;
    };

    if let Ok(layout) = Self::layout(cap) {
      if layout.size() != 0 {
        trace!("released {} bytes, address = {:?}", layout.size(), ptr);
        // SAFETY: `ptr` was produced by this host for exactly this layout.
        unsafe { self.host.release(ptr.cast::<u8>(), layout) };
      }
    }
    true
  }

  fn layout(capacity: usize) -> Result<Layout, BufError> {
    Layout::array::<T>(capacity).map_err(|_| BufError::CapacityOverflow {
      capacity,
      elem_size: mem::size_of::<T>(),
    })
  }

  fn reallocate_block(
    &mut self,
    new_layout: Layout,
  ) -> Result<NonNull<u8>, BufError> {
    let old_layout = Self::layout(self.header.cap)?;

    let block = match self.ptr {
      Some(old) if old_layout.size() != 0 => {
        // SAFETY: `old` is live and was allocated by this host for `old_layout`;
        // both layouts share the alignment of `T`.
        unsafe { self.host.reallocate(old.cast::<u8>(), old_layout, new_layout) }
      }
      _ => self.host.allocate(new_layout),
    };

    block.ok_or_else(|| {
      debug!(
        "host refused {} bytes (current capacity {} slots)",
        new_layout.size(),
        self.header.cap,
      );
      BufError::AllocationFailure {
        requested: new_layout.size(),
      }
    })
  }
}

impl<T, A: HostAllocator> Drop for RawBuf<T, A> {
  fn drop(&mut self) {
    self.release();
  }
}

impl<T: fmt::Debug, A: HostAllocator> fmt::Debug for RawBuf<T, A> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_struct("RawBuf")
      .field("header", &self.header)
      .field("items", &self.as_slice())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::Cell, rc::Rc};

  use super::*;

  /// Refuses every request once `refuse` is set.
  #[derive(Clone, Default)]
  struct Flaky {
    refuse: Rc<Cell<bool>>,
  }

  unsafe impl HostAllocator for Flaky {
    fn allocate(
      &self,
      layout: Layout,
    ) -> Option<NonNull<u8>> {
      if self.refuse.get() {
        return None;
      }
      Libc.allocate(layout)
    }

    unsafe fn reallocate(
      &self,
      ptr: NonNull<u8>,
      old: Layout,
      new: Layout,
    ) -> Option<NonNull<u8>> {
      if self.refuse.get() {
        return None;
      }
      unsafe { Libc.reallocate(ptr, old, new) }
    }

    unsafe fn release(
      &self,
      ptr: NonNull<u8>,
      layout: Layout,
    ) {
      unsafe { Libc.release(ptr, layout) }
    }
  }

  fn filled(n: u32) -> RawBuf<u32> {
    let mut raw: RawBuf<u32> = RawBuf::with_capacity_in(n as usize, Libc).unwrap();
    for i in 0..n {
      unsafe {
        raw.as_mut_ptr().add(i as usize).write(i * 10);
        raw.set_len(i as usize + 1);
      }
    }
    raw
  }

  #[test]
  fn starts_null() {
    let raw: RawBuf<u64> = RawBuf::new();
    assert!(raw.is_null());
    assert_eq!(raw.header(), Header::EMPTY);
    assert!(raw.as_slice().is_empty());
  }

  #[test]
  fn grow_from_null_allocates_one_slot() {
    let mut raw: RawBuf<u64> = RawBuf::new();
    raw.grow(&GrowthPolicy::DEFAULT).unwrap();
    assert!(!raw.is_null());
    assert_eq!(raw.capacity(), 1);
    assert_eq!(raw.len(), 0);
  }

  #[test]
  fn grow_preserves_contents() {
    let mut raw = filled(4);
    raw.grow(&GrowthPolicy::DEFAULT).unwrap();
    assert_eq!(raw.header(), Header::new(4, 8));
    assert_eq!(raw.header().spare(), 4);
    assert_eq!(raw.as_slice(), &[0, 10, 20, 30]);
  }

  #[test]
  fn resize_exact_rejects_cutting_into_length() {
    let mut raw = filled(4);
    assert_eq!(
      raw.resize_exact(2),
      Err(BufError::CapacityExceeded {
        required: 4,
        capacity: 2
      })
    );
    assert_eq!(raw.capacity(), 4);
  }

  #[test]
  fn resize_to_zero_releases() {
    let mut raw: RawBuf<u8> = RawBuf::with_capacity_in(16, Libc).unwrap();
    raw.resize_exact(0).unwrap();
    assert!(raw.is_null());
    assert!(!raw.release());
  }

  #[test]
  fn refused_growth_leaves_buffer_intact() {
    let host = Flaky::default();
    let mut raw: RawBuf<u16, Flaky> = RawBuf::with_capacity_in(2, host.clone()).unwrap();
    unsafe {
      raw.as_mut_ptr().write(7);
      raw.as_mut_ptr().add(1).write(9);
      raw.set_len(2);
    }

    host.refuse.set(true);
    assert_eq!(
      raw.grow(&GrowthPolicy::DEFAULT),
      Err(BufError::AllocationFailure { requested: 8 })
    );
    assert_eq!(raw.capacity(), 2);
    assert_eq!(raw.as_slice(), &[7, 9]);

    host.refuse.set(false);
    raw.grow(&GrowthPolicy::DEFAULT).unwrap();
    assert_eq!(raw.as_slice(), &[7, 9]);
  }

  #[test]
  fn oversized_request_overflows() {
    let mut raw: RawBuf<u64> = RawBuf::new();
    assert_eq!(
      raw.resize_exact(usize::MAX / 2),
      Err(BufError::CapacityOverflow {
        capacity: usize::MAX / 2,
        elem_size: 8
      })
    );
    assert!(raw.is_null());
  }

  #[test]
  fn zero_sized_elements_never_touch_the_host() {
    let host = Flaky::default();
    host.refuse.set(true);
    let mut raw: RawBuf<(), Flaky> = RawBuf::new_in(host);
    raw.resize_exact(1000).unwrap();
    assert_eq!(raw.capacity(), 1000);
    assert!(raw.release());
  }

  #[test]
  fn truncate_and_release_drop_elements() {
    let drops = Rc::new(Cell::new(0));

    struct Counted(Rc<Cell<usize>>);
    impl Drop for Counted {
      fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
      }
    }

    let mut raw: RawBuf<Counted> = RawBuf::with_capacity_in(3, Libc).unwrap();
    for i in 0..3 {
      unsafe {
        raw.as_mut_ptr().add(i).write(Counted(drops.clone()));
        raw.set_len(i + 1);
      }
    }

    raw.truncate(1);
    assert_eq!(drops.get(), 2);
    assert_eq!(raw.capacity(), 3);

    drop(raw);
    assert_eq!(drops.get(), 3);
  }
}
