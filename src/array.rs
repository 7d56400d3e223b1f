//! Self-owned, self-growing arrays.

use std::{
  fmt,
  ops::{Index, IndexMut},
  ptr,
};

use crate::{
  config::GrowthPolicy,
  error::BufError,
  host::{HostAllocator, Libc},
  raw::RawBuf,
};

/// An array that owns its storage and grows geometrically on demand.
///
/// A new array owns no storage; the first mutating call allocates it. Every
/// fallible operation leaves the array untouched when it fails.
///
/// ```
/// use rbuf::GrowableArray;
///
/// let mut arr = GrowableArray::new();
/// for value in 1..=5 {
///     arr.push(value).unwrap();
/// }
/// assert_eq!(arr.remove(2), Ok(3));
/// assert_eq!(arr.as_slice(), &[1, 2, 4, 5]);
/// ```
pub struct GrowableArray<T, A: HostAllocator = Libc> {
  raw: RawBuf<T, A>,
  growth: GrowthPolicy,
}

impl<T> GrowableArray<T, Libc> {
  pub const fn new() -> Self {
    Self::new_in(Libc)
  }

  /// # Errors
  ///
  /// `AllocationFailure` or `CapacityOverflow` if the storage cannot be allocated.
  pub fn with_capacity(capacity: usize) -> Result<Self, BufError> {
    Self::with_capacity_in(capacity, Libc)
  }

  /// Copies `items` into a fresh array sized exactly to them.
  ///
  /// # Errors
  ///
  /// `AllocationFailure` or `CapacityOverflow` if the storage cannot be allocated.
  pub fn from_slice(items: &[T]) -> Result<Self, BufError>
  where
    T: Clone,
  {
    let mut arr = Self::with_capacity(items.len())?;
    arr.extend_from_slice(items)?;
    Ok(arr)
  }
}

impl<T> Default for GrowableArray<T, Libc> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T, A: HostAllocator> GrowableArray<T, A> {
  pub const fn new_in(host: A) -> Self {
    Self {
      raw: RawBuf::new_in(host),
      growth: GrowthPolicy::DEFAULT,
    }
  }

  /// # Errors
  ///
  /// `AllocationFailure` or `CapacityOverflow` if the storage cannot be allocated.
  pub fn with_capacity_in(
    capacity: usize,
    host: A,
  ) -> Result<Self, BufError> {
    Ok(Self {
      raw: RawBuf::with_capacity_in(capacity, host)?,
      growth: GrowthPolicy::DEFAULT,
    })
  }

  /// Replaces the growth policy used when the array runs out of room.
  pub fn with_growth(
    mut self,
    growth: GrowthPolicy,
  ) -> Self {
    self.growth = growth;
    self
  }

  pub fn len(&self) -> usize {
    self.raw.len()
  }

  pub fn capacity(&self) -> usize {
    self.raw.capacity()
  }

  pub fn is_empty(&self) -> bool {
    self.raw.len() == 0
  }

  pub fn growth(&self) -> GrowthPolicy {
    self.growth
  }

  pub fn as_slice(&self) -> &[T] {
    self.raw.as_slice()
  }

  pub fn as_mut_slice(&mut self) -> &mut [T] {
    self.raw.as_mut_slice()
  }

  pub fn get(
    &self,
    index: usize,
  ) -> Option<&T> {
    self.as_slice().get(index)
  }

  pub fn get_mut(
    &mut self,
    index: usize,
  ) -> Option<&mut T> {
    self.as_mut_slice().get_mut(index)
  }

  fn make_room(&mut self) -> Result<(), BufError> {
    if self.raw.header().is_full() {
      self.raw.grow(&self.growth)?;
    }
    Ok(())
  }

  /// Appends `elem`, allocating or growing the storage first if needed.
  ///
  /// # Errors
  ///
  /// `AllocationFailure` or `CapacityOverflow` if growth fails; the existing
  /// elements are untouched and `elem` is dropped.
  pub fn push(
    &mut self,
    elem: T,
  ) -> Result<(), BufError> {
    self.make_room()?;
    let len = self.raw.len();
    // SAFETY: make_room guarantees len < cap, so slot `len` is allocated and free.
    unsafe {
      self.raw.as_mut_ptr().add(len).write(elem);
      self.raw.set_len(len + 1);
    }
    Ok(())
  }

  /// Removes and returns the last element.
  ///
  /// # Errors
  ///
  /// `LengthUnderflow` if the array is empty.
  pub fn pop(&mut self) -> Result<T, BufError> {
    let len = self.raw.len();
    if len == 0 {
      return Err(BufError::LengthUnderflow);
    }
    // SAFETY: slot len - 1 is initialized and stops being counted before it is read out.
    unsafe {
      self.raw.set_len(len - 1);
      Ok(self.raw.as_ptr().add(len - 1).read())
    }
  }

  /// Inserts `elem` at `index`, shifting later elements right.
  ///
  /// # Errors
  ///
  /// - `IndexOutOfRange` if `index > len`, checked before any allocation
  /// - `AllocationFailure` or `CapacityOverflow` if growth fails
  pub fn insert(
    &mut self,
    index: usize,
    elem: T,
  ) -> Result<(), BufError> {
    let len = self.raw.len();
    if index > len {
      return Err(BufError::IndexOutOfRange { index, length: len });
    }
    self.make_room()?;
    // SAFETY: len < cap after make_room; ptr::copy handles the overlapping shift.
    unsafe {
      let slot = self.raw.as_mut_ptr().add(index);
      ptr::copy(slot, slot.add(1), len - index);
      slot.write(elem);
      self.raw.set_len(len + 1);
    }
    Ok(())
  }

  /// Removes and returns the element at `index`, shifting later elements left.
  ///
  /// Capacity is never reduced.
  ///
  /// # Errors
  ///
  /// - `LengthUnderflow` if the array is empty
  /// - `IndexOutOfRange` if `index >= len`
  pub fn remove(
    &mut self,
    index: usize,
  ) -> Result<T, BufError> {
    let len = self.raw.len();
    if len == 0 {
      return Err(BufError::LengthUnderflow);
    }
    if index >= len {
      return Err(BufError::IndexOutOfRange { index, length: len });
    }
    // SAFETY: index < len; the value is moved out before its slot is overwritten.
    unsafe {
      let slot = self.raw.as_mut_ptr().add(index);
      let removed = slot.read();
      ptr::copy(slot.add(1), slot, len - index - 1);
      self.raw.set_len(len - 1);
      Ok(removed)
    }
  }

  /// Grows the storage to exactly `capacity` if it is currently smaller.
  ///
  /// # Errors
  ///
  /// `AllocationFailure` or `CapacityOverflow` if the storage cannot grow.
  pub fn reserve(
    &mut self,
    capacity: usize,
  ) -> Result<(), BufError> {
    self.raw.reserve_exact(capacity)
  }

  /// Shrinks the storage to exactly the current length.
  ///
  /// An empty array gives its storage back entirely.
  ///
  /// # Errors
  ///
  /// `AllocationFailure` if the host refuses the reallocation.
  pub fn fit(&mut self) -> Result<(), BufError> {
    self.raw.resize_exact(self.raw.len())
  }

  /// Sets the length to `new_len`.
  ///
  /// Shrinking drops the trailing elements and keeps the capacity. Growing
  /// reserves exactly `new_len` slots if needed and fills the new ones with
  /// clones of `fill`, or with `T::default()` when no fill is given.
  ///
  /// # Errors
  ///
  /// `AllocationFailure` or `CapacityOverflow` if the storage cannot grow.
  pub fn resize(
    &mut self,
    new_len: usize,
    fill: Option<T>,
  ) -> Result<(), BufError>
  where
    T: Clone + Default,
  {
    let len = self.raw.len();
    if new_len <= len {
      self.raw.truncate(new_len);
      return Ok(());
    }

    self.raw.reserve_exact(new_len)?;
    let fill = fill.unwrap_or_default();
    for i in len..new_len {
      // SAFETY: i < new_len <= cap; the length follows each write.
      unsafe {
        self.raw.as_mut_ptr().add(i).write(fill.clone());
        self.raw.set_len(i + 1);
      }
    }
    Ok(())
  }

  /// Appends clones of `items`, reserving room for all of them up front.
  ///
  /// # Errors
  ///
  /// `AllocationFailure` or `CapacityOverflow` if the storage cannot grow;
  /// nothing is appended.
  pub fn extend_from_slice(
    &mut self,
    items: &[T],
  ) -> Result<(), BufError>
  where
    T: Clone,
  {
    let len = self.raw.len();
    if items.len() > self.raw.header().spare() {
      let required = len.checked_add(items.len()).ok_or(BufError::CapacityOverflow {
        capacity: usize::MAX,
        elem_size: std::mem::size_of::<T>(),
      })?;
      self.raw.reserve_exact(self.growth.headroom_for(required))?;
    }
    for (i, item) in items.iter().enumerate() {
      // SAFETY: len + i < len + items.len() <= cap.
      unsafe {
        self.raw.as_mut_ptr().add(len + i).write(item.clone());
        self.raw.set_len(len + i + 1);
      }
    }
    Ok(())
  }

  /// Drops every element; the storage is kept.
  pub fn clear(&mut self) {
    self.raw.truncate(0);
  }

  /// Drops every element and gives the storage back to the host.
  ///
  /// The array is empty and reusable afterwards.
  ///
  /// # Errors
  ///
  /// `NullHandle` if the array owned no storage; nothing happens.
  pub fn free(&mut self) -> Result<(), BufError> {
    if self.raw.release() {
      Ok(())
    } else {
      Err(BufError::NullHandle)
    }
  }
}

impl<T, A: HostAllocator> Index<usize> for GrowableArray<T, A> {
  type Output = T;

  fn index(
    &self,
    index: usize,
  ) -> &T {
    &self.as_slice()[index]
  }
}

impl<T, A: HostAllocator> IndexMut<usize> for GrowableArray<T, A> {
  fn index_mut(
    &mut self,
    index: usize,
  ) -> &mut T {
    &mut self.as_mut_slice()[index]
  }
}

impl<T: fmt::Debug, A: HostAllocator> fmt::Debug for GrowableArray<T, A> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_list().entries(self.as_slice()).finish()
  }
}
