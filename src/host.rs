//! The host allocator seam.
//!
//! Buffers never talk to the system allocator directly; they go through a
//! [`HostAllocator`]. The default host, [`Libc`], forwards to `malloc`,
//! `realloc` and `free`.

use std::{alloc::Layout, mem, ptr, ptr::NonNull};

use libc::c_void;

use crate::align;

/// Alignment every `malloc` result satisfies.
const MALLOC_ALIGN: usize = 2 * mem::size_of::<usize>();

/// Source of raw memory for buffers.
///
/// Callers only pass layouts with a non-zero size, and `reallocate` receives
/// old and new layouts with the same alignment.
///
/// # Safety
///
/// Implementations must return blocks that are valid for reads and writes of
/// `layout.size()` bytes and aligned to `layout.align()`. A failed
/// `reallocate` must leave the original block untouched and still owned by
/// the caller.
pub unsafe trait HostAllocator {
  /// Returns a fresh block, or `None` if the host cannot provide one.
  fn allocate(
    &self,
    layout: Layout,
  ) -> Option<NonNull<u8>>;

  /// Moves or resizes a block, preserving `min(old, new)` leading bytes.
  ///
  /// # Safety
  ///
  /// `ptr` must have been returned by this host for `old` and not released since.
  unsafe fn reallocate(
    &self,
    ptr: NonNull<u8>,
    old: Layout,
    new: Layout,
  ) -> Option<NonNull<u8>>;

  /// Returns a block to the host.
  ///
  /// # Safety
  ///
  /// `ptr` must have been returned by this host for `layout` and not released since.
  unsafe fn release(
    &self,
    ptr: NonNull<u8>,
    layout: Layout,
  );
}

/// Host allocator backed by the C library heap.
#[derive(Clone, Copy, Debug, Default)]
pub struct Libc;

unsafe impl HostAllocator for Libc {
  fn allocate(
    &self,
    layout: Layout,
  ) -> Option<NonNull<u8>> {
    let size = align!(layout.size());

    let address = if layout.align() <= MALLOC_ALIGN {
      // SAFETY: malloc accepts any size and signals failure with null.
      unsafe { libc::malloc(size) }
    } else {
      let mut out: *mut c_void = ptr::null_mut();
      // SAFETY: the alignment is a power of two above MALLOC_ALIGN, hence a
      // multiple of the pointer size as posix_memalign requires.
      match unsafe { libc::posix_memalign(&mut out, layout.align(), size) } {
        0 => out,
        _ => ptr::null_mut(),
      }
    };

    NonNull::new(address.cast::<u8>())
  }

  unsafe fn reallocate(
    &self,
    ptr: NonNull<u8>,
    old: Layout,
    new: Layout,
  ) -> Option<NonNull<u8>> {
    if new.align() <= MALLOC_ALIGN {
      // SAFETY: the caller guarantees `ptr` came from malloc/realloc; on
      // failure realloc returns null and leaves the block alone.
      let address = unsafe { libc::realloc(ptr.as_ptr().cast::<c_void>(), align!(new.size())) };
      return NonNull::new(address.cast::<u8>());
    }

    // realloc does not keep over-aligned blocks aligned; move by hand.
    let fresh = self.allocate(new)?;
    unsafe {
      // SAFETY: both blocks are live, distinct and at least this long.
      ptr::copy_nonoverlapping(ptr.as_ptr(), fresh.as_ptr(), old.size().min(new.size()));
      self.release(ptr, old);
    }
    Some(fresh)
  }

  unsafe fn release(
    &self,
    ptr: NonNull<u8>,
    _layout: Layout,
  ) {
    // SAFETY: the caller guarantees `ptr` is a live block from this host.
    unsafe { libc::free(ptr.as_ptr().cast::<c_void>()) }
  }
}
