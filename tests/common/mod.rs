#![allow(dead_code)]

use std::{alloc::Layout, cell::Cell, ptr::NonNull, rc::Rc};

use rbuf::{HostAllocator, Libc};

#[derive(Default)]
struct Ledger {
  /// Largest single block the host will hand out; `None` means unlimited.
  limit: Cell<Option<usize>>,
  live: Cell<usize>,
  requests: Cell<usize>,
}

/// A libc host that can be told to refuse large requests and that counts
/// live blocks so tests can check nothing leaks.
#[derive(Clone, Default)]
pub struct BudgetHost {
  ledger: Rc<Ledger>,
}

impl BudgetHost {
  pub fn refuse_above(
    &self,
    bytes: usize,
  ) {
    self.ledger.limit.set(Some(bytes));
  }

  pub fn refuse_all(&self) {
    self.refuse_above(0);
  }

  pub fn unlimited(&self) {
    self.ledger.limit.set(None);
  }

  /// Blocks handed out and not yet released.
  pub fn live(&self) -> usize {
    self.ledger.live.get()
  }

  /// Allocate and reallocate calls seen so far, refused ones included.
  pub fn requests(&self) -> usize {
    self.ledger.requests.get()
  }

  fn admits(
    &self,
    layout: Layout,
  ) -> bool {
    self.ledger.requests.set(self.ledger.requests.get() + 1);
    self.ledger.limit.get().is_none_or(|limit| layout.size() <= limit)
  }
}

unsafe impl HostAllocator for BudgetHost {
  fn allocate(
    &self,
    layout: Layout,
  ) -> Option<NonNull<u8>> {
    if !self.admits(layout) {
      return None;
    }
    let block = Libc.allocate(layout)?;
    self.ledger.live.set(self.ledger.live.get() + 1);
    Some(block)
  }

  unsafe fn reallocate(
    &self,
    ptr: NonNull<u8>,
    old: Layout,
    new: Layout,
  ) -> Option<NonNull<u8>> {
    if !self.admits(new) {
      return None;
    }
    unsafe { Libc.reallocate(ptr, old, new) }
  }

  unsafe fn release(
    &self,
    ptr: NonNull<u8>,
    layout: Layout,
  ) {
    self.ledger.live.set(self.ledger.live.get() - 1);
    unsafe { Libc.release(ptr, layout) }
  }
}
