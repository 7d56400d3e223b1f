//! # rbuf - Growable Buffers With Hidden Bookkeeping
//!
//! This crate provides the buffer-management core shared by two container
//! families: a resizable array and a resizable byte string. Both manage their
//! own storage; callers only ever see their elements.
//!
//! ## Overview
//!
//! Every heap buffer is a payload pointer plus a small header that records how
//! much of the allocation is in use:
//!
//! ```text
//!   Growable buffer:
//!
//!   ┌──────────────────┐      ┌─────┬─────┬─────┬─────┬──────────────────┐
//!   │ Header           │      │ e0  │ e1  │ e2  │ e3  │   spare slots    │
//!   │  len: 4          │      └─────┴─────┴─────┴─────┴──────────────────┘
//!   │  cap: 8          │      ▲
//!   │ ptr ─────────────┼──────┘
//!   └──────────────────┘
//!
//!   When len reaches cap the buffer grows to cap * GROWTH_FACTOR.
//!   Total copying across N appends stays O(N).
//! ```
//!
//! Short strings skip the heap entirely and live inside the handle:
//!
//! ```text
//!   SsoString, inline:                     SsoString, heap:
//!   ┌──────────────────────────────┐       ┌──────────────────────────────┐
//!   │ H e l l o \0 . . . . . . . . │       │ RawBuf ──▶ [ H e l l o ... \0 ]
//!   │ len: 5                       │       │                              │
//!   └──────────────────────────────┘       └──────────────────────────────┘
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   rbuf
//!   ├── align      - Word rounding macro (align!)
//!   ├── array      - GrowableArray
//!   ├── bounded    - Fixed-capacity operations over caller storage
//!   ├── config     - Growth factor, inline capacity, GrowthPolicy
//!   ├── error      - BufError
//!   ├── header     - Length/capacity bookkeeping
//!   ├── host       - HostAllocator trait and the libc host
//!   ├── raw        - RawBuf, the allocation engine
//!   └── sso        - SsoString
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use rbuf::{GrowableArray, SsoString};
//!
//! let mut arr = GrowableArray::new();
//! arr.push(1).unwrap();
//! arr.push(2).unwrap();
//! arr.insert(1, 5).unwrap();
//! assert_eq!(arr.as_slice(), &[1, 5, 2]);
//!
//! let mut s = SsoString::from_bytes(b"short").unwrap();
//! s.append(b" and then considerably longer").unwrap();
//! assert_eq!(s.len(), 34);
//! ```
//!
//! ## Failure Model
//!
//! Every mutating operation returns `Result<_, BufError>`. When an operation
//! fails, the container is exactly as it was before the call: reallocation
//! happens first and the handle is only updated once the host allocator has
//! succeeded.
//!
//! ## Limitations
//!
//! - **Single-threaded only**: handles are neither `Send` nor `Sync`
//! - **Byte strings**: `SsoString` does not interpret encodings
//! - **Unix hosts**: the default host allocator calls into `libc`

pub mod align;
mod array;
pub mod bounded;
pub mod config;
mod error;
mod header;
pub mod host;
pub mod raw;
mod sso;

pub use array::GrowableArray;
pub use config::{GROWTH_FACTOR, GrowthPolicy, INLINE_CAPACITY};
pub use error::BufError;
pub use header::Header;
pub use host::{HostAllocator, Libc};
pub use raw::RawBuf;
pub use sso::SsoString;
