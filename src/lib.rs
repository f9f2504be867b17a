//! Growable vector built directly on raw, uninitialized storage.
//!
//! Two layers make up the crate:
//!
//! - [`RawMemory`] owns a block of uninitialized slots for some `T`. It knows
//!   nothing about which slots hold values, never runs element destructors, and
//!   only offers address arithmetic, slot access and constant-time swaps.
//! - [`Vector`] owns exactly one `RawMemory` plus the count of leading live
//!   slots, and implements construction, cloning, insertion, erasure and growth
//!   on top of it.
//!
//! Growth doubles the capacity (starting at one). Elements are relocated into a
//! new block by moving them, which in Rust can never fail. Operations that have
//! to clone (`Clone`, `assign`, `push_back_cloned`) are panic safe: a panicking
//! `clone` leaves the vector valid, and every partially built block is freed.
//!
//! Allocation failure is reported as [`Error`] by the `try_*` operations and
//! escalated through `std::alloc::handle_alloc_error` by the others.
//!
//! ```rust
//! use placevec::Vector;
//!
//! let mut v = Vector::new();
//! v.push_back(1);
//! v.push_back(2);
//! v.push_back(3);
//! v.erase(1);
//! v.insert(0, 0);
//! assert_eq!(v, [0, 1, 3]);
//! ```
//!
//! Enable the `logging` feature to trace allocations through the `log` crate.

#[macro_use]
mod logging;

mod error;
mod iter;
mod raw;
mod relocate;
mod vector;

pub use error::Error;
pub use iter::IntoIter;
pub use raw::RawMemory;
pub use vector::Vector;

#[cfg(test)]
pub mod dropflag;
