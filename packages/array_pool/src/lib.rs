#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! A fixed-capacity object pool over an array you own.
//!
//! Many workloads (particles, entities, connection slots, per-frame scratch objects) keep cycling
//! objects between "in use" and "unused" and cannot afford an allocation on every cycle. This
//! crate lets you allocate the array once, up front, and then hands out and takes back elements
//! of that array in constant time, without allocating.
//!
//! This is part of the [Folo project](https://github.com/folo-rs/folo) that provides mechanisms for
//! high-performance hardware-aware programming in Rust.
//!
//! # Types
//!
//! * [`ArrayPool`] borrows a `&mut [T]` and gives access to the elements it hands out.
//! * [`SlotTracker`] is the type-agnostic engine behind it. It only tracks which of N slots are
//!   in use, for cases where element storage is not a single slice.
//! * [`Slot`] identifies one acquired element.
//!
//! # How it works
//!
//! Each element has a tracking node. The nodes form two doubly-linked lists, one for unused and
//! one for in-use elements, addressed by their heads only: the backward link of a head points to
//! the tail. Acquiring moves the head of the unused list to the tail of the in-use list; retiring
//! moves a node from anywhere in the in-use list to the tail of the unused list. All of this is
//! index manipulation in a node array allocated when the pool is created.
//!
//! The result is first-in-first-out reuse: the element that has been unused the longest is the
//! next one handed out.
//!
//! # Example
//!
//! ```
//! use array_pool::{ArrayPool, Error};
//!
//! let mut ids = [0_u32; 2];
//! let mut pool = ArrayPool::new(&mut ids).unwrap();
//!
//! let a = pool.acquire_with(|id| *id = 100).unwrap();
//! let b = pool.acquire_with(|id| *id = 200).unwrap();
//!
//! // The pool is fixed-size; running out is reported, not an allocation.
//! assert!(matches!(pool.acquire(), Err(Error::Exhausted { .. })));
//!
//! pool.retire(a).unwrap();
//! let c = pool.acquire().unwrap();
//! assert_eq!(c, a);
//! assert_eq!(pool[b], 200);
//! ```
//!
//! # Misuse detection
//!
//! Retiring a slot twice, or retiring a slot that came from a different pool, is reported as
//! [`Error::SlotNotActive`] or [`Error::ForeignSlot`] respectively and leaves the pool unchanged.
//! Using a pool after destroying it is impossible because [`ArrayPool::destroy()`] consumes it.
//!
//! A [`Slot`] is not a generational handle. If a slot is retired and the same element is acquired
//! again, an old copy of the first slot compares equal to the new one and is accepted by
//! [`ArrayPool::retire()`] and by element access, which then act on the new occupant. This case
//! is not detected. Drop every copy of a slot when retiring it.
//!
//! # Thread safety
//!
//! The pool has no internal synchronization. All mutation requires `&mut self`, so sharing a pool
//! between threads requires wrapping it in a `Mutex` or similar.

mod builder;
mod drop_policy;
mod error;
mod list;
mod pool;
mod slot;
mod tracker;

pub use builder::*;
pub use drop_policy::*;
pub use error::*;
pub(crate) use list::*;
pub use pool::*;
pub use slot::*;
pub use tracker::*;
