//! A [`RefCount`] tracks how many owners a shared object currently has,
//! without locks and without any state beyond a single atomic word. Owners
//! call [`acquire`] when they take a reference and [`release`] when they
//! drop it; the counter's whole job is to tell exactly one caller "that
//! was the last reference, destroy the object now", and to loudly report
//! misuse instead of corrupting itself.
//!
//! Internally the word is a signed integer whose unsigned value range is
//! carved into bands. Every non-negative value means the object is alive
//! and encodes the outstanding count minus one, so the hot path of both
//! operations is one relaxed fetch-and-add. The all-bits-set value appears
//! at the exact instant the last reference goes away, and the one
//! [`release`] that produced it claims the moment with a single
//! compare-and-swap to the dead marker. If a concurrent [`acquire`]
//! resurrects the count first, the swap fails and the release simply
//! reports the object still alive; the swap is never retried. Above the
//! alive range live the sentinel markers: a saturated marker the counter
//! pins itself to when the count outgrows the word (leaking the object
//! beats destroying it on a count that wrapped), and a dead band that
//! catches every acquire-after-death and over-release.
//!
//! Which of those happened comes back to the caller as a [`Status`].
//! Nothing is a panic and nothing retries: [`Status::NoRef`] is the
//! exactly-once destroy signal, and [`Status::Dead`],
//! [`Status::Overflow`] and [`Status::Unexpected`] are diagnostics for the
//! owner to act on.
//!
//! The backing width is picked at the type level: [`RefCount`] is generic
//! over [`i16`], [`i32`] and [`i64`] (see [`Word`]), and any other width
//! refuses to compile.
//!
//! # Example
//!
//! ```rust
//! use std::thread;
//!
//! use refcnt::{RefCount, Status};
//!
//! let refs: RefCount<i64> = RefCount::new();
//!
//! thread::scope(|scope| {
//!     for _ in 0..4 {
//!         scope.spawn(|| {
//!             for _ in 0..1_000 {
//!                 // The spawning thread still holds its reference, so
//!                 // these transient owners always see the object alive.
//!                 assert_eq!(refs.acquire(), Status::Alive);
//!                 assert_eq!(refs.release(), Status::Alive);
//!             }
//!         });
//!     }
//! });
//!
//! // Dropping the original reference is the exactly-once destroy signal.
//! assert_eq!(refs.release(), Status::NoRef);
//!
//! // From here on, every use of the counter is surfaced as a bug.
//! assert_eq!(refs.acquire(), Status::Dead);
//! ```
//!
//! [`acquire`]: RefCount::acquire
//! [`release`]: RefCount::release
#![deny(missing_docs)]
#![warn(
	clippy::all,
	clippy::correctness,
	clippy::pedantic,
	clippy::cargo,
	clippy::nursery,
	clippy::perf,
	clippy::style
)]
#![allow(clippy::must_use_candidate)]
#![cfg_attr(not(feature = "std"), no_std)]

mod count;
mod status;
mod word;

#[doc(inline)]
pub use self::count::{RefCount, RefCount16, RefCount32, RefCount64};

#[doc(inline)]
pub use self::status::Status;

#[doc(inline)]
pub use self::word::Word;
