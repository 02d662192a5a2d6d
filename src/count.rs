use core::fmt;

use crate::status::Status;
use crate::word::seal::Band;
use crate::word::Word;

/// A lock-free reference count for one shared object.
///
/// The counter starts out with one outstanding reference, the one held by
/// whoever constructed it. Owners come and go with [`acquire`] and
/// [`release`]; both complete in a bounded number of atomic instructions
/// and report the resulting state as a [`Status`]. The `release` that
/// drops the last reference reports [`Status::NoRef`] exactly once, and
/// that report is the object owner's sole cue to destroy the object.
///
/// The counter only tracks and reports. It does not destroy anything, hold
/// any allocation, or fence any memory: a caller acting on
/// [`Status::NoRef`] must pair its own acquire/release fences around the
/// destruction so the destroying thread synchronizes with every earlier
/// releasing thread.
///
/// # Example
///
/// ```rust
/// use refcnt::{RefCount, Status};
///
/// let refs: RefCount<i32> = RefCount::new(); // one outstanding reference
///
/// assert_eq!(refs.acquire(), Status::Alive); // a second owner appears
/// assert_eq!(refs.release(), Status::Alive); // and leaves again
///
/// assert_eq!(refs.release(), Status::NoRef); // destroy the object now
/// assert_eq!(refs.acquire(), Status::Dead);  // caught: use after release
/// ```
///
/// [`acquire`]: Self::acquire
/// [`release`]: Self::release
pub struct RefCount<W: Word> {
	word: W::Atomic,
}

impl<W: Word> RefCount<W> {
	/// Create a counter holding exactly one outstanding reference.
	pub fn new() -> Self {
		Self { word: W::cell(W::ONE) }
	}

	/// Take one more reference to the object.
	///
	/// Returns [`Status::Alive`] if the object is live and the count was
	/// tracked. On a counter that already reported [`Status::NoRef`] this
	/// is a use-after-release bug and comes back as [`Status::Dead`]; once
	/// the count outgrew the backing width it comes back as
	/// [`Status::Overflow`].
	pub fn acquire(&self) -> Status {
		let cnt = W::incr(&self.word);

		if let Band::Alive = W::band(cnt) {
			return Status::Alive;
		}

		self.resolve(cnt)
	}

	/// Drop one reference to the object.
	///
	/// Returns [`Status::Alive`] while other references remain. The call
	/// whose decrement removes the last reference gets [`Status::NoRef`],
	/// and no other call on this counter ever will: the zero crossing is
	/// claimed with a single compare-and-swap, so a concurrent [`acquire`]
	/// that resurrects the count in that window simply wins, and the
	/// release reports [`Status::Alive`] instead. If the swap is lost, the
	/// observed value is re-evaluated once; there is no retry loop.
	///
	/// Releasing more times than acquired reports [`Status::Dead`].
	///
	/// The counter does no fencing of its own. The thread that acts on
	/// [`Status::NoRef`] must synchronize with all prior releasing threads
	/// before touching the object it is about to destroy.
	///
	/// [`acquire`]: Self::acquire
	pub fn release(&self) -> Status {
		let cnt = W::decr(&self.word);

		match W::band(cnt) {
			Band::Alive => Status::Alive,
			Band::Zero => match W::claim_dead(&self.word) {
				Ok(()) => Status::NoRef,
				/* Lost to a concurrent operation. Whatever it was, it moved
				 * the word into a band the slow path already settles; one
				 * re-check, never a loop.
				 */
				Err(current) => self.resolve(current),
			},
			_ => self.resolve(cnt),
		}
	}

	/// A snapshot of the outstanding-reference count.
	///
	/// `Some(n)` while the object is alive, `None` once the word left the
	/// alive range for good. Purely advisory under concurrency: by the
	/// time the caller looks at `n`, other threads may have changed it.
	pub fn count(&self) -> Option<u64> {
		let word = W::load(&self.word);

		match W::band(word) {
			Band::Alive => Some(W::live(word)),
			_ => None,
		}
	}

	/// Settle a word that has left the alive range.
	///
	/// Pins the matching terminal marker so later operations keep
	/// reporting the same condition instead of wandering through the
	/// bands.
	#[cold]
	#[inline(never)]
	fn resolve(&self, cnt: W) -> Status {
		match W::band(cnt) {
			Band::Alive => Status::Alive,
			Band::Zero | Band::Released => {
				W::pin(&self.word, W::DEAD);
				Status::Dead
			}
			Band::Saturated => {
				W::pin(&self.word, W::SATURATED);
				Status::Overflow
			}
			Band::Corrupt => Status::Unexpected,
		}
	}
}

impl<W: Word> Default for RefCount<W> {
	fn default() -> Self {
		Self::new()
	}
}

impl<W: Word> fmt::Debug for RefCount<W> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let word = W::load(&self.word);

		f.debug_struct("RefCount")
			.field("word", &word)
			.field("band", &W::band(word))
			.finish()
	}
}

/// A [`RefCount`] backed by a 16-bit word.
pub type RefCount16 = RefCount<i16>;

/// A [`RefCount`] backed by a 32-bit word.
pub type RefCount32 = RefCount<i32>;

/// A [`RefCount`] backed by a 64-bit word.
pub type RefCount64 = RefCount<i64>;

#[cfg(all(test, feature = "std"))]
mod tests {
	use super::*;

	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::thread::scope;

	fn lifecycle<W: Word>() {
		let refs: RefCount<W> = RefCount::new();

		assert_eq!(refs.acquire(), Status::Alive);
		assert_eq!(refs.release(), Status::Alive);
		assert_eq!(refs.release(), Status::NoRef);

		assert_eq!(refs.release(), Status::Dead);
		assert_eq!(refs.acquire(), Status::Dead);
	}

	fn fresh_counter_releases_to_noref<W: Word>() {
		let refs: RefCount<W> = RefCount::new();

		assert_eq!(refs.release(), Status::NoRef);
		assert_eq!(refs.acquire(), Status::Dead);
	}

	fn double_release_is_surfaced<W: Word>() {
		let refs: RefCount<W> = RefCount::new();

		assert_eq!(refs.release(), Status::NoRef);
		assert_eq!(refs.release(), Status::Dead);
		assert_eq!(refs.release(), Status::Dead);
	}

	fn count_snapshots<W: Word>() {
		let refs: RefCount<W> = RefCount::new();
		assert_eq!(refs.count(), Some(1));

		assert_eq!(refs.acquire(), Status::Alive);
		assert_eq!(refs.count(), Some(2));

		assert_eq!(refs.release(), Status::Alive);
		assert_eq!(refs.count(), Some(1));

		assert_eq!(refs.release(), Status::NoRef);
		assert_eq!(refs.count(), None);
	}

	fn terminal_statuses_stick<W: Word>() {
		let refs: RefCount<W> = RefCount::new();
		assert_eq!(refs.release(), Status::NoRef);

		for _ in 0..4 {
			assert!(refs.acquire().is_terminal());
			assert!(refs.release().is_terminal());
		}
	}

	macro_rules! test_widths {
		(@impl, $test_fn:ident) => {
			$test_fn::<i16>();
			$test_fn::<i32>();
			$test_fn::<i64>();
		};
		($(
			$test_fn:ident => $test_fn_impl:ident,
		)*) => {
			$(
				#[test]
				fn $test_fn_impl() {
					test_widths! { @impl, $test_fn }
				}
			)*
		};
	}

	test_widths! {
		lifecycle => lifecycle_impl,
		fresh_counter_releases_to_noref => fresh_counter_impl,
		double_release_is_surfaced => double_release_impl,
		count_snapshots => count_snapshots_impl,
		terminal_statuses_stick => terminal_stick_impl,
	}

	#[test]
	fn saturates_past_the_width_limit() {
		let refs = RefCount16::new();

		/* The alive range tops out at `i16::MAX`. With the construction
		 * reference already outstanding, another `i16::MAX` acquires all
		 * fit; the next one does not.
		 */
		for _ in 0..i16::MAX {
			assert_eq!(refs.acquire(), Status::Alive);
		}

		assert_eq!(refs.acquire(), Status::Overflow);
		assert_eq!(refs.count(), None);
	}

	#[test]
	fn overflow_sticks() {
		let refs = RefCount16::new();

		for _ in 0..i16::MAX {
			assert_eq!(refs.acquire(), Status::Alive);
		}
		assert_eq!(refs.acquire(), Status::Overflow);

		for _ in 0..8 {
			assert_eq!(refs.release(), Status::Overflow);
			assert_eq!(refs.acquire(), Status::Overflow);
		}
	}

	#[test]
	fn concurrent_pairs_never_disturb_the_owner() {
		let refs = RefCount64::new();

		scope(|scope| {
			for _ in 0..8 {
				scope.spawn(|| {
					for _ in 0..10_000 {
						assert_eq!(refs.acquire(), Status::Alive);
						assert_eq!(refs.release(), Status::Alive);
					}
				});
			}
		});

		// Only the construction reference is left.
		assert_eq!(refs.count(), Some(1));
		assert_eq!(refs.release(), Status::NoRef);
	}

	#[test]
	fn noref_is_reported_exactly_once() {
		const THREADS: usize = 8;

		let refs = RefCount32::new();
		for _ in 0..THREADS {
			assert_eq!(refs.acquire(), Status::Alive);
		}

		let noref = AtomicUsize::new(0);
		let alive = AtomicUsize::new(0);

		// THREADS + 1 references, THREADS + 1 racing releases.
		scope(|scope| {
			for _ in 0..=THREADS {
				scope.spawn(|| match refs.release() {
					Status::NoRef => {
						noref.fetch_add(1, Ordering::Relaxed);
					}
					Status::Alive => {
						alive.fetch_add(1, Ordering::Relaxed);
					}
					status => panic!("impossible status: {status}"),
				});
			}
		});

		assert_eq!(noref.load(Ordering::Relaxed), 1);
		assert_eq!(alive.load(Ordering::Relaxed), THREADS);
		assert_eq!(refs.acquire(), Status::Dead);
	}

	#[test]
	fn a_racing_acquire_cannot_outlive_noref() {
		for _ in 0..1_000 {
			let refs = RefCount32::new();

			let (put, got) = scope(|scope| {
				let put = scope.spawn(|| refs.release());
				let got = scope.spawn(|| refs.acquire());

				(put.join().unwrap(), got.join().unwrap())
			});

			match (put, got) {
				/* The acquire resurrected the count before the release
				 * could claim the zero crossing. The acquirer now holds
				 * the only reference.
				 */
				(Status::Alive, Status::Alive) => {
					assert_eq!(refs.release(), Status::NoRef);
				}
				// The release won; the late acquire must be caught.
				(Status::NoRef, Status::Dead) => {
					assert_eq!(refs.acquire(), Status::Dead);
				}
				pair => panic!("impossible interleaving: {pair:?}"),
			}
		}
	}

	#[test]
	fn default_is_one_reference() {
		let refs: RefCount64 = RefCount::default();

		assert_eq!(refs.count(), Some(1));
		assert_eq!(refs.release(), Status::NoRef);
	}

	#[test]
	fn debug_decodes_the_band() {
		let refs = RefCount32::new();
		assert!(format!("{refs:?}").contains("Alive"));

		assert_eq!(refs.release(), Status::NoRef);
		assert!(format!("{refs:?}").contains("Released"));
	}
}
