//! The backing word and its sentinel encoding.
//!
//! A counter here is one signed machine word. Its unsigned reinterpretation
//! is split into disjoint bands, highest first:
//!
//! * `0xE0...` and everything from `0xC0...` up is the released/dead band.
//!   A word in it belongs to an object that has already been fully
//!   released. The exact marker written is `DEAD` (`0xE0` in the high
//!   byte); the band reaches down to `0xC0...` so that arithmetic done
//!   *near* `DEAD` by racing operations still classifies as dead.
//! * `0xA0...` is the saturated marker. Words from the top of the alive
//!   range up to the released band form the overflow band; once the count
//!   no longer fits the width, the word is pinned to `SATURATED` and stops
//!   tracking.
//! * All bits set (signed `-1`) is the zero-crossing value: it appears at
//!   the exact moment the last outstanding reference is dropped.
//! * Every signed non-negative value is alive and equals the outstanding
//!   count minus one, so a fresh counter starts at `ONE` (0).
//!
//! The markers use fixed high-byte patterns, scaled by width, so a hex dump
//! of the word is readable on any of the supported widths.
//!
//! Everything width-specific (the atomic cell, the constants, the band
//! classifier) hangs off the sealed [`Word`] trait, implemented below for
//! [`i16`], [`i32`] and [`i64`].

use core::fmt;

use portable_atomic::{AtomicI16, AtomicI32, AtomicI64, Ordering};

pub(crate) mod seal {
	/// The band a word value falls in.
	#[derive(Debug, Clone, Copy, PartialEq, Eq)]
	pub enum Band {
		/// Signed non-negative: the value is the outstanding count minus one.
		Alive,
		/// All bits set: the last outstanding reference was just dropped.
		Zero,
		/// In the released/dead band. The object is already gone.
		Released,
		/// Past the alive range but below the released band.
		Saturated,
		/// Outside every known band. Unreachable through `incr`/`decr`
		/// alone; seeing it means the word was written by something else.
		Corrupt,
	}

	/// Raw storage interface, implemented once per supported width.
	pub trait Word: Sized {
		/// The atomic cell holding the word.
		type Atomic: Send + Sync;

		/// Initial value: exactly one outstanding reference.
		const ONE: Self;
		/// The zero-crossing value, all bits set.
		const ZERO: Self;
		/// Terminal marker for a fully released object.
		const DEAD: Self;
		/// Terminal marker for an overflowed count.
		const SATURATED: Self;

		fn cell(value: Self) -> Self::Atomic;
		fn load(cell: &Self::Atomic) -> Self;

		/// Add one and return the new value. Relaxed; wraps.
		fn incr(cell: &Self::Atomic) -> Self;

		/// Subtract one and return the new value. Relaxed; wraps.
		fn decr(cell: &Self::Atomic) -> Self;

		/// Overwrite the word with a terminal marker.
		fn pin(cell: &Self::Atomic, value: Self);

		/// The one compare-and-swap of the whole design: `ZERO` -> `DEAD`.
		///
		/// On failure returns the value that beat us to the word.
		fn claim_dead(cell: &Self::Atomic) -> Result<(), Self>;

		fn band(value: Self) -> Band;

		/// The outstanding count encoded by an alive word.
		fn live(value: Self) -> u64;
	}
}

/// A machine word able to back a [`RefCount`].
///
/// Implemented for [`i16`], [`i32`] and [`i64`]. The trait is sealed: the
/// encoding relies on the exact width and signedness of the backing
/// integer, so no other implementations are possible and unsupported
/// widths are rejected at compile time.
///
/// [`RefCount`]: crate::RefCount
pub trait Word: seal::Word + Copy + fmt::Debug + Send + Sync + 'static {}

macro_rules! impl_word {
	($($int:ty, $uint:ty, $atomic:ty;)*) => {
		$(
			impl seal::Word for $int {
				type Atomic = $atomic;

				const ONE: Self = 0;
				const ZERO: Self = -1;
				const DEAD: Self =
					((0xE0 as $uint) << (8 * (core::mem::size_of::<$uint>() - 1))) as $int;
				const SATURATED: Self =
					((0xA0 as $uint) << (8 * (core::mem::size_of::<$uint>() - 1))) as $int;

				fn cell(value: Self) -> Self::Atomic {
					<$atomic>::new(value)
				}

				fn load(cell: &Self::Atomic) -> Self {
					cell.load(Ordering::Relaxed)
				}

				fn incr(cell: &Self::Atomic) -> Self {
					cell.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
				}

				fn decr(cell: &Self::Atomic) -> Self {
					cell.fetch_sub(1, Ordering::Relaxed).wrapping_sub(1)
				}

				fn pin(cell: &Self::Atomic, value: Self) {
					cell.store(value, Ordering::Relaxed);
				}

				fn claim_dead(cell: &Self::Atomic) -> Result<(), Self> {
					/* Must be the strong variant. A spurious failure could
					 * hand back `ZERO` as the observed value and misreport
					 * the unique zero-crossing as a double-release.
					 */
					cell.compare_exchange(
						Self::ZERO,
						Self::DEAD,
						Ordering::Relaxed,
						Ordering::Relaxed,
					)
					.map(|_| ())
				}

				fn band(value: Self) -> seal::Band {
					const MAX: $uint = <$uint>::MAX >> 1;
					const RELEASED: $uint =
						(0xC0 as $uint) << (8 * (core::mem::size_of::<$uint>() - 1));

					let raw = value as $uint;

					if value >= Self::ONE {
						seal::Band::Alive
					} else if raw == <$uint>::MAX {
						seal::Band::Zero
					} else if raw >= RELEASED {
						seal::Band::Released
					} else if raw >= MAX {
						seal::Band::Saturated
					} else {
						seal::Band::Corrupt
					}
				}

				fn live(value: Self) -> u64 {
					(value as u64) + 1
				}
			}

			impl Word for $int {}
		)*
	};
}

impl_word! {
	i16, u16, AtomicI16;
	i32, u32, AtomicI32;
	i64, u64, AtomicI64;
}
