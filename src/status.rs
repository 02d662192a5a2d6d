use core::fmt;

/// The outcome of an [`acquire`] or [`release`] call.
///
/// A status is not an error in the `Result` sense: the counter is total and
/// never fails to complete. It is the caller's only window into the state
/// machine, which is why the type is `#[must_use]`. In particular
/// [`NoRef`] is handed out exactly once per counter and is the unique
/// signal to run whatever destroys the managed object, while [`Dead`] and
/// [`Unexpected`] are usage diagnostics the owner should treat as fatal,
/// not retry.
///
/// [`acquire`]: crate::RefCount::acquire
/// [`release`]: crate::RefCount::release
/// [`NoRef`]: Self::NoRef
/// [`Dead`]: Self::Dead
/// [`Unexpected`]: Self::Unexpected
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
	/// The object is alive and the operation was tracked.
	///
	/// For [`release`] this means other references are still outstanding.
	///
	/// [`release`]: crate::RefCount::release
	Alive,

	/// This release dropped the last outstanding reference.
	///
	/// Exactly one call per counter ever reports this. The caller owning
	/// the object must use it as the one trigger for destruction.
	NoRef,

	/// The object was already fully released.
	///
	/// Acquiring on a dead counter is a use-after-release bug; releasing on
	/// one means more releases than acquisitions. Neither is corrected
	/// silently.
	Dead,

	/// The count no longer fits the backing width.
	///
	/// The counter is pinned to its saturated marker and stops tracking;
	/// the object is effectively leaked instead of being destroyed under
	/// an ambiguous count.
	Overflow,

	/// The word held a value outside every known band.
	///
	/// Cannot be produced by the counter's own operations. It means the
	/// word was corrupted by a stray write somewhere else.
	Unexpected,
}

impl Status {
	/// Whether the counter still tracks a live object.
	pub const fn is_alive(self) -> bool {
		matches!(self, Self::Alive)
	}

	/// Whether the counter has stopped tracking for good.
	///
	/// True for [`Dead`], [`Overflow`] and [`Unexpected`]. No operation on
	/// a counter in one of these states can ever report [`Alive`] or
	/// [`NoRef`] again.
	///
	/// [`Alive`]: Self::Alive
	/// [`NoRef`]: Self::NoRef
	/// [`Dead`]: Self::Dead
	/// [`Overflow`]: Self::Overflow
	/// [`Unexpected`]: Self::Unexpected
	pub const fn is_terminal(self) -> bool {
		matches!(self, Self::Dead | Self::Overflow | Self::Unexpected)
	}
}

impl fmt::Display for Status {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Alive => "alive",
			Self::NoRef => "no refs left",
			Self::Dead => "already released",
			Self::Overflow => "count overflowed",
			Self::Unexpected => "corrupt count",
		};

		f.write_str(name)
	}
}
