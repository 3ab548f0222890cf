/// A process's effective capability mask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CapabilitySet(u64);

impl CapabilitySet {
	pub const EMPTY: CapabilitySet = CapabilitySet(0);

	pub fn new(mask: u64) -> Self {
		Self(mask)
	}

	/// Combines the two 32-bit words of a `kernel_cap_t`, low word first.
	pub fn from_words(words: [u32; 2]) -> Self {
		Self(((words[1] as u64) << 32) | words[0] as u64)
	}

	pub fn contains(&self, cap: u32) -> bool {
		if cap >= u64::BITS {
			return false;
		}
		self.0 & (1u64 << cap) != 0
	}
}

/// Source of the effective capability mask of the process raising a check.
pub trait Credentials {
	fn effective(&self) -> CapabilitySet;
}

impl Credentials for CapabilitySet {
	fn effective(&self) -> CapabilitySet {
		*self
	}
}

// region:    --- Tests


// endregion: --- Tests
