use zerocopy_derive::{FromBytes, Immutable, IntoBytes, KnownLayout};

pub const NAME_MAX_LEN: usize = 32;

/// Syscall or capability name, as stored in the diagnostic name maps.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct Name {
	pub value: [u8; NAME_MAX_LEN],
	pub len: u32,
}

impl Name {
	pub const UNKNOWN: Name = Name::from_static(b"?");

	pub const fn from_static(name: &[u8]) -> Self {
		let mut value = [0u8; NAME_MAX_LEN];
		let mut i = 0;
		while i < name.len() && i < NAME_MAX_LEN {
			value[i] = name[i];
			i += 1;
		}
		Self { value, len: i as u32 }
	}

	pub fn new(name: &str) -> Self {
		Self::from_static(name.as_bytes())
	}

	pub fn as_bytes(&self) -> &[u8] {
		self.value.get(..self.len as usize).unwrap_or(&self.value)
	}
}

/// Event kind tag used in diagnostic lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
	Syscall,
	Capability,
}

impl EventKind {
	pub fn tag(&self) -> &'static str {
		match self {
			EventKind::Syscall => "sys",
			EventKind::Capability => "cap",
		}
	}
}

// region:    --- Tests


// endregion: --- Tests
