use core::fmt;

use zerocopy_derive::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Length of a full container id (a docker resource-group directory name).
pub const CONTAINER_ID_LEN: usize = 64;
pub const CONTAINER_ID_SHORT_LEN: usize = 12;

/// Container identity as copied from the kernel resource-group name.
///
/// Bytes past `len` are always zero, so byte-wise key comparison in kernel
/// maps agrees with logical equality.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct Container {
	pub id: [u8; CONTAINER_ID_LEN],
	pub len: u32,
}

impl Container {
	pub const EMPTY: Container = Container {
		id: [0u8; CONTAINER_ID_LEN],
		len: 0,
	};

	/// Builds an identity from a resource-group name.
	///
	/// The copy stops at the first NUL byte, at the end of `name`, or after
	/// [`CONTAINER_ID_LEN`] bytes, whichever comes first. Nothing past the
	/// name's real length is ever read.
	pub fn from_name(name: &[u8]) -> Self {
		let mut container = Self::EMPTY;
		let mut len = 0u32;

		for (dst, &src) in container.id.iter_mut().zip(name.iter()) {
			if src == 0 {
				break;
			}
			*dst = src;
			len += 1;
		}

		container.len = len;
		container
	}

	/// Builds an identity from a resource-group name, reduced to the bare
	/// container id when the name is a runtime scope such as
	/// `docker-<id>.scope`. See [`group_container_id`].
	pub fn from_group_name(name: &[u8]) -> Self {
		Self::from_name(group_container_id(name))
	}

	pub fn id_bytes(&self) -> &[u8] {
		self.id.get(..self.len as usize).unwrap_or(&self.id)
	}

	/// First [`CONTAINER_ID_SHORT_LEN`] bytes, zero padded for shorter ids.
	pub fn short_id(&self) -> &[u8] {
		&self.id[..CONTAINER_ID_SHORT_LEN]
	}
}

/// Prefixes container runtimes give their systemd scopes.
const SCOPE_PREFIXES: [&[u8]; 4] = [b"docker-", b"cri-containerd-", b"crio-", b"libpod-"];
const SCOPE_SUFFIX: &[u8] = b".scope";

/// The container id inside a resource-group name: `docker-<id>.scope` and its
/// cri-containerd/crio/libpod variants yield `<id>`; any other name is kept.
/// The name ends at its first NUL.
pub fn group_container_id(name: &[u8]) -> &[u8] {
	let name = name.split(|&b| b == 0).next().unwrap_or(name);

	for prefix in SCOPE_PREFIXES {
		if let Some(rest) = name.strip_prefix(prefix) {
			return rest.strip_suffix(SCOPE_SUFFIX).unwrap_or(rest);
		}
	}

	name
}

impl fmt::Display for Container {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match core::str::from_utf8(self.id_bytes()) {
			Ok(id) => f.write_str(id),
			Err(_) => {
				for b in self.id_bytes() {
					write!(f, "{b:02x}")?;
				}
				Ok(())
			}
		}
	}
}

impl fmt::Debug for Container {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Container({self})")
	}
}

/// Counter key: a container paired with a syscall or capability number.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct ContainerKey {
	pub container: Container,
	pub id: u32,
}

impl ContainerKey {
	pub fn new(container: Container, id: u32) -> Self {
		Self { container, id }
	}
}

// region:    --- Tests


// endregion: --- Tests
