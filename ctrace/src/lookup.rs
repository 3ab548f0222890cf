//! Numeric id to name tables for syscalls and capabilities.

use syscalls::Sysno;

/// Syscall numbers above this are not probed.
const SYSCALL_ID_MAX: usize = 1024;

/// Capability names in kernel numbering (`include/uapi/linux/capability.h`),
/// lowercase and without the `cap_` prefix.
const CAPABILITY_NAMES: [&str; 41] = [
	"chown",
	"dac_override",
	"dac_read_search",
	"fowner",
	"fsetid",
	"kill",
	"setgid",
	"setuid",
	"setpcap",
	"linux_immutable",
	"net_bind_service",
	"net_broadcast",
	"net_admin",
	"net_raw",
	"ipc_lock",
	"ipc_owner",
	"sys_module",
	"sys_rawio",
	"sys_chroot",
	"sys_ptrace",
	"sys_pacct",
	"sys_admin",
	"sys_boot",
	"sys_nice",
	"sys_resource",
	"sys_time",
	"sys_tty_config",
	"mknod",
	"lease",
	"audit_write",
	"audit_control",
	"setfcap",
	"mac_override",
	"mac_admin",
	"syslog",
	"wake_alarm",
	"block_suspend",
	"audit_read",
	"perfmon",
	"bpf",
	"checkpoint_restore",
];

pub trait Lookup {
	fn name(&self, id: u32) -> Option<&'static str>;

	/// All known `(id, name)` pairs, ordered by id.
	fn entries(&self) -> Vec<(u32, &'static str)>;

	fn normalize<'a>(&self, name: &'a str) -> std::borrow::Cow<'a, str>;

	fn id(&self, name: &str) -> Option<u32> {
		let name = self.normalize(name);
		self.entries().into_iter().find(|(_, n)| *n == name).map(|(id, _)| id)
	}

	/// Name as written to tracefiles; unknown ids render as their number.
	fn display_name(&self, id: u32) -> String {
		match self.name(id) {
			Some(name) => name.to_string(),
			None => id.to_string(),
		}
	}

	/// Resolves a query: a number yields its name, a name yields its id.
	fn query(&self, query: &str) -> Option<String> {
		match query.trim().parse::<u32>() {
			Ok(id) => self.name(id).map(str::to_string),
			Err(_) => self.id(query.trim()).map(|id| id.to_string()),
		}
	}
}

/// Syscalls of the host architecture.
pub struct Syscalls;

impl Lookup for Syscalls {
	fn name(&self, id: u32) -> Option<&'static str> {
		Sysno::new(id as usize).map(|sysno| sysno.name())
	}

	fn entries(&self) -> Vec<(u32, &'static str)> {
		(0..SYSCALL_ID_MAX)
			.filter_map(Sysno::new)
			.map(|sysno| (sysno.id() as u32, sysno.name()))
			.collect()
	}

	fn normalize<'a>(&self, name: &'a str) -> std::borrow::Cow<'a, str> {
		name.to_lowercase().into()
	}
}

pub struct Capabilities;

impl Lookup for Capabilities {
	fn name(&self, id: u32) -> Option<&'static str> {
		CAPABILITY_NAMES.get(id as usize).copied()
	}

	fn entries(&self) -> Vec<(u32, &'static str)> {
		CAPABILITY_NAMES
			.iter()
			.enumerate()
			.map(|(id, name)| (id as u32, *name))
			.collect()
	}

	fn normalize<'a>(&self, name: &'a str) -> std::borrow::Cow<'a, str> {
		let name = name.to_lowercase();
		match name.strip_prefix("cap_") {
			Some(stripped) => stripped.to_string().into(),
			None => name.into(),
		}
	}
}

// region:    --- Tests

#[cfg(test)]
mod tests {
	type Result<T> = core::result::Result<T, Box<dyn std::error::Error>>; // For tests.

	use super::*;

	#[test]
	fn lookup_capability_by_id_and_name() -> Result<()> {
		// -- Setup & Fixtures
		let caps = Capabilities;

		// -- Check
		assert_eq!(caps.name(0), Some("chown"));
		assert_eq!(caps.name(13), Some("net_raw"));
		assert_eq!(caps.name(40), Some("checkpoint_restore"));
		assert_eq!(caps.name(41), None);
		assert_eq!(caps.id("net_raw"), Some(13));
		assert_eq!(caps.id("CAP_NET_RAW"), Some(13));
		assert_eq!(caps.id("Sys_Admin"), Some(21));
		assert_eq!(caps.id("cap_nothing"), None);

		Ok(())
	}

	#[test]
	fn lookup_capability_entries_are_dense() -> Result<()> {
		// -- Exec
		let entries = Capabilities.entries();

		// -- Check
		assert_eq!(entries.len(), 41);
		assert!(entries.iter().enumerate().all(|(i, (id, _))| i as u32 == *id));

		Ok(())
	}

	#[test]
	fn lookup_syscall_by_id_and_name() -> Result<()> {
		// -- Setup & Fixtures
		let sys = Syscalls;
		let read_id = Sysno::read.id() as u32;

		// -- Check
		assert_eq!(sys.name(read_id), Some("read"));
		assert_eq!(sys.id("read"), Some(read_id));
		assert_eq!(sys.id("READ"), Some(read_id));
		assert_eq!(sys.id("not_a_syscall"), None);
		assert_eq!(sys.name(100_000), None);

		Ok(())
	}

	#[test]
	fn lookup_query_dispatch() -> Result<()> {
		// -- Setup & Fixtures
		let caps = Capabilities;

		// -- Check
		assert_eq!(caps.query("13").as_deref(), Some("net_raw"));
		assert_eq!(caps.query("cap_net_raw").as_deref(), Some("13"));
		assert_eq!(caps.query("99"), None);
		assert_eq!(caps.query("bogus"), None);

		Ok(())
	}

	#[test]
	fn lookup_display_name_falls_back_to_number() -> Result<()> {
		// -- Check
		assert_eq!(Capabilities.display_name(12), "net_admin");
		assert_eq!(Capabilities.display_name(63), "63");
		assert_eq!(Syscalls.display_name(100_000), "100000");

		Ok(())
	}
}

// endregion: --- Tests
