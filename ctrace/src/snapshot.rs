use std::collections::{BTreeMap, HashMap};

use aya::{
	maps::{HashMap as BpfHashMap, MapData},
	Ebpf,
};
use ctrace_common::{Container, ContainerKey};
use tracing::debug;

use crate::{Error, Result};

/// Per-id occurrence counts of one container.
pub type Counts = BTreeMap<u32, u64>;

/// Point-in-time copy of the kernel tables.
///
/// Each entry is read atomically, the tables as a whole are not: counts may
/// move while a snapshot is taken.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
	pub syscalls: HashMap<Container, Counts>,
	pub capabilities: HashMap<Container, Counts>,
	pub processes: usize,
}

impl Snapshot {
	pub fn from_entries<S, C>(syscalls: S, capabilities: C, processes: usize) -> Self
	where
		S: IntoIterator<Item = (ContainerKey, u64)>,
		C: IntoIterator<Item = (ContainerKey, u64)>,
	{
		Self {
			syscalls: group(syscalls),
			capabilities: group(capabilities),
			processes,
		}
	}
}

fn group(entries: impl IntoIterator<Item = (ContainerKey, u64)>) -> HashMap<Container, Counts> {
	let mut grouped: HashMap<Container, Counts> = HashMap::new();
	for (key, count) in entries {
		grouped.entry(key.container).or_default().insert(key.id, count);
	}
	grouped
}

/// The tables the exporter reads, taken out of the loaded object.
pub struct CounterMaps {
	syscalls: BpfHashMap<MapData, ContainerKey, u64>,
	capabilities: BpfHashMap<MapData, ContainerKey, u64>,
	processes: BpfHashMap<MapData, u32, Container>,
}

impl CounterMaps {
	pub fn take(ebpf: &mut Ebpf) -> Result<Self> {
		Ok(Self {
			syscalls: BpfHashMap::try_from(take_map(ebpf, "SYSCALL_COUNTS")?)?,
			capabilities: BpfHashMap::try_from(take_map(ebpf, "CAPABILITY_COUNTS")?)?,
			processes: BpfHashMap::try_from(take_map(ebpf, "PROCESSES")?)?,
		})
	}

	pub fn snapshot(&self) -> Snapshot {
		let syscalls = self.syscalls.iter().filter_map(log_skipped);
		let capabilities = self.capabilities.iter().filter_map(log_skipped);
		// pids come and go while iterating; a failed step only loses that entry
		let processes = self.processes.keys().filter_map(log_skipped).count();

		Snapshot::from_entries(syscalls, capabilities, processes)
	}
}

fn take_map(ebpf: &mut Ebpf, name: &'static str) -> Result<aya::maps::Map> {
	ebpf.take_map(name).ok_or(Error::EbpfMapNotFound(name))
}

fn log_skipped<T>(entry: core::result::Result<T, aya::maps::MapError>) -> Option<T> {
	match entry {
		Ok(entry) => Some(entry),
		Err(err) => {
			debug!("skipping map entry: {err}");
			None
		}
	}
}

// region:    --- Tests

#[cfg(test)]
mod tests {
	type Result<T> = core::result::Result<T, Box<dyn std::error::Error>>; // For tests.

	use super::*;

	#[test]
	fn snapshot_groups_by_container() -> Result<()> {
		// -- Setup & Fixtures
		let c1 = Container::from_name(b"c1");
		let c2 = Container::from_name(b"c2");
		let fx_syscalls = [
			(ContainerKey::new(c1, 0), 3),
			(ContainerKey::new(c1, 1), 1),
			(ContainerKey::new(c2, 0), 7),
		];
		let fx_caps = [(ContainerKey::new(c2, 13), 2)];

		// -- Exec
		let snapshot = Snapshot::from_entries(fx_syscalls, fx_caps, 4);

		// -- Check
		assert_eq!(snapshot.syscalls.len(), 2);
		assert_eq!(snapshot.syscalls[&c1], Counts::from([(0, 3), (1, 1)]));
		assert_eq!(snapshot.syscalls[&c2], Counts::from([(0, 7)]));
		assert_eq!(snapshot.capabilities[&c2], Counts::from([(13, 2)]));
		assert!(!snapshot.capabilities.contains_key(&c1));
		assert_eq!(snapshot.processes, 4);

		Ok(())
	}
}

// endregion: --- Tests
