use core::sync::atomic::{AtomicU64, Ordering};

use aya_ebpf::{bindings::BPF_NOEXIST, macros::map, maps::HashMap};
use ctrace_common::{
	Container, ContainerFlags, ContainerKey, Counter, Name, PidLatch, ProcessTable, Store, StoreError, StoreResult,
	CONTAINER_MAX_ENTRIES, COUNTER_MAX_ENTRIES, PID_MAX_LIMIT,
};

const EEXIST: i64 = 17;

const SYSCALL_NAMES_MAX: u32 = 1024;
const CAPABILITY_NAMES_MAX: u32 = 64;

// region:    --- Maps

#[map]
pub static PROCESSES: HashMap<u32, Container> = HashMap::with_max_entries(PID_MAX_LIMIT, 0);

#[map]
pub static RUNTIME_SEEN: HashMap<Container, u8> = HashMap::with_max_entries(CONTAINER_MAX_ENTRIES, 0);

#[map]
pub static NOT_FINISHED: HashMap<Container, u8> = HashMap::with_max_entries(CONTAINER_MAX_ENTRIES, 0);

#[map]
pub static RUNTIME_PIDS: HashMap<Container, u32> = HashMap::with_max_entries(CONTAINER_MAX_ENTRIES, 0);

#[map]
pub static SYSCALL_COUNTS: HashMap<ContainerKey, u64> = HashMap::with_max_entries(COUNTER_MAX_ENTRIES, 0);

#[map]
pub static CAPABILITY_COUNTS: HashMap<ContainerKey, u64> = HashMap::with_max_entries(COUNTER_MAX_ENTRIES, 0);

/// Filled by userspace in debug mode only.
#[map]
pub static SYSCALL_NAMES: HashMap<u32, Name> = HashMap::with_max_entries(SYSCALL_NAMES_MAX, 0);

#[map]
pub static CAPABILITY_NAMES: HashMap<u32, Name> = HashMap::with_max_entries(CAPABILITY_NAMES_MAX, 0);

// endregion: --- Maps

// region:    --- Store

pub struct Processes(&'static HashMap<u32, Container>);

impl ProcessTable for Processes {
	fn lookup(&self, pid: u32) -> Option<Container> {
		unsafe { self.0.get(&pid) }.copied()
	}

	fn insert(&self, pid: u32, container: &Container) -> StoreResult<()> {
		self.0.insert(&pid, container, 0).map_err(StoreError)
	}

	fn remove(&self, pid: u32) {
		let _ = self.0.remove(&pid);
	}
}

pub struct Flags(&'static HashMap<Container, u8>);

impl ContainerFlags for Flags {
	fn raise(&self, container: &Container) -> StoreResult<()> {
		self.0.insert(container, &1, 0).map_err(StoreError)
	}

	fn is_raised(&self, container: &Container) -> bool {
		self.0.get_ptr(container).is_some()
	}

	fn lower(&self, container: &Container) {
		let _ = self.0.remove(container);
	}
}

pub struct Latch(&'static HashMap<Container, u32>);

impl PidLatch for Latch {
	fn latch(&self, container: &Container, pid: u32) -> StoreResult<()> {
		match self.0.insert(container, &pid, BPF_NOEXIST as u64) {
			Ok(()) => Ok(()),
			Err(e) if e == -EEXIST => Ok(()),
			Err(e) => Err(StoreError(e)),
		}
	}

	fn latched(&self, container: &Container) -> Option<u32> {
		unsafe { self.0.get(container) }.copied()
	}

	fn release(&self, container: &Container) {
		let _ = self.0.remove(container);
	}
}

pub struct Counts(&'static HashMap<ContainerKey, u64>);

impl Counts {
	fn add_one(&self, key: &ContainerKey) -> bool {
		match self.0.get_ptr_mut(key) {
			Some(count) => {
				unsafe { AtomicU64::from_ptr(count) }.fetch_add(1, Ordering::Relaxed);
				true
			}
			None => false,
		}
	}
}

impl Counter for Counts {
	fn increment(&self, key: &ContainerKey) -> StoreResult<()> {
		if self.add_one(key) {
			return Ok(());
		}

		match self.0.insert(key, &1, BPF_NOEXIST as u64) {
			Ok(()) => Ok(()),
			// another CPU created the entry first
			Err(_) if self.add_one(key) => Ok(()),
			Err(e) => Err(StoreError(e)),
		}
	}
}

/// Kernel maps behind the handler seams.
pub struct MapStore {
	processes: Processes,
	runtime_seen: Flags,
	not_finished: Flags,
	runtime_pids: Latch,
	syscalls: Counts,
	capabilities: Counts,
}

impl MapStore {
	pub fn new() -> Self {
		Self {
			processes: Processes(&PROCESSES),
			runtime_seen: Flags(&RUNTIME_SEEN),
			not_finished: Flags(&NOT_FINISHED),
			runtime_pids: Latch(&RUNTIME_PIDS),
			syscalls: Counts(&SYSCALL_COUNTS),
			capabilities: Counts(&CAPABILITY_COUNTS),
		}
	}
}

impl Store for MapStore {
	type Processes = Processes;
	type Flags = Flags;
	type Latch = Latch;
	type Counts = Counts;

	fn processes(&self) -> &Processes {
		&self.processes
	}

	fn runtime_seen(&self) -> &Flags {
		&self.runtime_seen
	}

	fn not_finished(&self) -> &Flags {
		&self.not_finished
	}

	fn runtime_pids(&self) -> &Latch {
		&self.runtime_pids
	}

	fn syscall_counts(&self) -> &Counts {
		&self.syscalls
	}

	fn capability_counts(&self) -> &Counts {
		&self.capabilities
	}
}

// endregion: --- Store
