//! In-memory store for unit tests, a fresh one per test.

use core::cell::RefCell;
use std::collections::{HashMap, HashSet};

use crate::{
	Container, ContainerFlags, ContainerKey, Counter, PidLatch, ProcessTable, Store, StoreError, StoreResult,
};

const E2BIG: i64 = -7;

#[derive(Default)]
pub struct MemoryProcesses(RefCell<HashMap<u32, Container>>);

impl MemoryProcesses {
	pub fn len(&self) -> usize {
		self.0.borrow().len()
	}
}

impl ProcessTable for MemoryProcesses {
	fn lookup(&self, pid: u32) -> Option<Container> {
		self.0.borrow().get(&pid).copied()
	}

	fn insert(&self, pid: u32, container: &Container) -> StoreResult<()> {
		self.0.borrow_mut().insert(pid, *container);
		Ok(())
	}

	fn remove(&self, pid: u32) {
		self.0.borrow_mut().remove(&pid);
	}
}

/// Flag set; an optional entry limit mimics a full kernel map.
#[derive(Default)]
pub struct MemoryFlags {
	raised: RefCell<HashSet<Container>>,
	limit: Option<usize>,
}

impl MemoryFlags {
	pub fn with_limit(limit: usize) -> Self {
		Self {
			raised: RefCell::default(),
			limit: Some(limit),
		}
	}
}

impl ContainerFlags for MemoryFlags {
	fn raise(&self, container: &Container) -> StoreResult<()> {
		let mut raised = self.raised.borrow_mut();
		if !raised.contains(container) && self.limit.is_some_and(|limit| raised.len() >= limit) {
			return Err(StoreError(E2BIG));
		}
		raised.insert(*container);
		Ok(())
	}

	fn is_raised(&self, container: &Container) -> bool {
		self.raised.borrow().contains(container)
	}

	fn lower(&self, container: &Container) {
		self.raised.borrow_mut().remove(container);
	}
}

#[derive(Default)]
pub struct MemoryLatch(RefCell<HashMap<Container, u32>>);

impl PidLatch for MemoryLatch {
	fn latch(&self, container: &Container, pid: u32) -> StoreResult<()> {
		self.0.borrow_mut().entry(*container).or_insert(pid);
		Ok(())
	}

	fn latched(&self, container: &Container) -> Option<u32> {
		self.0.borrow().get(container).copied()
	}

	fn release(&self, container: &Container) {
		self.0.borrow_mut().remove(container);
	}
}

/// Counter table; an optional entry limit mimics a full kernel map.
#[derive(Default)]
pub struct MemoryCounter {
	counts: RefCell<HashMap<ContainerKey, u64>>,
	limit: Option<usize>,
}

impl MemoryCounter {
	pub fn with_limit(limit: usize) -> Self {
		Self {
			counts: RefCell::default(),
			limit: Some(limit),
		}
	}

	pub fn get(&self, key: &ContainerKey) -> u64 {
		self.counts.borrow().get(key).copied().unwrap_or(0)
	}

	pub fn len(&self) -> usize {
		self.counts.borrow().len()
	}
}

impl Counter for MemoryCounter {
	fn increment(&self, key: &ContainerKey) -> StoreResult<()> {
		let mut counts = self.counts.borrow_mut();
		if let Some(count) = counts.get_mut(key) {
			*count += 1;
			return Ok(());
		}

		if self.limit.is_some_and(|limit| counts.len() >= limit) {
			return Err(StoreError(E2BIG));
		}
		counts.insert(*key, 1);
		Ok(())
	}
}

#[derive(Default)]
pub struct MemoryStore {
	pub processes: MemoryProcesses,
	pub runtime_seen: MemoryFlags,
	pub not_finished: MemoryFlags,
	pub runtime_pids: MemoryLatch,
	pub syscalls: MemoryCounter,
	pub capabilities: MemoryCounter,
}

impl Store for MemoryStore {
	type Processes = MemoryProcesses;
	type Flags = MemoryFlags;
	type Latch = MemoryLatch;
	type Counts = MemoryCounter;

	fn processes(&self) -> &MemoryProcesses {
		&self.processes
	}

	fn runtime_seen(&self) -> &MemoryFlags {
		&self.runtime_seen
	}

	fn not_finished(&self) -> &MemoryFlags {
		&self.not_finished
	}

	fn runtime_pids(&self) -> &MemoryLatch {
		&self.runtime_pids
	}

	fn syscall_counts(&self) -> &MemoryCounter {
		&self.syscalls
	}

	fn capability_counts(&self) -> &MemoryCounter {
		&self.capabilities
	}
}
