//! Event handler sequencing.
//!
//! The kernel entry points read their arguments, build an [`Origin`] for the
//! current task and hand over to a [`Tracer`]. Everything below that line is
//! plain logic over a [`Store`] and runs the same in unit tests.

use crate::{
	CapabilitySet, Container, ContainerKey, Counter, Credentials, HelperLatch, InitDetector, Origin, ProcessTable,
	RuntimeHandoff, Store, StoreResult, TracerConfig,
};

/// What a handler did with one event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
	/// A pid now maps to this container.
	Tracked(Container),
	/// The process belongs to no tracked container; the event is ignored.
	Untracked,
	/// A pid mapping was dropped (or was already gone).
	Released,
	/// The container runtime is still setting up; the event is ignored.
	Initializing,
	/// The process lacks the capability it was checked for.
	NotHeld,
	/// The event was counted under this key.
	Counted(ContainerKey),
}

pub struct Tracer<'a, S: Store> {
	store: &'a S,
	config: &'a TracerConfig,
}

impl<'a, S: Store> Tracer<'a, S> {
	pub fn new(store: &'a S, config: &'a TracerConfig) -> Self {
		Self { store, config }
	}

	fn gate(&self) -> RuntimeHandoff<'a, S::Flags> {
		RuntimeHandoff::new(self.store.runtime_seen(), self.store.not_finished(), self.config)
	}

	fn helpers(&self) -> HelperLatch<'a, S::Latch> {
		HelperLatch::new(self.store.runtime_pids(), self.config)
	}

	pub fn resolve(&self, pid: u32) -> Option<Container> {
		self.store.processes().lookup(pid)
	}

	/// A task joined the cgroup named `name`. Runtime scope names
	/// (`docker-<id>.scope`) are reduced to the container id.
	pub fn on_attach(&self, name: &[u8], pid: u32) -> StoreResult<Outcome> {
		let container = Container::from_group_name(name);

		// The pid moves to `container` even when the gate state cannot be
		// stored; the gate error is reported after the move.
		let reset = self.gate().reset(&container);
		self.helpers().reset(&container);
		self.store.processes().insert(pid, &container)?;
		reset?;

		Ok(Outcome::Tracked(container))
	}

	pub fn on_fork(&self, parent: u32, child: u32) -> StoreResult<Outcome> {
		let Some(container) = self.resolve(parent) else {
			return Ok(Outcome::Untracked);
		};

		self.store.processes().insert(child, &container)?;
		Ok(Outcome::Tracked(container))
	}

	pub fn on_exit(&self, pid: u32) -> StoreResult<Outcome> {
		self.store.processes().remove(pid);
		Ok(Outcome::Released)
	}

	pub fn on_syscall(&self, origin: &Origin, syscall: u32) -> StoreResult<Outcome> {
		let Some(container) = self.resolve(origin.pid) else {
			return Ok(Outcome::Untracked);
		};

		if !self.finished(&container, origin)? && !self.helpers().admits(&container, origin, syscall)? {
			return Ok(Outcome::Initializing);
		}

		let key = ContainerKey::new(container, syscall);
		self.store.syscall_counts().increment(&key)?;
		Ok(Outcome::Counted(key))
	}

	pub fn on_capability(&self, origin: &Origin, capability: u32, creds: &impl Credentials) -> StoreResult<Outcome> {
		let Some(container) = self.resolve(origin.pid) else {
			return Ok(Outcome::Untracked);
		};

		if !self.finished(&container, origin)? {
			return Ok(Outcome::Initializing);
		}

		if !is_held(&creds.effective(), capability) {
			return Ok(Outcome::NotHeld);
		}

		let key = ContainerKey::new(container, capability);
		self.store.capability_counts().increment(&key)?;
		Ok(Outcome::Counted(key))
	}

	fn finished(&self, container: &Container, origin: &Origin) -> StoreResult<bool> {
		let gate = self.gate();
		gate.observe(container, origin)?;
		Ok(gate.is_finished(container))
	}
}

fn is_held(effective: &CapabilitySet, capability: u32) -> bool {
	effective.contains(capability)
}

// region:    --- Tests


// endregion: --- Tests
