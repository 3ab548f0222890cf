//! Initialization gate.
//!
//! The runtime prepares a container by re-exec'ing itself through helper
//! processes that carry a recognizable name, then hands the pid over to the
//! workload. The only cheap, purely event-driven sign that setup ended is a
//! helper-named process followed by a differently named one. Events seen
//! before that point belong to the runtime, not the workload.

use crate::{Container, ContainerFlags, PidLatch, StoreResult, TracerConfig, TASK_COMM_LEN};

/// The process an event originates from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Origin {
	pub pid: u32,
	pub comm: [u8; TASK_COMM_LEN],
}

impl Origin {
	pub fn new(pid: u32, comm: [u8; TASK_COMM_LEN]) -> Self {
		Self { pid, comm }
	}
}

/// Decides when a container's runtime initialization is over.
pub trait InitDetector {
	/// Initialization (re)starts for `container`.
	fn reset(&self, container: &Container) -> StoreResult<()>;

	/// Feeds one qualifying event of `container`.
	fn observe(&self, container: &Container, origin: &Origin) -> StoreResult<()>;

	/// Whether the workload of `container` is running.
	fn is_finished(&self, container: &Container) -> bool;
}

/// Runtime-helper handoff heuristic over two per-container flags.
pub struct RuntimeHandoff<'a, F: ContainerFlags> {
	runtime_seen: &'a F,
	not_finished: &'a F,
	config: &'a TracerConfig,
}

impl<'a, F: ContainerFlags> RuntimeHandoff<'a, F> {
	pub fn new(runtime_seen: &'a F, not_finished: &'a F, config: &'a TracerConfig) -> Self {
		Self {
			runtime_seen,
			not_finished,
			config,
		}
	}
}

impl<F: ContainerFlags> InitDetector for RuntimeHandoff<'_, F> {
	fn reset(&self, container: &Container) -> StoreResult<()> {
		self.not_finished.raise(container)
	}

	fn observe(&self, container: &Container, origin: &Origin) -> StoreResult<()> {
		if self.config.is_runtime_helper(&origin.comm) {
			self.runtime_seen.raise(container)?;
		} else if self.runtime_seen.is_raised(container) {
			self.not_finished.lower(container);
		}
		Ok(())
	}

	fn is_finished(&self, container: &Container) -> bool {
		if self.not_finished.is_raised(container) {
			return false;
		}
		self.runtime_seen.lower(container);
		true
	}
}

/// Extended mode: while a container initializes, admit the syscalls of the
/// one helper that first issued the finalize syscall.
///
/// Several helpers may run at once under the same name; only the latched pid
/// is attributed.
pub struct HelperLatch<'a, L: PidLatch> {
	latch: &'a L,
	config: &'a TracerConfig,
}

impl<'a, L: PidLatch> HelperLatch<'a, L> {
	pub fn new(latch: &'a L, config: &'a TracerConfig) -> Self {
		Self { latch, config }
	}

	pub fn reset(&self, container: &Container) {
		if self.config.trace_runtime {
			self.latch.release(container);
		}
	}

	pub fn admits(&self, container: &Container, origin: &Origin, syscall: u32) -> StoreResult<bool> {
		if !self.config.trace_runtime || !self.config.is_runtime_helper(&origin.comm) {
			return Ok(false);
		}

		if syscall == self.config.finalize_syscall {
			self.latch.latch(container, origin.pid)?;
		}

		Ok(self.latch.latched(container) == Some(origin.pid))
	}
}

// region:    --- Tests


// endregion: --- Tests
