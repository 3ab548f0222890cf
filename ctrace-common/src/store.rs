//! Storage seams of the tracer.
//!
//! Every table the handlers touch is reached through these traits. In the
//! kernel they are backed by BPF hash maps, which update a single key
//! atomically but give no atomicity across two keys, and readers see updates
//! eventually. Handlers are written against that model: no operation here
//! may assume another key changed in the same step.

use crate::{Container, ContainerKey};

/// Raw error code returned by a failed map update (e.g. `-E2BIG` on a full map).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StoreError(pub i64);

pub type StoreResult<T> = core::result::Result<T, StoreError>;

impl core::fmt::Display for StoreError {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		write!(f, "map update failed: {}", self.0)
	}
}

impl core::error::Error for StoreError {}

/// Kernel-global pid to container.
pub trait ProcessTable {
	fn lookup(&self, pid: u32) -> Option<Container>;

	/// Sets the mapping, overwriting any previous one.
	fn insert(&self, pid: u32, container: &Container) -> StoreResult<()>;

	/// Drops the mapping if present.
	fn remove(&self, pid: u32);
}

/// A set of containers, used for each boolean of the initialization state.
pub trait ContainerFlags {
	fn raise(&self, container: &Container) -> StoreResult<()>;
	fn is_raised(&self, container: &Container) -> bool;
	fn lower(&self, container: &Container);
}

/// At most one pid per container; the first writer wins.
pub trait PidLatch {
	/// Latches `pid` unless a pid is already latched for `container`.
	fn latch(&self, container: &Container, pid: u32) -> StoreResult<()>;
	fn latched(&self, container: &Container) -> Option<u32>;
	fn release(&self, container: &Container);
}

/// Occurrence counter keyed by (container, id).
///
/// `increment` starts absent keys at zero and adds one atomically per key.
/// Concurrent increments of the same key are all applied; no ordering is
/// promised between different keys.
pub trait Counter {
	fn increment(&self, key: &ContainerKey) -> StoreResult<()>;
}

/// Every table the handlers need, injected as one value.
pub trait Store {
	type Processes: ProcessTable;
	type Flags: ContainerFlags;
	type Latch: PidLatch;
	type Counts: Counter;

	fn processes(&self) -> &Self::Processes;
	fn runtime_seen(&self) -> &Self::Flags;
	fn not_finished(&self) -> &Self::Flags;
	fn runtime_pids(&self) -> &Self::Latch;
	fn syscall_counts(&self) -> &Self::Counts;
	fn capability_counts(&self) -> &Self::Counts;
}
