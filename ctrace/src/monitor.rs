use std::collections::{BTreeSet, HashMap};

use ctrace_common::Container;

use crate::snapshot::{Counts, Snapshot};

/// Ids a container used since the previous snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerDelta {
	pub container: Container,
	pub syscalls: BTreeSet<u32>,
	pub capabilities: BTreeSet<u32>,
}

impl ContainerDelta {
	pub fn is_empty(&self) -> bool {
		self.syscalls.is_empty() && self.capabilities.is_empty()
	}
}

/// Tracks the last seen counts and reports what moved.
#[derive(Default)]
pub struct ContainerMonitor {
	last_syscalls: HashMap<Container, Counts>,
	last_capabilities: HashMap<Container, Counts>,
}

impl ContainerMonitor {
	pub fn new() -> Self {
		Self::default()
	}

	/// Feeds the next snapshot; returns, per container with activity, the ids
	/// that are new or whose count changed. Ordered by container.
	pub fn update(&mut self, snapshot: Snapshot) -> Vec<ContainerDelta> {
		let mut syscalls = changed(&self.last_syscalls, &snapshot.syscalls);
		let mut capabilities = changed(&self.last_capabilities, &snapshot.capabilities);

		let containers: BTreeSet<Container> = syscalls.keys().chain(capabilities.keys()).copied().collect();
		let deltas = containers
			.into_iter()
			.map(|container| ContainerDelta {
				container,
				syscalls: syscalls.remove(&container).unwrap_or_default(),
				capabilities: capabilities.remove(&container).unwrap_or_default(),
			})
			.filter(|delta| !delta.is_empty())
			.collect();

		self.last_syscalls = snapshot.syscalls;
		self.last_capabilities = snapshot.capabilities;

		deltas
	}
}

fn changed(old: &HashMap<Container, Counts>, new: &HashMap<Container, Counts>) -> HashMap<Container, BTreeSet<u32>> {
	new.iter()
		.map(|(container, counts)| {
			let previous = old.get(container);
			let ids = counts
				.iter()
				.filter(|&(id, count)| previous.and_then(|p| p.get(id)) != Some(count))
				.map(|(id, _)| *id)
				.collect();
			(*container, ids)
		})
		.collect()
}

// region:    --- Tests


// endregion: --- Tests
