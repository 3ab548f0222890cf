use std::path::PathBuf;

use tracing::{debug, info};

use crate::{
	error::Result,
	lookup::{Capabilities, Lookup, Syscalls},
	monitor::{ContainerDelta, ContainerMonitor},
	snapshot::Snapshot,
	tracefile::Tracefile,
	trx::Rx,
};

/// Merges what each container newly used into its tracefile under
/// `output_dir`.
pub struct TracefileWorker {
	rx: Rx<Snapshot>,
	output_dir: PathBuf,
	prefixes: Vec<String>,
	monitor: ContainerMonitor,
}

impl TracefileWorker {
	/// `prefixes` restricts output to containers whose id starts with one of
	/// them; empty means all containers.
	pub fn start(rx: Rx<Snapshot>, output_dir: PathBuf, prefixes: Vec<String>) -> Result<Self> {
		Ok(TracefileWorker {
			rx,
			output_dir,
			prefixes,
			monitor: ContainerMonitor::new(),
		})
	}

	/// Runs until the poller hangs up.
	pub async fn run(mut self) -> Result<()> {
		while let Ok(snapshot) = self.rx.recv().await {
			let processes = snapshot.processes;
			let deltas = self.monitor.update(snapshot);

			for delta in deltas.iter().filter(|d| self.selected(d)) {
				self.record(delta)?;
			}

			debug!("{processes} traced processes, {} active containers", deltas.len());
		}

		debug!("{} closed, tracefile worker stopped", self.rx.name());
		Ok(())
	}

	fn selected(&self, delta: &ContainerDelta) -> bool {
		if self.prefixes.is_empty() {
			return true;
		}
		let id = delta.container.to_string();
		self.prefixes.iter().any(|prefix| id.starts_with(prefix.as_str()))
	}

	fn record(&self, delta: &ContainerDelta) -> Result<()> {
		let path = self.output_dir.join(delta.container.to_string());
		let mut tracefile = Tracefile::open(&path)?;

		let capabilities = delta.capabilities.iter().map(|id| Capabilities.display_name(*id));
		let syscalls = delta.syscalls.iter().map(|id| Syscalls.display_name(*id));
		if tracefile.add(capabilities, syscalls) {
			tracefile.write()?;
			info!(
				"{}: {} capabilities, {} syscalls",
				tracefile.path().display(),
				tracefile.capabilities.len(),
				tracefile.syscalls.len()
			);
		}

		Ok(())
	}
}

// region:    --- Tests


// endregion: --- Tests
