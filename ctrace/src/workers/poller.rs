use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
	error::Result,
	snapshot::{CounterMaps, Snapshot},
	trx::Tx,
};

/// Reads the counter tables on a fixed interval and forwards snapshots.
pub struct PollWorker {
	maps: CounterMaps,
	interval: Duration,
	tx: Tx<Snapshot>,
	shutdown: CancellationToken,
}

impl PollWorker {
	pub fn start(maps: CounterMaps, interval: Duration, tx: Tx<Snapshot>, shutdown: CancellationToken) -> Result<Self> {
		Ok(PollWorker {
			maps,
			interval,
			tx,
			shutdown,
		})
	}

	/// Polls until cancelled, then sends one last snapshot so the final
	/// interval is not lost. Dropping `tx` on return ends the consumer.
	pub async fn run(self) -> Result<()> {
		let mut ticker = tokio::time::interval(self.interval);
		ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

		loop {
			tokio::select! {
				_ = self.shutdown.cancelled() => {
					break;
				}

				_ = ticker.tick() => {
					self.poll().await?;
				}
			}
		}

		self.poll().await?;
		debug!("poll worker stopped");
		Ok(())
	}

	async fn poll(&self) -> Result<()> {
		let snapshot = self.maps.snapshot();
		debug!(
			"snapshot: {} processes, {} containers",
			snapshot.processes,
			snapshot.syscalls.len()
		);
		self.tx.send(snapshot).await
	}
}
