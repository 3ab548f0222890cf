use std::{path::Path, process::ExitCode, time::Duration};

use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{
	cli::args::TraceArgs,
	loader::{load, load_hooks, tracer_config},
	seed::{seed, CGROUP_ROOT},
	snapshot::{CounterMaps, Snapshot},
	supervisor::Supervisor,
	trx::new_channel,
	workers::{PollWorker, TracefileWorker},
	Result,
};

pub async fn run_trace(args: TraceArgs) -> Result<ExitCode> {
	let config = tracer_config(args.debug, args.trace_runtime, &args.runtime_prefix);
	let mut ebpf = load(&config)?;

	// Hooks go live first so no fork slips between the scan and the attach.
	load_hooks(&mut ebpf)?;
	if !args.no_seed {
		seed(&mut ebpf, Path::new(CGROUP_ROOT))?;
	}

	let maps = CounterMaps::take(&mut ebpf)?;
	let (snapshot_tx, snapshot_rx) = new_channel::<Snapshot>("snapshot");

	let mut supervisor = Supervisor::new();

	let poll_worker = PollWorker::start(maps, args.interval.into(), snapshot_tx, supervisor.token())?;
	let tracefile_worker = TracefileWorker::start(snapshot_rx, args.output_dir.clone(), args.containers)?;
	supervisor.spawn(poll_worker.run());
	supervisor.spawn(tracefile_worker.run());

	info!(
		"tracing into {} (interval {})",
		args.output_dir.display(),
		args.interval
	);

	wait_for_stop(supervisor.token(), args.time.map(Into::into)).await?;

	supervisor.shutdown().await?;

	// Programs stay attached until the object is dropped.
	drop(ebpf);

	Ok(ExitCode::SUCCESS)
}

/// Returns on Ctrl-C, SIGTERM, once `time` elapsed, or when a worker gave up.
async fn wait_for_stop(shutdown: CancellationToken, time: Option<Duration>) -> Result<()> {
	let mut terminate = signal(SignalKind::terminate())?;
	let deadline = async {
		match time {
			Some(time) => tokio::time::sleep(time).await,
			None => std::future::pending().await,
		}
	};

	tokio::select! {
		res = tokio::signal::ctrl_c() => {
			res?;
			info!("interrupted");
		}
		_ = terminate.recv() => {
			info!("terminated");
		}
		_ = deadline => {
			info!("trace time elapsed");
		}
		_ = shutdown.cancelled() => {}
	}

	Ok(())
}
