// region:    --- Modules
mod cli;
mod commands;
mod error;
mod loader;
mod lookup;
mod monitor;
mod options;
mod seed;
mod snapshot;
mod supervisor;
mod tracefile;
mod trx;
mod workers;
// endregion: --- Modules

use std::{path::Path, process::ExitCode};

use crate::{
	cli::args::{Cli, Command},
	commands::{run_diff, run_lookup, run_options, run_trace},
	lookup::{Capabilities, Syscalls},
};

pub use self::error::{Error, Result};
use clap::Parser;
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<ExitCode> {
	let args = Cli::parse();
	let _log_guard = init_tracing(args.log_file.as_deref())?;

	match args.command {
		Command::Trace(trace_args) => {
			bump_memlock();
			run_trace(trace_args).await
		}
		Command::Syscall { query } => Ok(run_lookup(&Syscalls, query.as_deref())),
		Command::Capability { query } => Ok(run_lookup(&Capabilities, query.as_deref())),
		Command::Diff { first, second } => run_diff(&first, &second),
		Command::Options { paths, seccomp_profile } => run_options(&paths, &seccomp_profile),
	}
}

/// Console logs go to stderr, stdout is reserved for command output. The
/// returned guard flushes the log file when dropped.
fn init_tracing(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
	let (file_layer, guard) = match log_file {
		Some(path) => {
			let file_name = path
				.file_name()
				.ok_or_else(|| Error::custom(format!("invalid log file {}", path.display())))?;
			let dir = path.parent().filter(|dir| !dir.as_os_str().is_empty()).unwrap_or(Path::new("."));
			let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
			let layer = fmt::layer().with_target(false).with_ansi(false).with_writer(writer);
			(Some(layer), Some(guard))
		}
		None => (None, None),
	};

	tracing_subscriber::registry()
		.with(EnvFilter::from_default_env())
		.with(fmt::layer().with_target(false).with_writer(std::io::stderr))
		.with(file_layer)
		.init();

	Ok(guard)
}

fn bump_memlock() {
	// Bump the memlock rlimit. This is needed for older kernels that don't use the
	// new memcg based accounting, see https://lwn.net/Articles/837122/
	let rlim = libc::rlimit {
		rlim_cur: libc::RLIM_INFINITY,
		rlim_max: libc::RLIM_INFINITY,
	};
	let ret = unsafe { libc::setrlimit(libc::RLIMIT_MEMLOCK, &rlim) };
	if ret != 0 {
		debug!("remove limit on locked memory failed, ret is: {ret}");
	}
}
