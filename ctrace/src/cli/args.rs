use std::path::PathBuf;

use clap::{Parser, Subcommand};
use humantime::Duration;

#[derive(Parser, Debug)]
#[command(name = "ctrace", version, about = "Records the syscalls and capabilities containers use")]
pub struct Cli {
	/// Also write logs to this file.
	#[arg(long, global = true)]
	pub log_file: Option<PathBuf>,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Trace running and new containers into tracefiles.
	Trace(TraceArgs),

	/// Look up syscall names and numbers.
	Syscall {
		/// A number prints its name, a name prints its number. Lists all when omitted.
		query: Option<String>,
	},

	/// Look up capability names and numbers.
	Capability {
		/// A number prints its name, a name (`cap_` optional) prints its number.
		query: Option<String>,
	},

	/// Compare two tracefiles.
	Diff { first: PathBuf, second: PathBuf },

	/// Print runtime options that restrict a container to its tracefiles.
	Options {
		/// Tracefiles, or directories searched recursively.
		#[arg(required = true)]
		paths: Vec<PathBuf>,

		/// Where to write the generated seccomp profile.
		#[arg(long)]
		seccomp_profile: PathBuf,
	},
}

#[derive(clap::Args, Debug)]
pub struct TraceArgs {
	/// Log every counted event from the kernel side.
	#[arg(long)]
	pub debug: bool,

	/// Also count the syscalls of the runtime helper that sets up the container.
	#[arg(long)]
	pub trace_runtime: bool,

	/// Task name prefix of the runtime's setup helpers.
	#[arg(long, default_value = "runc:")]
	pub runtime_prefix: String,

	/// How often the counter tables are read (e.g., 500ms, 2s).
	#[arg(long, default_value = "1s")]
	pub interval: Duration,

	#[arg(long, default_value = ".")]
	pub output_dir: PathBuf,

	/// Only write tracefiles for containers whose id starts with one of these.
	#[arg(long = "container")]
	pub containers: Vec<String>,

	#[arg(long, help = "Time duration (e.g., 20s, 5m, 1h). Runs until interrupted when omitted")]
	pub time: Option<Duration>,

	/// Do not pick up containers that were running before the tracer started.
	#[arg(long)]
	pub no_seed: bool,
}

// region:    --- Tests

#[cfg(test)]
mod tests {
	type Result<T> = core::result::Result<T, Box<dyn std::error::Error>>; // For tests.

	use super::*;

	#[test]
	fn args_trace_defaults() -> Result<()> {
		// -- Exec
		let cli = Cli::try_parse_from(["ctrace", "trace"])?;

		// -- Check
		let Command::Trace(args) = cli.command else {
			return Err("expected trace".into());
		};
		assert!(!args.debug);
		assert!(!args.trace_runtime);
		assert_eq!(args.runtime_prefix, "runc:");
		assert_eq!(*args.interval, std::time::Duration::from_secs(1));
		assert_eq!(args.output_dir, PathBuf::from("."));
		assert!(args.containers.is_empty());
		assert!(args.time.is_none());

		Ok(())
	}

	#[test]
	fn args_trace_flags() -> Result<()> {
		// -- Exec
		let cli = Cli::try_parse_from([
			"ctrace",
			"--log-file",
			"/tmp/ctrace.log",
			"trace",
			"--debug",
			"--interval",
			"250ms",
			"--container",
			"abc",
			"--container",
			"def",
			"--time",
			"5m",
		])?;

		// -- Check
		assert_eq!(cli.log_file, Some(PathBuf::from("/tmp/ctrace.log")));
		let Command::Trace(args) = cli.command else {
			return Err("expected trace".into());
		};
		assert!(args.debug);
		assert_eq!(*args.interval, std::time::Duration::from_millis(250));
		assert_eq!(args.containers, ["abc", "def"]);
		assert_eq!(args.time.map(|t| *t), Some(std::time::Duration::from_secs(300)));

		Ok(())
	}

	#[test]
	fn args_options_requires_paths() -> Result<()> {
		// -- Check
		assert!(Cli::try_parse_from(["ctrace", "options", "--seccomp-profile", "p.json"]).is_err());
		assert!(Cli::try_parse_from(["ctrace", "options", "dir", "--seccomp-profile", "p.json"]).is_ok());

		Ok(())
	}
}

// endregion: --- Tests
