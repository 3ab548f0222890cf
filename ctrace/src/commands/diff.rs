use std::{path::Path, process::ExitCode};

use crate::{
	tracefile::{Tracefile, TracefileDiff},
	Result,
};

use super::no_tracefile;

/// Exit status 0 when both tracefiles match, 1 when they differ.
pub fn run_diff(first: &Path, second: &Path) -> Result<ExitCode> {
	let first = Tracefile::open(first)?;
	let second = Tracefile::open(second)?;

	if !first.exists() && !second.exists() {
		return Ok(no_tracefile());
	}
	if first == second {
		return Ok(ExitCode::SUCCESS);
	}

	println!("{}", TracefileDiff::new(&first, &second));
	Ok(ExitCode::FAILURE)
}
