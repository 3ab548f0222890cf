use std::{
	path::{Path, PathBuf},
	process::ExitCode,
};

use crate::{
	options::{cap_options, expand_paths, seccomp_options, union},
	Result,
};

use super::no_tracefile;

pub fn run_options(paths: &[PathBuf], seccomp_profile: &Path) -> Result<ExitCode> {
	let files = expand_paths(paths);
	if files.is_empty() {
		return Ok(no_tracefile());
	}

	let (capabilities, syscalls) = union(&files)?;

	let mut options = cap_options(&capabilities);
	options.extend(seccomp_options(seccomp_profile, &syscalls)?);
	println!("{}", options.join(" "));

	Ok(ExitCode::SUCCESS)
}
