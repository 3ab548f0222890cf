//! Seeds the process table with containers that were already running when
//! the tracer started. Their attach events happened before the hooks existed.

use std::{
	fs,
	path::{Path, PathBuf},
};

use aya::{
	maps::{HashMap as BpfHashMap, MapData},
	Ebpf,
};
use ctrace_common::{Container, CONTAINER_ID_LEN};
use tracing::{debug, info, warn};

use crate::{Error, Result};

pub const CGROUP_ROOT: &str = "/sys/fs/cgroup";

/// Files listing the member threads of a resource group, v2 first.
const THREAD_FILES: [&str; 2] = ["cgroup.threads", "tasks"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedEntry {
	pub container: Container,
	pub pids: Vec<u32>,
}

/// Whether a directory name holds a full container id, e.g. `<id>` under
/// cgroup v1 or `docker-<id>.scope` under the systemd driver.
pub fn carries_container_id(name: &str) -> bool {
	let mut run = 0;
	for c in name.chars() {
		if c.is_ascii_hexdigit() {
			run += 1;
			if run == CONTAINER_ID_LEN {
				return true;
			}
		} else {
			run = 0;
		}
	}
	false
}

/// Walks `root` and collects every container group with its threads.
/// Symlinks are not followed; unreadable directories are skipped.
pub fn scan(root: &Path) -> Vec<SeedEntry> {
	let mut entries = Vec::new();
	let mut pending: Vec<PathBuf> = vec![root.to_path_buf()];

	while let Some(dir) = pending.pop() {
		let read_dir = match fs::read_dir(&dir) {
			Ok(read_dir) => read_dir,
			Err(err) => {
				debug!("cannot read {}: {err}", dir.display());
				continue;
			}
		};

		for entry in read_dir.flatten() {
			let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
			if !is_dir {
				continue;
			}
			let path = entry.path();

			if let Some(name) = entry.file_name().to_str() {
				if carries_container_id(name) {
					let pids = read_threads(&path);
					if !pids.is_empty() {
						entries.push(SeedEntry {
							container: Container::from_group_name(name.as_bytes()),
							pids,
						});
					}
				}
			}

			pending.push(path);
		}
	}

	entries.sort_by(|a, b| a.container.cmp(&b.container));
	entries
}

fn read_threads(dir: &Path) -> Vec<u32> {
	for file in THREAD_FILES {
		if let Ok(content) = fs::read_to_string(dir.join(file)) {
			return content.lines().filter_map(|line| line.trim().parse().ok()).collect();
		}
	}
	Vec::new()
}

/// Inserts the scanned threads into `PROCESSES`. Seeded containers have no
/// pending initialization, so their events count right away.
pub fn seed(ebpf: &mut Ebpf, root: &Path) -> Result<usize> {
	let map = ebpf.map_mut("PROCESSES").ok_or(Error::EbpfMapNotFound("PROCESSES"))?;
	let mut processes: BpfHashMap<&mut MapData, u32, Container> = BpfHashMap::try_from(map)?;

	let mut seeded = 0;
	for entry in scan(root) {
		for pid in &entry.pids {
			match processes.insert(pid, entry.container, 0) {
				Ok(()) => seeded += 1,
				Err(err) => warn!("cannot seed pid {pid} of {}: {err}", entry.container),
			}
		}
		debug!("seeded {} ({} threads)", entry.container, entry.pids.len());
	}

	info!("seeded {seeded} running threads");
	Ok(seeded)
}

// region:    --- Tests


// endregion: --- Tests
