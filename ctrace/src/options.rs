//! Turns tracefiles into container runtime options: a capability allowlist
//! and a seccomp profile.

use std::{
	collections::BTreeSet,
	fs,
	path::{Path, PathBuf},
};

use serde::Serialize;
use tracing::warn;

use crate::{tracefile::Tracefile, Result};

/// Every regular, non-hidden file below `paths`. Plain file arguments are
/// taken as is.
pub fn expand_paths(paths: &[PathBuf]) -> Vec<PathBuf> {
	let mut files = Vec::new();

	for path in paths {
		if path.is_dir() {
			walk(path, &mut files);
		} else if path.is_file() {
			files.push(path.clone());
		} else {
			warn!("skipping {}: no such file", path.display());
		}
	}

	files
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) {
	let Ok(read_dir) = fs::read_dir(dir) else {
		warn!("skipping {}: unreadable", dir.display());
		return;
	};

	let mut entries: Vec<_> = read_dir.flatten().map(|entry| entry.path()).collect();
	entries.sort();

	for path in entries {
		if path.is_dir() {
			walk(&path, files);
		} else if !is_hidden(&path) {
			files.push(path);
		}
	}
}

fn is_hidden(path: &Path) -> bool {
	path.file_name()
		.and_then(|name| name.to_str())
		.is_some_and(|name| name.starts_with('.'))
}

/// Union of all capabilities and syscalls in `files`.
pub fn union(files: &[PathBuf]) -> Result<(BTreeSet<String>, BTreeSet<String>)> {
	let mut capabilities = BTreeSet::new();
	let mut syscalls = BTreeSet::new();

	for file in files {
		let tracefile = Tracefile::open(file)?;
		capabilities.extend(tracefile.capabilities);
		syscalls.extend(tracefile.syscalls);
	}

	Ok((capabilities, syscalls))
}

pub fn cap_options(capabilities: &BTreeSet<String>) -> Vec<String> {
	let mut options = vec!["--cap-drop=ALL".to_string()];
	options.extend(capabilities.iter().map(|cap| format!("--cap-add={}", cap.to_uppercase())));
	options
}

// region:    --- Seccomp

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeccompProfile<'a> {
	default_action: &'static str,
	syscalls: [SeccompRule<'a>; 1],
}

#[derive(Debug, Serialize)]
pub struct SeccompRule<'a> {
	action: &'static str,
	names: Vec<&'a str>,
}

impl<'a> SeccompProfile<'a> {
	/// Denies everything but `syscalls`.
	pub fn allow(syscalls: &'a BTreeSet<String>) -> Self {
		Self {
			default_action: "SCMP_ACT_ERRNO",
			syscalls: [SeccompRule {
				action: "SCMP_ACT_ALLOW",
				names: syscalls.iter().map(String::as_str).collect(),
			}],
		}
	}

	pub fn render(&self) -> Result<String> {
		let mut buf = Vec::new();
		let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
		let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
		self.serialize(&mut ser)?;
		buf.push(b'\n');

		String::from_utf8(buf).map_err(crate::Error::custom_from_err)
	}
}

/// Writes the profile for `syscalls` to `path`, returns the runtime option
/// pointing at it.
pub fn seccomp_options(path: &Path, syscalls: &BTreeSet<String>) -> Result<Vec<String>> {
	let profile = SeccompProfile::allow(syscalls).render()?;
	fs::write(path, profile)?;

	let quoted = shell_escape::escape(path.to_string_lossy());
	Ok(vec![format!("--security-opt=seccomp:{quoted}")])
}

// endregion: --- Seccomp

// region:    --- Tests

#[cfg(test)]
mod tests {
	type Result<T> = core::result::Result<T, Box<dyn std::error::Error>>; // For tests.

	use super::*;

	fn set(items: &[&str]) -> BTreeSet<String> {
		items.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn options_expand_paths_recursive_skips_hidden() -> Result<()> {
		// -- Setup & Fixtures
		let root = tempfile::tempdir()?;
		fs::create_dir_all(root.path().join("a/b"))?;
		fs::write(root.path().join("a/one"), "")?;
		fs::write(root.path().join("a/b/two"), "")?;
		fs::write(root.path().join("a/.hidden"), "")?;
		let single = root.path().join("single");
		fs::write(&single, "")?;

		// -- Exec
		let files = expand_paths(&[root.path().join("a"), single.clone(), root.path().join("missing")]);

		// -- Check
		assert_eq!(
			files,
			vec![root.path().join("a/b/two"), root.path().join("a/one"), single]
		);

		Ok(())
	}

	#[test]
	fn options_cap_options_uppercase_sorted() -> Result<()> {
		// -- Exec
		let options = cap_options(&set(&["net_raw", "chown"]));

		// -- Check
		assert_eq!(options, ["--cap-drop=ALL", "--cap-add=CHOWN", "--cap-add=NET_RAW"]);
		assert_eq!(cap_options(&BTreeSet::new()), ["--cap-drop=ALL"]);

		Ok(())
	}

	#[test]
	fn options_seccomp_profile_layout() -> Result<()> {
		// -- Setup & Fixtures
		let syscalls = set(&["write", "read"]);

		// -- Exec
		let rendered = SeccompProfile::allow(&syscalls).render()?;

		// -- Check
		let expected = r#"{
    "defaultAction": "SCMP_ACT_ERRNO",
    "syscalls": [
        {
            "action": "SCMP_ACT_ALLOW",
            "names": [
                "read",
                "write"
            ]
        }
    ]
}
"#;
		assert_eq!(rendered, expected);

		Ok(())
	}

	#[test]
	fn options_seccomp_options_writes_and_quotes() -> Result<()> {
		// -- Setup & Fixtures
		let dir = tempfile::tempdir()?;
		let path = dir.path().join("my profile.json");

		// -- Exec
		let options = seccomp_options(&path, &set(&["read"]))?;

		// -- Check
		assert_eq!(options, [format!("--security-opt=seccomp:'{}'", path.display())]);
		let written: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
		assert_eq!(written["syscalls"][0]["names"][0], "read");

		Ok(())
	}

	#[test]
	fn options_union_merges_tracefiles() -> Result<()> {
		// -- Setup & Fixtures
		let dir = tempfile::tempdir()?;
		let a = dir.path().join("a");
		let b = dir.path().join("b");
		fs::write(&a, "ARCH\nx86_64\n\nCAPABILITIES\nkill\n\nSYSCALLS\nread\n")?;
		fs::write(&b, "ARCH\nx86_64\n\nCAPABILITIES\n\nSYSCALLS\nread\nwrite\n")?;

		// -- Exec
		let (caps, syscalls) = union(&[a, b])?;

		// -- Check
		assert_eq!(caps, set(&["kill"]));
		assert_eq!(syscalls, set(&["read", "write"]));

		Ok(())
	}
}

// endregion: --- Tests
