//! Tracefile: the per-container allowlist artifact.
//!
//! ```text
//! ARCH
//! x86_64
//!
//! CAPABILITIES
//! net_raw
//!
//! SYSCALLS
//! read
//! ```
//!
//! An all-uppercase line opens a section. Blank lines and unknown sections
//! are ignored on read.

use std::{
	collections::BTreeSet,
	fmt, fs,
	path::{Path, PathBuf},
};

use crate::Result;

const SECTION_ARCH: &str = "ARCH";
const SECTION_CAPABILITIES: &str = "CAPABILITIES";
const SECTION_SYSCALLS: &str = "SYSCALLS";

#[derive(Debug, Clone)]
pub struct Tracefile {
	path: PathBuf,
	pub arch: String,
	pub capabilities: BTreeSet<String>,
	pub syscalls: BTreeSet<String>,
}

impl Tracefile {
	/// An empty tracefile for the host architecture, not yet on disk.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			arch: std::env::consts::ARCH.to_string(),
			capabilities: BTreeSet::new(),
			syscalls: BTreeSet::new(),
		}
	}

	/// Reads the tracefile at `path`, or starts an empty one if there is none.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
		let mut tracefile = Self::new(path);
		if tracefile.exists() {
			let content = fs::read_to_string(&tracefile.path)?;
			tracefile.parse(&content);
		}
		Ok(tracefile)
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn exists(&self) -> bool {
		self.path.is_file()
	}

	pub fn parse(&mut self, content: &str) {
		let mut section: Option<&str> = None;

		for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
			if is_section_header(line) {
				section = Some(line);
				continue;
			}

			match section {
				Some(SECTION_ARCH) => self.arch = line.to_string(),
				Some(SECTION_CAPABILITIES) => {
					self.capabilities.insert(line.to_string());
				}
				Some(SECTION_SYSCALLS) => {
					self.syscalls.insert(line.to_string());
				}
				_ => {}
			}
		}
	}

	/// Merges entries in; returns whether anything new was added.
	pub fn add<C, S>(&mut self, capabilities: C, syscalls: S) -> bool
	where
		C: IntoIterator<Item = String>,
		S: IntoIterator<Item = String>,
	{
		let before = self.capabilities.len() + self.syscalls.len();
		self.capabilities.extend(capabilities);
		self.syscalls.extend(syscalls);
		self.capabilities.len() + self.syscalls.len() != before
	}

	/// Writes the tracefile, creating parent directories as needed.
	pub fn write(&self) -> Result<()> {
		if let Some(dir) = self.path.parent() {
			fs::create_dir_all(dir)?;
		}
		fs::write(&self.path, format!("{self}\n"))?;
		Ok(())
	}
}

impl PartialEq for Tracefile {
	fn eq(&self, other: &Self) -> bool {
		self.arch == other.arch && self.capabilities == other.capabilities && self.syscalls == other.syscalls
	}
}

impl Eq for Tracefile {}

impl fmt::Display for Tracefile {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut lines: Vec<&str> = vec![SECTION_ARCH, self.arch.as_str(), "", SECTION_CAPABILITIES];
		lines.extend(self.capabilities.iter().map(String::as_str));
		lines.extend(["", SECTION_SYSCALLS]);
		lines.extend(self.syscalls.iter().map(String::as_str));

		f.write_str(&lines.join("\n"))
	}
}

fn is_section_header(line: &str) -> bool {
	line.chars().any(char::is_alphabetic) && !line.chars().any(char::is_lowercase)
}

// region:    --- Diff

/// Section-wise difference of two tracefiles: `-name` only in the first,
/// `+name` only in the second.
pub struct TracefileDiff<'a> {
	first: &'a Tracefile,
	second: &'a Tracefile,
}

impl<'a> TracefileDiff<'a> {
	pub fn new(first: &'a Tracefile, second: &'a Tracefile) -> Self {
		Self { first, second }
	}

	fn sections(&self) -> Vec<(&'static str, Vec<String>)> {
		let mut sections = Vec::new();

		if self.first.arch != self.second.arch {
			let first = BTreeSet::from([self.first.arch.clone()]);
			let second = BTreeSet::from([self.second.arch.clone()]);
			sections.push((SECTION_ARCH, set_diff(&first, &second)));
		}
		if self.first.capabilities != self.second.capabilities {
			sections.push((
				SECTION_CAPABILITIES,
				set_diff(&self.first.capabilities, &self.second.capabilities),
			));
		}
		if self.first.syscalls != self.second.syscalls {
			sections.push((SECTION_SYSCALLS, set_diff(&self.first.syscalls, &self.second.syscalls)));
		}

		sections
	}
}

impl fmt::Display for TracefileDiff<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let rendered: Vec<String> = self
			.sections()
			.into_iter()
			.map(|(header, entries)| {
				let mut lines = vec![header.to_string()];
				lines.extend(entries);
				lines.join("\n")
			})
			.collect();

		f.write_str(&rendered.join("\n\n"))
	}
}

fn set_diff(first: &BTreeSet<String>, second: &BTreeSet<String>) -> Vec<String> {
	let removed = first.difference(second).map(|e| format!("-{e}"));
	let added = second.difference(first).map(|e| format!("+{e}"));
	removed.chain(added).collect()
}

// endregion: --- Diff

// region:    --- Tests

#[cfg(test)]
mod tests {
	type Result<T> = core::result::Result<T, Box<dyn std::error::Error>>; // For tests.

	use super::*;

	const FX_TRACEFILE: &str = "ARCH\nx86_64\n\nCAPABILITIES\nnet_raw\nchown\n\nSYSCALLS\nwrite\nread\n";

	fn tracefile(caps: &[&str], syscalls: &[&str]) -> Tracefile {
		let mut tf = Tracefile::new("unused");
		tf.arch = "x86_64".to_string();
		tf.add(
			caps.iter().map(|s| s.to_string()),
			syscalls.iter().map(|s| s.to_string()),
		);
		tf
	}

	#[test]
	fn tracefile_parse_sections() -> Result<()> {
		// -- Setup & Fixtures
		let mut tf = Tracefile::new("unused");

		// -- Exec
		tf.parse(FX_TRACEFILE);

		// -- Check
		assert_eq!(tf.arch, "x86_64");
		assert_eq!(tf.capabilities, BTreeSet::from(["chown".to_string(), "net_raw".to_string()]));
		assert_eq!(tf.syscalls, BTreeSet::from(["read".to_string(), "write".to_string()]));

		Ok(())
	}

	#[test]
	fn tracefile_parse_tolerates_noise() -> Result<()> {
		// -- Setup & Fixtures
		let mut tf = Tracefile::new("unused");
		let fx_content = "\n\n  SYSCALLS  \n\n read \n\nNOTES\nsomething\n\nCAPABILITIES\n\nkill\n";

		// -- Exec
		tf.parse(fx_content);

		// -- Check
		assert_eq!(tf.syscalls, BTreeSet::from(["read".to_string()]));
		assert_eq!(tf.capabilities, BTreeSet::from(["kill".to_string()]));

		Ok(())
	}

	#[test]
	fn tracefile_render_sorted() -> Result<()> {
		// -- Setup & Fixtures
		let tf = tracefile(&["net_raw", "chown"], &["write", "read"]);

		// -- Exec
		let rendered = tf.to_string();

		// -- Check
		assert_eq!(rendered, "ARCH\nx86_64\n\nCAPABILITIES\nchown\nnet_raw\n\nSYSCALLS\nread\nwrite");

		Ok(())
	}

	#[test]
	fn tracefile_render_empty_sections() -> Result<()> {
		// -- Setup & Fixtures
		let tf = tracefile(&[], &[]);

		// -- Check
		assert_eq!(tf.to_string(), "ARCH\nx86_64\n\nCAPABILITIES\n\nSYSCALLS");

		Ok(())
	}

	#[test]
	fn tracefile_equality_ignores_path() -> Result<()> {
		// -- Setup & Fixtures
		let mut a = Tracefile::new("/a");
		let mut b = Tracefile::new("/b");
		a.parse(FX_TRACEFILE);
		b.parse(FX_TRACEFILE);

		// -- Check
		assert_eq!(a, b);
		b.syscalls.insert("openat".to_string());
		assert_ne!(a, b);

		Ok(())
	}

	#[test]
	fn tracefile_write_then_open() -> Result<()> {
		// -- Setup & Fixtures
		let dir = tempfile::tempdir()?;
		let path = dir.path().join("nested/dir/container");
		let mut tf = Tracefile::new(&path);
		tf.add(vec!["kill".to_string()], vec!["read".to_string(), "exit_group".to_string()]);

		// -- Exec
		tf.write()?;
		let reopened = Tracefile::open(&path)?;
		let content = fs::read_to_string(&path)?;

		// -- Check
		assert!(reopened.exists());
		assert_eq!(reopened, tf);
		assert_eq!(content.lines().next(), Some("ARCH"));
		assert!(content.ends_with("exit_group\nread\n"));

		Ok(())
	}

	#[test]
	fn tracefile_open_missing_is_empty() -> Result<()> {
		// -- Setup & Fixtures
		let dir = tempfile::tempdir()?;

		// -- Exec
		let tf = Tracefile::open(dir.path().join("missing"))?;

		// -- Check
		assert!(!tf.exists());
		assert!(tf.capabilities.is_empty());
		assert!(tf.syscalls.is_empty());
		assert_eq!(tf.arch, std::env::consts::ARCH);

		Ok(())
	}

	#[test]
	fn tracefile_add_reports_changes() -> Result<()> {
		// -- Setup & Fixtures
		let mut tf = tracefile(&[], &["read"]);

		// -- Exec & Check
		assert!(!tf.add(Vec::new(), vec!["read".to_string()]));
		assert!(tf.add(vec!["kill".to_string()], Vec::new()));

		Ok(())
	}

	#[test]
	fn tracefile_diff_renders_changed_sections() -> Result<()> {
		// -- Setup & Fixtures
		let a = tracefile(&["chown"], &["read", "write", "close"]);
		let b = tracefile(&["chown"], &["read", "openat", "brk"]);

		// -- Exec
		let diff = TracefileDiff::new(&a, &b).to_string();

		// -- Check
		assert_eq!(diff, "SYSCALLS\n-close\n-write\n+brk\n+openat");

		Ok(())
	}

	#[test]
	fn tracefile_diff_multiple_sections() -> Result<()> {
		// -- Setup & Fixtures
		let mut a = tracefile(&["kill"], &["read"]);
		let b = tracefile(&[], &["read"]);
		a.arch = "aarch64".to_string();

		// -- Exec
		let diff = TracefileDiff::new(&a, &b).to_string();

		// -- Check
		assert_eq!(diff, "ARCH\n-aarch64\n+x86_64\n\nCAPABILITIES\n-kill");

		Ok(())
	}
}

// endregion: --- Tests
