use std::{
	env, fs,
	path::{Path, PathBuf},
	process::Command,
};

use derive_more::{Display, From};
use which::which;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Display, From)]
#[display("{self:?}")]
pub enum Error {
	#[from(String, &String, &str)]
	Custom(String),
	BpfLinkerNotFound,
	AyaToolNotFound,
	BindingsFail(String),

	#[from]
	Var(env::VarError),
	#[from]
	Io(std::io::Error),
}

/// Kernel types the hooks read through raw pointers.
const KERNEL_TYPES: &[&str] = &["task_struct", "cgroup", "kernfs_node", "cred"];

fn main() -> Result<()> {
	let linker = which("bpf-linker");
	if let Ok(linker) = &linker {
		println!("cargo:rerun-if-changed={}", linker.display());
	}

	// Also built as a host build-dependency of the loader; only the bpf target
	// needs the linker and kernel bindings.
	if env::var("CARGO_CFG_TARGET_ARCH")? != "bpf" {
		return Ok(());
	}
	linker.map_err(|_| Error::BpfLinkerNotFound)?;

	let out_dir = PathBuf::from(env::var("OUT_DIR")?);
	generate_vmlinux(&out_dir.join("vmlinux.rs"))
}

/// Writes bindings for the running kernel's BTF, or copies the file named by
/// `CTRACE_VMLINUX` when building for another kernel.
fn generate_vmlinux(dest: &Path) -> Result<()> {
	println!("cargo:rerun-if-env-changed=CTRACE_VMLINUX");
	if let Ok(prebuilt) = env::var("CTRACE_VMLINUX") {
		println!("cargo:rerun-if-changed={prebuilt}");
		fs::copy(prebuilt, dest)?;
		return Ok(());
	}

	// Without aya-tool, point CTRACE_VMLINUX at pregenerated bindings.
	let aya_tool = which("aya-tool").map_err(|_| Error::AyaToolNotFound)?;
	println!("cargo:rerun-if-changed=/sys/kernel/btf/vmlinux");

	let output = Command::new(aya_tool).arg("generate").args(KERNEL_TYPES).output()?;
	if !output.status.success() {
		return Err(Error::BindingsFail(String::from_utf8_lossy(&output.stderr).into_owned()));
	}

	fs::write(dest, output.stdout)?;
	Ok(())
}
