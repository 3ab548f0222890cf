use std::{env, fs, path::PathBuf};

use aya_build::cargo_metadata;
use derive_more::{Display, From};
use which::which;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Display, From)]
#[display("{self:?}")]
pub enum Error {
	#[from(String, &String, &str)]
	Custom(String),
	ExecFail,
	BuildFail,

	#[from]
	Var(env::VarError),
	#[from]
	Io(std::io::Error),
}

fn main() -> Result<()> {
	// Without bpf-linker the object cannot be built; ship an empty one so the
	// host-side code and its tests still build. The loader rejects it at runtime.
	if which("bpf-linker").is_err() {
		println!("cargo:warning=bpf-linker not found, building ctrace without its eBPF object");
		let out_dir = PathBuf::from(env::var("OUT_DIR")?);
		fs::write(out_dir.join("ctrace"), [])?;
		return Ok(());
	}

	let cargo_metadata::Metadata { packages, .. } = cargo_metadata::MetadataCommand::new()
		.no_deps()
		.exec()
		.map_err(|_| Error::ExecFail)?;
	let ebpf_package = packages
		.into_iter()
		.find(|cargo_metadata::Package { name, .. }| name == "ctrace-ebpf")
		.ok_or_else(|| Error::Custom("ctrace-ebpf package not found".to_string()))?;
	aya_build::build_ebpf([ebpf_package]).map_err(|_| Error::BuildFail)?;
	Ok(())
}
