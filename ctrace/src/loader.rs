use aya::{
	maps::{HashMap as BpfHashMap, MapData},
	programs::{KProbe, RawTracePoint},
	Ebpf, EbpfLoader,
};
use ctrace_common::{Name, TracerConfig};
use tracing::{debug, error, info, warn};

use crate::{
	lookup::{Capabilities, Lookup, Syscalls},
	Error, Result,
};

/// Raw tracepoints the object attaches to, named after their programs.
const RAW_TRACEPOINTS: [&str; 4] = ["cgroup_attach_task", "sched_process_fork", "sched_process_exit", "sys_enter"];

const CAP_CAPABLE: &str = "cap_capable";

static EBPF_OBJECT: &[u8] = aya::include_bytes_aligned!(concat!(env!("OUT_DIR"), "/ctrace"));

/// Loads the object with `config` frozen into its `CONFIG` global.
pub fn load(config: &TracerConfig) -> Result<Ebpf> {
	if EBPF_OBJECT.is_empty() {
		error!("built without the eBPF object, install bpf-linker and rebuild");
		return Err(Error::EbpfObjectMissing);
	}

	let mut ebpf = EbpfLoader::new().set_global("CONFIG", config, true).load(EBPF_OBJECT)?;
	if let Err(e) = aya_log::EbpfLogger::init(&mut ebpf) {
		// This can happen if you remove all log statements from your eBPF program.
		warn!("failed to initialize eBPF logger: {e}");
	}

	if config.debug {
		prefill_names(&mut ebpf, "SYSCALL_NAMES", &Syscalls)?;
		prefill_names(&mut ebpf, "CAPABILITY_NAMES", &Capabilities)?;
	}

	Ok(ebpf)
}

/// Fills a diagnostic name map so kernel log lines carry names, not numbers.
fn prefill_names(ebpf: &mut Ebpf, map: &'static str, lookup: &impl Lookup) -> Result<()> {
	let map_ref = ebpf.map_mut(map).ok_or(Error::EbpfMapNotFound(map))?;
	let mut names: BpfHashMap<&mut MapData, u32, Name> = BpfHashMap::try_from(map_ref)?;

	let entries = lookup.entries();
	for (id, name) in &entries {
		names.insert(id, Name::new(name), 0)?;
	}
	debug!("{map}: {} names", entries.len());

	Ok(())
}

pub fn load_hooks(ebpf: &mut Ebpf) -> Result<()> {
	for name in RAW_TRACEPOINTS {
		let program: &mut RawTracePoint = ebpf.program_mut(name).ok_or(Error::EbpfProgNotFound(name))?.try_into()?;
		program.load()?;
		program.attach(name)?;
	}

	let kp_cap_capable: &mut KProbe = ebpf
		.program_mut(CAP_CAPABLE)
		.ok_or(Error::EbpfProgNotFound(CAP_CAPABLE))?
		.try_into()?;
	kp_cap_capable.load()?;
	kp_cap_capable.attach(CAP_CAPABLE, 0)?;

	info!("attached {} hooks", RAW_TRACEPOINTS.len() + 1);
	Ok(())
}

/// Kernel config for a trace run. The finalize syscall is the host's
/// `seccomp`, the last thing a runtime helper does before exec'ing the
/// workload.
pub fn tracer_config(debug: bool, trace_runtime: bool, runtime_prefix: &str) -> TracerConfig {
	TracerConfig::new()
		.with_debug(debug)
		.with_trace_runtime(trace_runtime)
		.with_runtime_prefix(runtime_prefix.as_bytes())
		.with_finalize_syscall(libc::SYS_seccomp as u32)
}

// region:    --- Tests

#[cfg(test)]
mod tests {
	type Result<T> = core::result::Result<T, Box<dyn std::error::Error>>; // For tests.

	use super::*;

	#[test]
	fn loader_tracer_config_from_flags() -> Result<()> {
		// -- Exec
		let config = tracer_config(true, true, "crun");

		// -- Check
		assert!(config.debug);
		assert!(config.trace_runtime);
		assert_eq!(config.runtime_prefix(), b"crun");
		assert_eq!(config.finalize_syscall, libc::SYS_seccomp as u32);
		assert_eq!(Syscalls.name(config.finalize_syscall), Some("seccomp"));

		Ok(())
	}
}

// endregion: --- Tests
