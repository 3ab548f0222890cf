use core::ptr::addr_of;

use aya_ebpf::{
	helpers::{bpf_get_current_comm, bpf_get_current_pid_tgid, bpf_probe_read_kernel, bpf_probe_read_kernel_str_bytes},
	programs::RawTracePointContext,
	EbpfContext,
};
use aya_log_ebpf::info;
use ctrace_common::{
	CapabilitySet, Container, Credentials, EventKind, Name, Origin, TracerConfig, TASK_COMM_LEN,
};

use crate::{
	maps::{CAPABILITY_NAMES, SYSCALL_NAMES},
	vmlinux::{cgroup, cred, kernfs_node, task_struct},
	CONFIG,
};

/// Room for a runtime scope name (`cri-containerd-<id>.scope`) plus the
/// terminating NUL, so the id survives the copy whole.
pub const CGROUP_NAME_BUF: usize = 128;

pub fn config() -> TracerConfig {
	unsafe { core::ptr::read_volatile(&CONFIG) }
}

/// Reads the `n`-th raw tracepoint argument as a pointer.
pub unsafe fn raw_arg<T>(ctx: &RawTracePointContext, n: usize) -> *const T {
	let args = ctx.as_ptr() as *const u64;
	*args.add(n) as *const T
}

pub unsafe fn raw_arg_u64(ctx: &RawTracePointContext, n: usize) -> u64 {
	let args = ctx.as_ptr() as *const u64;
	*args.add(n)
}

pub unsafe fn read_task_pid(task: *const task_struct) -> Result<u32, i64> {
	if task.is_null() {
		return Err(1);
	}
	let pid = bpf_probe_read_kernel(&(*task).pid)?;
	Ok(pid as u32)
}

/// Copies the kernfs name of `cgrp` into `buf`, stopping at the NUL.
pub unsafe fn read_cgroup_name(cgrp: *const cgroup, buf: &mut [u8; CGROUP_NAME_BUF]) -> Result<&[u8], i64> {
	if cgrp.is_null() {
		return Err(1);
	}

	let kn: *const kernfs_node = bpf_probe_read_kernel(&(*cgrp).kn)? as *const kernfs_node;
	if kn.is_null() {
		return Err(1);
	}

	let name = bpf_probe_read_kernel(&(*kn).name)?;
	if name.is_null() {
		return Err(1);
	}

	let name = bpf_probe_read_kernel_str_bytes(name as *const u8, buf)?;
	Ok(name)
}

/// The task the current event runs in.
pub fn current_origin() -> Origin {
	let pid = bpf_get_current_pid_tgid() as u32;
	let comm = bpf_get_current_comm().unwrap_or([0u8; TASK_COMM_LEN]);
	Origin::new(pid, comm)
}

/// Effective capabilities of a task's real credentials.
pub struct TaskCredentials(pub *const task_struct);

impl Credentials for TaskCredentials {
	fn effective(&self) -> CapabilitySet {
		match unsafe { read_cap_effective(self.0) } {
			Ok(caps) => caps,
			Err(_) => CapabilitySet::EMPTY,
		}
	}
}

unsafe fn read_cap_effective(task: *const task_struct) -> Result<CapabilitySet, i64> {
	if task.is_null() {
		return Err(1);
	}

	let creds: *const cred = bpf_probe_read_kernel(&(*task).real_cred)?;
	if creds.is_null() {
		return Err(1);
	}

	// kernel_cap_t is two u32 words on older kernels and one u64 on newer ones;
	// both read the same as low word first.
	let words = bpf_probe_read_kernel(addr_of!((*creds).cap_effective) as *const [u32; 2])?;
	Ok(CapabilitySet::from_words(words))
}

/// Logs `[<short id>] <sys|cap> <name>` for a counted event.
pub fn log_event<C: EbpfContext>(ctx: &C, container: &Container, kind: EventKind, id: u32) {
	let names = match kind {
		EventKind::Syscall => &SYSCALL_NAMES,
		EventKind::Capability => &CAPABILITY_NAMES,
	};
	let name = unsafe { names.get(&id) }.copied().unwrap_or(Name::UNKNOWN);

	let name = core::str::from_utf8(name.as_bytes()).unwrap_or("?");

	// group names are not guaranteed to be text
	match core::str::from_utf8(container.short_id()) {
		Ok(short_id) => info!(ctx, "[{}] {} {}", short_id, kind.tag(), name),
		Err(_) => info!(ctx, "[{:x}] {} {}", container.short_id(), kind.tag(), name),
	}
}
