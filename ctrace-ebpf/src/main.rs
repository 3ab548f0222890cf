#![no_std]
#![no_main]

use aya_ebpf::{
	macros::{kprobe, raw_tracepoint},
	programs::{ProbeContext, RawTracePointContext},
};
use aya_log_ebpf::error;
use ctrace_common::TracerConfig;

mod hooks;
mod maps;
mod utils;
mod vmlinux;

/// Set by the loader before the programs are loaded.
#[no_mangle]
static CONFIG: TracerConfig = TracerConfig::DEFAULT;

// Every hook reports failures through the logger and returns 0: the tracer
// only observes, it never alters the traced operation.

#[raw_tracepoint(tracepoint = "cgroup_attach_task")]
pub fn cgroup_attach_task(ctx: RawTracePointContext) -> i32 {
	match hooks::try_cgroup_attach_task(&ctx) {
		Ok(ret) => ret,
		Err(e) => {
			error!(&ctx, "cgroup_attach_task failed ->> ERROR: {}", e);
			0
		}
	}
}

#[raw_tracepoint(tracepoint = "sched_process_fork")]
pub fn sched_process_fork(ctx: RawTracePointContext) -> i32 {
	match hooks::try_sched_process_fork(&ctx) {
		Ok(ret) => ret,
		Err(e) => {
			error!(&ctx, "sched_process_fork failed ->> ERROR: {}", e);
			0
		}
	}
}

#[raw_tracepoint(tracepoint = "sched_process_exit")]
pub fn sched_process_exit(ctx: RawTracePointContext) -> i32 {
	match hooks::try_sched_process_exit(&ctx) {
		Ok(ret) => ret,
		Err(e) => {
			error!(&ctx, "sched_process_exit failed ->> ERROR: {}", e);
			0
		}
	}
}

#[raw_tracepoint(tracepoint = "sys_enter")]
pub fn sys_enter(ctx: RawTracePointContext) -> i32 {
	match hooks::try_sys_enter(&ctx) {
		Ok(ret) => ret,
		Err(e) => {
			error!(&ctx, "sys_enter failed ->> ERROR: {}", e);
			0
		}
	}
}

#[kprobe]
pub fn cap_capable(ctx: ProbeContext) -> u32 {
	match hooks::try_cap_capable(&ctx) {
		Ok(ret) => ret,
		Err(e) => {
			error!(&ctx, "cap_capable failed ->> ERROR: {}", e);
			0
		}
	}
}

#[cfg(not(test))]
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
	loop {}
}

#[link_section = "license"]
#[no_mangle]
static LICENSE: [u8; 13] = *b"Dual MIT/GPL\0";
