use aya_ebpf::programs::RawTracePointContext;
use ctrace_common::Tracer;

use crate::{
	maps::MapStore,
	utils::{config, raw_arg, read_cgroup_name, read_task_pid, CGROUP_NAME_BUF},
	vmlinux::{cgroup, task_struct},
};

// cgroup_attach_task(struct cgroup *dst_cgrp, const char *path, struct task_struct *task, bool threadgroup)
pub fn try_cgroup_attach_task(ctx: &RawTracePointContext) -> Result<i32, i64> {
	let dst_cgrp: *const cgroup = unsafe { raw_arg(ctx, 0) };
	let task: *const task_struct = unsafe { raw_arg(ctx, 2) };

	let mut buf = [0u8; CGROUP_NAME_BUF];
	let name = unsafe { read_cgroup_name(dst_cgrp, &mut buf)? };
	let pid = unsafe { read_task_pid(task)? };

	let config = config();
	let store = MapStore::new();
	Tracer::new(&store, &config).on_attach(name, pid).map_err(|e| e.0)?;

	Ok(0)
}

// sched_process_fork(struct task_struct *parent, struct task_struct *child)
pub fn try_sched_process_fork(ctx: &RawTracePointContext) -> Result<i32, i64> {
	let parent: *const task_struct = unsafe { raw_arg(ctx, 0) };
	let child: *const task_struct = unsafe { raw_arg(ctx, 1) };

	let parent_pid = unsafe { read_task_pid(parent)? };
	let child_pid = unsafe { read_task_pid(child)? };

	let config = config();
	let store = MapStore::new();
	Tracer::new(&store, &config)
		.on_fork(parent_pid, child_pid)
		.map_err(|e| e.0)?;

	Ok(0)
}

// sched_process_exit(struct task_struct *p)
pub fn try_sched_process_exit(ctx: &RawTracePointContext) -> Result<i32, i64> {
	let task: *const task_struct = unsafe { raw_arg(ctx, 0) };
	let pid = unsafe { read_task_pid(task)? };

	let config = config();
	let store = MapStore::new();
	Tracer::new(&store, &config).on_exit(pid).map_err(|e| e.0)?;

	Ok(0)
}
