use aya_ebpf::{helpers::r#gen::bpf_get_current_task, programs::ProbeContext};
use ctrace_common::{EventKind, Outcome, Tracer};

use crate::{
	maps::MapStore,
	utils::{config, current_origin, log_event, TaskCredentials},
	vmlinux::task_struct,
};

// cap_capable(const struct cred *cred, struct user_namespace *targ_ns, int cap, unsigned int opts)
pub fn try_cap_capable(ctx: &ProbeContext) -> Result<u32, i64> {
	let capability: i32 = ctx.arg(2).ok_or(1i64)?;
	let origin = current_origin();
	let task = unsafe { bpf_get_current_task() } as *const task_struct;

	let config = config();
	let store = MapStore::new();
	let outcome = Tracer::new(&store, &config)
		.on_capability(&origin, capability as u32, &TaskCredentials(task))
		.map_err(|e| e.0)?;

	if let Outcome::Counted(key) = outcome {
		if config.debug {
			log_event(ctx, &key.container, EventKind::Capability, key.id);
		}
	}

	Ok(0)
}
