use aya_ebpf::programs::RawTracePointContext;
use ctrace_common::{EventKind, Outcome, Tracer};

use crate::{
	maps::MapStore,
	utils::{config, current_origin, log_event, raw_arg_u64},
};

// sys_enter(struct pt_regs *regs, long id)
pub fn try_sys_enter(ctx: &RawTracePointContext) -> Result<i32, i64> {
	let syscall = unsafe { raw_arg_u64(ctx, 1) } as u32;
	let origin = current_origin();

	let config = config();
	let store = MapStore::new();
	let outcome = Tracer::new(&store, &config)
		.on_syscall(&origin, syscall)
		.map_err(|e| e.0)?;

	if let Outcome::Counted(key) = outcome {
		if config.debug {
			log_event(ctx, &key.container, EventKind::Syscall, key.id);
		}
	}

	Ok(0)
}
