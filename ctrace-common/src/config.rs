pub const TASK_COMM_LEN: usize = 16;
pub const RUNTIME_PREFIX_MAX: usize = TASK_COMM_LEN;

/// Name prefix runc gives its re-exec'd helpers (`runc:[0:PARENT]`, `runc:[2:INIT]`, ...).
pub const DEFAULT_RUNTIME_PREFIX: &[u8] = b"runc:";

/// Marks an unset finalize syscall; no syscall number reaches it.
pub const NO_SYSCALL: u32 = u32::MAX;

/// Tracer switches, written once by the loader into the `CONFIG` global of
/// the eBPF object and read-only afterwards.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TracerConfig {
	/// Log every counted event with its resolved name.
	pub debug: bool,
	/// Also count the syscalls of one latched runtime helper per container.
	pub trace_runtime: bool,
	pub runtime_prefix_len: u8,
	pub _pad0: u8,
	/// Syscall whose first issuer latches the helper pid (`seccomp`).
	pub finalize_syscall: u32,
	pub runtime_prefix: [u8; RUNTIME_PREFIX_MAX],
}

impl TracerConfig {
	pub const DEFAULT: TracerConfig = TracerConfig::new();

	pub const fn new() -> Self {
		let mut runtime_prefix = [0u8; RUNTIME_PREFIX_MAX];
		let mut i = 0;
		while i < DEFAULT_RUNTIME_PREFIX.len() {
			runtime_prefix[i] = DEFAULT_RUNTIME_PREFIX[i];
			i += 1;
		}

		Self {
			debug: false,
			trace_runtime: false,
			runtime_prefix_len: DEFAULT_RUNTIME_PREFIX.len() as u8,
			_pad0: 0,
			finalize_syscall: NO_SYSCALL,
			runtime_prefix,
		}
	}

	pub fn with_debug(mut self, debug: bool) -> Self {
		self.debug = debug;
		self
	}

	pub fn with_trace_runtime(mut self, trace_runtime: bool) -> Self {
		self.trace_runtime = trace_runtime;
		self
	}

	pub fn with_finalize_syscall(mut self, syscall: u32) -> Self {
		self.finalize_syscall = syscall;
		self
	}

	/// Replaces the helper prefix. Task names hold at most 15 bytes, so the
	/// prefix is cut to that.
	pub fn with_runtime_prefix(mut self, prefix: &[u8]) -> Self {
		self.runtime_prefix = [0u8; RUNTIME_PREFIX_MAX];
		let mut len = 0u8;
		for (dst, &src) in self.runtime_prefix.iter_mut().take(TASK_COMM_LEN - 1).zip(prefix.iter()) {
			*dst = src;
			len += 1;
		}
		self.runtime_prefix_len = len;
		self
	}

	pub fn runtime_prefix(&self) -> &[u8] {
		self.runtime_prefix
			.get(..self.runtime_prefix_len as usize)
			.unwrap_or(&self.runtime_prefix)
	}

	/// Whether a task name starts with the runtime helper prefix. An empty
	/// prefix matches nothing.
	pub fn is_runtime_helper(&self, comm: &[u8; TASK_COMM_LEN]) -> bool {
		let len = self.runtime_prefix_len as usize;
		if len == 0 {
			return false;
		}

		for i in 0..RUNTIME_PREFIX_MAX {
			if i >= len {
				break;
			}
			if comm[i] != self.runtime_prefix[i] {
				return false;
			}
		}

		true
	}
}

impl Default for TracerConfig {
	fn default() -> Self {
		Self::DEFAULT
	}
}

/// Pads a task name into the fixed `comm` buffer the kernel hands out.
pub fn comm(name: &[u8]) -> [u8; TASK_COMM_LEN] {
	let mut comm = [0u8; TASK_COMM_LEN];
	for (dst, &src) in comm.iter_mut().take(TASK_COMM_LEN - 1).zip(name.iter()) {
		*dst = src;
	}
	comm
}

// region:    --- Tests


// endregion: --- Tests
