#![no_std]

#[cfg(test)]
extern crate std;

mod caps;
mod config;
mod container;
mod gate;
mod name;
mod store;
mod tracer;

#[cfg(test)]
pub(crate) mod memory;

pub use caps::*;
pub use config::*;
pub use container::*;
pub use gate::*;
pub use name::*;
pub use store::*;
pub use tracer::*;

/// Upper bound on tracked process ids.
pub const PID_MAX_LIMIT: u32 = 32768;

/// Upper bound on distinct (container, id) pairs per counter table.
pub const COUNTER_MAX_ENTRIES: u32 = 65536;

/// Upper bound on containers the gate keeps state for.
pub const CONTAINER_MAX_ENTRIES: u32 = 4096;

#[cfg(feature = "user")]
mod userspace {
	use super::*;

	unsafe impl aya::Pod for Container {}
	unsafe impl aya::Pod for ContainerKey {}
	unsafe impl aya::Pod for Name {}
	unsafe impl aya::Pod for TracerConfig {}
}
