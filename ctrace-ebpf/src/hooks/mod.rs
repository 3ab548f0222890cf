mod capability;
mod lifecycle;
mod syscall;

pub use capability::*;
pub use lifecycle::*;
pub use syscall::*;
