mod diff;
mod lookup;
mod options;
mod trace;

pub use diff::*;
pub use lookup::*;
pub use options::*;
pub use trace::*;

use std::process::ExitCode;

/// `EX_NOINPUT`: none of the given tracefiles exist.
pub const EXIT_NO_INPUT: u8 = 66;

pub(crate) fn no_tracefile() -> ExitCode {
	println!("No Tracefile found");
	ExitCode::from(EXIT_NO_INPUT)
}
