use std::process::ExitCode;

use crate::lookup::Lookup;

/// Prints the answer to `query`, or the whole table when there is none.
pub fn run_lookup(lookup: &impl Lookup, query: Option<&str>) -> ExitCode {
	let Some(query) = query else {
		for (id, name) in lookup.entries() {
			println!("{id} {name}");
		}
		return ExitCode::SUCCESS;
	};

	match lookup.query(query) {
		Some(answer) => {
			println!("{answer}");
			ExitCode::SUCCESS
		}
		None => ExitCode::FAILURE,
	}
}
