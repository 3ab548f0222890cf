mod poller;
mod tracefile;

pub use poller::*;
pub use tracefile::*;
