//! Test-call origination: a throwaway lead plus an `Originate` row in the
//! manager queue, picked up by the dialer's own command runner.

pub mod dial_plan;
pub mod send;
pub mod status;

pub use send::send;
pub use status::{list, status};
