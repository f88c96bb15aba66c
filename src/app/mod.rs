//! Application boundary: port traits, outbound events, and the state
//! shared between the poll thread, action threads and the main thread.
//!
//! Everything that touches the arm goes through the traits in [`ports`],
//! so the GPIO core and the routine are testable with mock adapters.

pub mod events;
pub mod ports;
pub mod shared;
