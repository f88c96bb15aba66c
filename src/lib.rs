//! Edge-triggered GPIO event core for a robotic arm controller.
//!
//! Polls the arm's tool and control-box I/O, detects transitions into a
//! registered condition and dispatches the matching actions.  The arm
//! itself sits behind the port traits in [`app::ports`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod gpio;
pub mod routine;
pub mod supervisor;
pub mod task;
