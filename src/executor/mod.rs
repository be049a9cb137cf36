//! Task execution engine
//!
//! Replays scripted lanes concurrently and feeds their serialized events to
//! the reporter.

mod event_loop;
mod lanes;
mod runner;
mod script;

pub use runner::TaskRunner;
pub use script::TaskScript;
