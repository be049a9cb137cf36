//! Output formatting module
//!
//! Provides the reporter plugins that render task results.

mod formatter;
mod plugin;

pub use formatter::{OutputFormat, ResultFormatter};
pub use plugin::StreamPlugin;
