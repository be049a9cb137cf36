//! Ordered result reporting
//!
//! Lanes run the same test list concurrently. Their events are serialized into
//! one stream and fed to a [`Reporter`], which reports each test once, in
//! schedule order, after every lane has finished it.

mod aggregator;
mod error;
mod events;
mod plugin;
mod queue;
mod screenshots;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use aggregator::{OrderingPolicy, Reporter};
pub use error::ReporterError;
pub use events::TaskEvent;
pub use plugin::ReporterPlugin;
pub use screenshots::{ScreenshotRegistry, ScreenshotSource};
