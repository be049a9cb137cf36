//! Reporter control loop
//!
//! The single consumer of the task's event channel. Events are applied one at
//! a time in arrival order; the first contract violation stops the loop and
//! drops the receiver, which in turn stops the lanes.

use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::reporter::{Reporter, ReporterError, ReporterPlugin, TaskEvent};

/// Feed every event from `rx` into `reporter` until task done or hang-up
pub async fn drive<P: ReporterPlugin>(
    mut reporter: Reporter<P>,
    mut rx: mpsc::Receiver<TaskEvent>,
) -> Result<Reporter<P>, ReporterError> {
    while let Some(event) = rx.recv().await {
        let name = event.name();
        let is_done = matches!(event, TaskEvent::Done { .. });

        if let Err(e) = reporter.handle_event(event) {
            error!("Reporter rejected {} event: {}", name, e);
            return Err(e);
        }

        if is_done {
            break;
        }
    }

    debug!("Reporter loop finished with {} tests pending", reporter.pending());
    Ok(reporter)
}
