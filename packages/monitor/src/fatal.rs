// ABOUTME: Channel carrying fatal runtime errors to the process owner
// ABOUTME: Library code reports here instead of exiting

use tokio::sync::mpsc;
use tracing::error;

use crate::MonitorError;

pub type FatalReceiver = mpsc::UnboundedReceiver<MonitorError>;

#[derive(Debug, Clone)]
pub struct FatalReporter {
    tx: mpsc::UnboundedSender<MonitorError>,
}

impl FatalReporter {
    pub fn report(&self, err: MonitorError) {
        error!("Fatal error: {}", err);
        if self.tx.send(err).is_err() {
            error!("Fatal error receiver is gone, error dropped");
        }
    }
}

pub fn fatal_channel() -> (FatalReporter, FatalReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (FatalReporter { tx }, rx)
}
