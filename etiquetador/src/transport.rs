//! Label transport
//!
//! The seam between batch orchestration and physical devices.

use label_printer::{PrintResult, TransportDestination};
use tracing::instrument;

use crate::labels::LabelDocument;

/// Sends one rendered label to a destination
///
/// A single attempt per call; callers decide what a failure means.
#[allow(async_fn_in_trait)]
pub trait LabelTransport {
    async fn send(&self, document: &LabelDocument, destination: &TransportDestination) -> PrintResult<()>;
}

/// Transport writing to real spooler queues and serial ports
#[derive(Debug, Default, Clone, Copy)]
pub struct DeviceTransport;

impl LabelTransport for DeviceTransport {
    #[instrument(skip(self, document), fields(destination = %destination, bytes = document.len()))]
    async fn send(&self, document: &LabelDocument, destination: &TransportDestination) -> PrintResult<()> {
        destination.send(document.as_bytes()).await
    }
}
