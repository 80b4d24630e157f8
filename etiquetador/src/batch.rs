//! Batch printing
//!
//! Drives normalize → render → send for every row, in input order, against
//! one destination. A failed send is recorded and the batch moves on.

use chrono::NaiveDate;
use label_printer::{PrintError, TransportDestination};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::labels::{LabelRenderer, RawRecord, RecordNormalizer};
use crate::transport::{DeviceTransport, LabelTransport};

/// Conditions that prevent a batch from starting
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Input has no rows")]
    EmptyInput,

    #[error("No row has a menu code")]
    NoValidCodes,
}

/// A row whose label could not be sent
#[derive(Debug)]
pub struct RecordFailure {
    /// Zero-based position of the row in the batch input
    pub index: usize,
    /// Padded code of the label
    pub code: String,
    /// Formatted employee name, as printed
    pub employee: String,
    pub reason: PrintError,
}

/// Outcome of a batch
#[derive(Debug, Default)]
pub struct BatchResult {
    /// Rows that passed normalization and were sent (or tried)
    pub attempted: usize,
    pub sent: usize,
    /// Failed rows in input order
    pub failures: Vec<RecordFailure>,
    /// True when the batch stopped early on request
    pub cancelled: bool,
}

impl BatchResult {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn all_sent(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }
}

/// Progress after each send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    pub sent: usize,
    pub attempted: usize,
    /// Printable rows in the whole batch
    pub total: usize,
}

/// Batch printer
///
/// Sends are strictly sequential: labels come out of the printer in the
/// order of the input rows.
pub struct BatchPrinter<T = DeviceTransport> {
    transport: T,
    normalizer: RecordNormalizer,
    renderer: LabelRenderer,
    cancel: Option<CancellationToken>,
}

impl BatchPrinter<DeviceTransport> {
    /// Batch printer writing to real devices
    pub fn with_devices(normalizer: RecordNormalizer, renderer: LabelRenderer) -> Self {
        Self::new(DeviceTransport, normalizer, renderer)
    }
}

impl<T: LabelTransport> BatchPrinter<T> {
    pub fn new(transport: T, normalizer: RecordNormalizer, renderer: LabelRenderer) -> Self {
        Self {
            transport,
            normalizer,
            renderer,
            cancel: None,
        }
    }

    /// Stop issuing sends once `token` is cancelled
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Check that a batch can start; returns the number of printable rows
    pub fn preflight(&self, records: &[RawRecord]) -> Result<usize, BatchError> {
        if records.is_empty() {
            return Err(BatchError::EmptyInput);
        }
        match self.printable(records) {
            0 => Err(BatchError::NoValidCodes),
            n => Ok(n),
        }
    }

    /// Print every row
    pub async fn run(
        &self,
        records: &[RawRecord],
        destination: &TransportDestination,
        elaborated: NaiveDate,
        expires: NaiveDate,
    ) -> BatchResult {
        self.run_with_progress(records, destination, elaborated, expires, |_| {})
            .await
    }

    /// Print every row, reporting progress after each send
    #[instrument(skip_all, fields(destination = %destination, rows = records.len()))]
    pub async fn run_with_progress<F>(
        &self,
        records: &[RawRecord],
        destination: &TransportDestination,
        elaborated: NaiveDate,
        expires: NaiveDate,
        mut on_progress: F,
    ) -> BatchResult
    where
        F: FnMut(BatchProgress),
    {
        let total = self.printable(records);
        let mut result = BatchResult::default();

        for (index, record) in records.iter().enumerate() {
            if self.cancel.as_ref().is_some_and(|t| t.is_cancelled()) {
                warn!(index, "Batch cancelled");
                result.cancelled = true;
                break;
            }

            let Some(label) = self.normalizer.normalize(record) else {
                debug!(index, "Skipping row without code");
                continue;
            };

            let document = self.renderer.render(&label, elaborated, expires);
            result.attempted += 1;

            match self.transport.send(&document, destination).await {
                Ok(()) => {
                    result.sent += 1;
                    debug!(index, code = %label.code(), "Label sent");
                }
                Err(e) => {
                    error!(
                        index,
                        code = %label.code(),
                        employee = %label.employee_name(),
                        error = %e,
                        "Failed to print label"
                    );
                    result.failures.push(RecordFailure {
                        index,
                        code: label.code().to_string(),
                        employee: label.employee_name().to_string(),
                        reason: e,
                    });
                }
            }

            on_progress(BatchProgress {
                sent: result.sent,
                attempted: result.attempted,
                total,
            });
        }

        info!(
            attempted = result.attempted,
            sent = result.sent,
            failed = result.failed(),
            cancelled = result.cancelled,
            "Batch finished"
        );
        result
    }

    fn printable(&self, records: &[RawRecord]) -> usize {
        records.iter().filter(|r| self.normalizer.has_code(r)).count()
    }
}
