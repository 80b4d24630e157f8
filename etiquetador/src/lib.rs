//! # etiquetador
//!
//! Meal label printing for canteen menus.
//!
//! Reads menu rows (code, menu name, employee name), renders one ZPL label
//! per row and sends the labels, in row order, to a Zebra printer on the
//! print spooler or a serial port.
//!
//! ```ignore
//! use etiquetador::batch::BatchPrinter;
//! use etiquetador::labels::{LabelRenderer, RecordNormalizer};
//! use label_printer::TransportDestination;
//!
//! let printer = BatchPrinter::with_devices(RecordNormalizer::default(), LabelRenderer::default());
//! let destination = TransportDestination::spooler("ZDesigner GK420t")?;
//! let result = printer.run(&records, &destination, today, expires).await;
//! println!("{} of {} labels printed", result.sent, result.attempted);
//! ```

pub mod batch;
pub mod config;
pub mod input;
pub mod labels;
pub mod logger;
pub mod settings;
pub mod transport;

pub use batch::{BatchError, BatchPrinter, BatchProgress, BatchResult, RecordFailure};
pub use config::Config;
pub use labels::{FieldNames, LabelDocument, LabelRecord, LabelRenderer, RawRecord, RecordNormalizer};
pub use settings::Settings;
pub use transport::{DeviceTransport, LabelTransport};
