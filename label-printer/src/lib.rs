//! # label-printer
//!
//! ZPL thermal label printer library - low-level printing capabilities only.
//!
//! ## Scope
//!
//! This crate handles HOW to print:
//! - ZPL II command building
//! - Character set selection (`^CI28` UTF-8 or `^CI27` Windows-1252)
//! - Spooler printing (Windows RAW print jobs)
//! - Serial line printing (RS-232, 9600 8N1 by default)
//! - Enumeration of label printers and serial ports
//!
//! Business logic (WHAT to print) should stay in application code:
//! - Record normalization and label layout → etiquetador
//!
//! ## Example
//!
//! ```ignore
//! use label_printer::{LabelEncoding, TransportDestination, ZplBuilder};
//!
//! let mut zpl = ZplBuilder::new(LabelEncoding::Utf8);
//! zpl.start();
//! zpl.print_width(400);
//! zpl.charset();
//! zpl.text(10, 45, "LOPEZ, MARIA");
//! zpl.end();
//!
//! let destination = TransportDestination::serial("COM1")?;
//! destination.send(&zpl.build()).await?;
//! ```

mod destination;
mod discovery;
mod encoding;
mod error;
mod printer;
mod zpl;

// Re-exports
pub use destination::{ConnectionKind, TransportDestination};
pub use discovery::{VENDOR_TERMS, filter_label_printers, list_label_printers, list_serial_ports};
pub use encoding::{LabelEncoding, char_width, sanitize_field, truncate_chars};
pub use error::{PrintError, PrintResult};
pub use printer::{Printer, SerialParity, SerialPrinter, SerialSettings, SpoolerPrinter};
pub use zpl::{Justify, ZplBuilder};
