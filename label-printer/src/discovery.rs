//! Enumeration of OS-visible label printers and serial ports

use tracing::{debug, instrument};

use crate::error::{PrintError, PrintResult};
use crate::printer::SpoolerPrinter;

/// Name fragments identifying label printer queues (Zebra models and drivers)
pub const VENDOR_TERMS: &[&str] = &["zebra", "zdesigner", "zt", "gk", "zd", "lp", "gx", "gc"];

/// Keep printer names containing any vendor term (case-insensitive)
pub fn filter_label_printers<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .filter(|name| {
            let lower = name.as_ref().to_lowercase();
            VENDOR_TERMS.iter().any(|term| lower.contains(term))
        })
        .map(|name| name.as_ref().to_string())
        .collect()
}

/// List installed label printers
#[instrument]
pub fn list_label_printers() -> PrintResult<Vec<String>> {
    let all = SpoolerPrinter::list()?;
    let found = filter_label_printers(&all);
    debug!(total = all.len(), label_printers = found.len(), "Printers enumerated");
    Ok(found)
}

/// List serial port names
#[instrument]
pub fn list_serial_ports() -> PrintResult<Vec<String>> {
    let ports = serialport::available_ports()
        .map_err(|e| PrintError::Discovery(format!("Serial ports: {}", e)))?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}
