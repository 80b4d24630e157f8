//! Printer adapters for sending ZPL data
//!
//! Supports:
//! - Spooler printers (Windows RAW print jobs via Win32 API)
//! - Serial printers (RS-232 ports)
//!
//! Every adapter opens its device for a single job and releases it on
//! every exit path; no handle outlives a `print` call.

use std::io::Write;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::{PrintError, PrintResult};

/// Trait for printer adapters
#[allow(async_fn_in_trait)]
pub trait Printer {
    /// Send a complete raw document to the printer as one job
    async fn print(&self, data: &[u8]) -> PrintResult<()>;

    /// Check if the printer can be opened
    async fn is_online(&self) -> bool;
}

/// Document name shown in the print queue
#[cfg(windows)]
const JOB_NAME: &str = "Etiqueta ZPL";

/// Spooler printer
///
/// Sends raw bytes through the operating system's print queue, bypassing
/// the driver's rendering (datatype `RAW`). Only Windows has a backend.
#[derive(Debug, Clone)]
pub struct SpoolerPrinter {
    name: String,
}

impl SpoolerPrinter {
    /// Create a printer for a named print queue
    pub fn new(name: &str) -> PrintResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PrintError::InvalidConfig(
                "Printer name is empty".to_string(),
            ));
        }
        Ok(Self {
            name: name.to_string(),
        })
    }

    /// Get the printer name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// List installed printers (filters out virtual printers)
    #[cfg(windows)]
    pub fn list() -> PrintResult<Vec<String>> {
        use windows::Win32::Graphics::Printing::{
            EnumPrintersW, PRINTER_ENUM_CONNECTIONS, PRINTER_ENUM_LOCAL, PRINTER_INFO_5W,
        };
        use windows::core::PWSTR;

        unsafe {
            let flags = PRINTER_ENUM_LOCAL | PRINTER_ENUM_CONNECTIONS;
            let mut needed: u32 = 0;
            let mut returned: u32 = 0;

            let _ = EnumPrintersW(flags, None, 5, None, &mut needed, &mut returned);

            if needed == 0 {
                return Ok(Vec::new());
            }

            let mut buf: Vec<u8> = vec![0; needed as usize];
            EnumPrintersW(
                flags,
                None,
                5,
                Some(buf.as_mut_slice()),
                &mut needed,
                &mut returned,
            )
            .map_err(|e| PrintError::Discovery(format!("EnumPrintersW failed: {}", e)))?;

            let ptr = buf.as_ptr() as *const PRINTER_INFO_5W;
            let slice = std::slice::from_raw_parts(ptr, returned as usize);

            let mut result: Vec<String> = Vec::new();
            for info in slice.iter() {
                if info.pPrinterName.is_null() {
                    continue;
                }
                let name = PWSTR(info.pPrinterName.0).to_string().unwrap_or_default();

                let port = if info.pPortName.is_null() {
                    String::new()
                } else {
                    PWSTR(info.pPortName.0).to_string().unwrap_or_default()
                };

                if !is_virtual_port(&port) {
                    result.push(name);
                }
            }

            Ok(result)
        }
    }

    /// List installed printers (no spooler backend on this platform)
    #[cfg(not(windows))]
    pub fn list() -> PrintResult<Vec<String>> {
        Ok(Vec::new())
    }

    #[cfg(windows)]
    fn check_online(&self) -> bool {
        use windows::Win32::Graphics::Printing::{
            GetPrinterW, OpenPrinterW, PRINTER_HANDLE, PRINTER_INFO_6, PRINTER_STATUS_OFFLINE,
        };
        use windows::core::PCWSTR;

        let name_w = to_wide(&self.name);

        unsafe {
            let mut handle: PRINTER_HANDLE = PRINTER_HANDLE::default();
            if OpenPrinterW(PCWSTR::from_raw(name_w.as_ptr()), &mut handle, None).is_err() {
                return false;
            }
            let _printer = win::PrinterGuard(handle);

            let mut needed: u32 = 0;
            let _ = GetPrinterW(handle, 6, None, &mut needed);
            if needed == 0 {
                return true;
            }

            let mut buf: Vec<u8> = vec![0; needed as usize];
            if GetPrinterW(handle, 6, Some(buf.as_mut_slice()), &mut needed).is_ok() {
                let info = *(buf.as_ptr() as *const PRINTER_INFO_6);
                return (info.dwStatus & PRINTER_STATUS_OFFLINE) == 0;
            }
            true
        }
    }

    #[cfg(windows)]
    fn write_raw(&self, data: &[u8]) -> PrintResult<()> {
        use core::ffi::c_void;
        use windows::Win32::Graphics::Printing::{
            DOC_INFO_1W, OpenPrinterW, PRINTER_HANDLE, StartDocPrinterW, StartPagePrinter,
            WritePrinter,
        };
        use windows::core::{PCWSTR, PWSTR};

        let name_w = to_wide(&self.name);
        let doc_name_w = to_wide(JOB_NAME);
        let datatype_w = to_wide("RAW");

        unsafe {
            let mut handle: PRINTER_HANDLE = PRINTER_HANDLE::default();
            OpenPrinterW(PCWSTR::from_raw(name_w.as_ptr()), &mut handle, None)
                .map_err(|e| PrintError::DeviceUnavailable(format!("{}: {}", self.name, e)))?;
            let _printer = win::PrinterGuard(handle);

            let doc_info = DOC_INFO_1W {
                pDocName: PWSTR(doc_name_w.as_ptr() as *mut _),
                pOutputFile: PWSTR::null(),
                pDatatype: PWSTR(datatype_w.as_ptr() as *mut _),
            };

            if StartDocPrinterW(handle, 1, &doc_info as *const DOC_INFO_1W) == 0 {
                return Err(PrintError::DeviceUnavailable(format!(
                    "{}: StartDocPrinter failed",
                    self.name
                )));
            }
            let mut job = win::JobGuard::new(handle);

            if !StartPagePrinter(handle).as_bool() {
                return Err(PrintError::Transmission(format!(
                    "{}: StartPagePrinter failed",
                    self.name
                )));
            }
            job.page_started();

            let mut written: u32 = 0;
            let ok = WritePrinter(
                handle,
                data.as_ptr() as *const c_void,
                data.len() as u32,
                &mut written,
            );

            if !ok.as_bool() {
                return Err(PrintError::Transmission(format!(
                    "{}: WritePrinter failed",
                    self.name
                )));
            }

            if written as usize != data.len() {
                return Err(PrintError::Transmission(format!(
                    "{}: incomplete write ({} of {} bytes)",
                    self.name,
                    written,
                    data.len()
                )));
            }

            job.finish()
                .map_err(|step| PrintError::Transmission(format!("{}: {} failed", self.name, step)))
        }
    }
}

impl Printer for SpoolerPrinter {
    #[cfg(windows)]
    #[instrument(skip(self, data), fields(printer = %self.name, data_len = data.len()))]
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        // Spooler calls block, run them off the async executor
        let printer = self.clone();
        let data = data.to_vec();

        tokio::task::spawn_blocking(move || printer.write_raw(&data))
            .await
            .map_err(|e| PrintError::Transmission(format!("Task join failed: {}", e)))??;

        info!("Print job spooled");
        Ok(())
    }

    #[cfg(not(windows))]
    async fn print(&self, _data: &[u8]) -> PrintResult<()> {
        Err(PrintError::UnsupportedTransport(
            "Spooler printing not supported on this platform".to_string(),
        ))
    }

    #[cfg(windows)]
    async fn is_online(&self) -> bool {
        let printer = self.clone();
        tokio::task::spawn_blocking(move || printer.check_online())
            .await
            .unwrap_or(false)
    }

    #[cfg(not(windows))]
    async fn is_online(&self) -> bool {
        false
    }
}

/// Check if a port is a virtual printer port
#[cfg_attr(not(windows), allow(dead_code))]
fn is_virtual_port(port: &str) -> bool {
    let p = port.to_lowercase();
    p == "file:"
        || p == "portprompt:"
        || p == "xpsport:"
        || p.starts_with("onenote")
        || p == "nul:"
        || p.starts_with("wfsport:")
}

#[cfg(windows)]
fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

#[cfg(windows)]
mod win {
    use windows::Win32::Graphics::Printing::{
        ClosePrinter, EndDocPrinter, EndPagePrinter, PRINTER_HANDLE,
    };

    /// Closes the printer handle on drop
    pub(super) struct PrinterGuard(pub(super) PRINTER_HANDLE);

    impl Drop for PrinterGuard {
        fn drop(&mut self) {
            unsafe {
                let _ = ClosePrinter(self.0);
            }
        }
    }

    /// Ends an open page and document on drop unless finished explicitly
    pub(super) struct JobGuard {
        handle: PRINTER_HANDLE,
        page: bool,
        active: bool,
    }

    impl JobGuard {
        pub(super) fn new(handle: PRINTER_HANDLE) -> Self {
            Self {
                handle,
                page: false,
                active: true,
            }
        }

        pub(super) fn page_started(&mut self) {
            self.page = true;
        }

        /// End page and document, reporting the step that failed
        pub(super) fn finish(&mut self) -> Result<(), &'static str> {
            self.active = false;
            unsafe {
                if self.page && !EndPagePrinter(self.handle).as_bool() {
                    let _ = EndDocPrinter(self.handle);
                    return Err("EndPagePrinter");
                }
                if !EndDocPrinter(self.handle).as_bool() {
                    return Err("EndDocPrinter");
                }
            }
            Ok(())
        }
    }

    impl Drop for JobGuard {
        fn drop(&mut self) {
            if !self.active {
                return;
            }
            unsafe {
                if self.page {
                    let _ = EndPagePrinter(self.handle);
                }
                let _ = EndDocPrinter(self.handle);
            }
        }
    }
}

/// Parity setting for serial lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SerialParity {
    #[default]
    None,
    Odd,
    Even,
}

/// Serial line settings
///
/// Defaults to 9600 baud, 8 data bits, no parity, 1 stop bit and a
/// two second timeout, the factory setting of most label printers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialSettings {
    pub baud_rate: u32,
    pub data_bits: u8,
    pub parity: SerialParity,
    pub stop_bits: u8,
    pub timeout_ms: u64,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            data_bits: 8,
            parity: SerialParity::None,
            stop_bits: 1,
            timeout_ms: 2000,
        }
    }
}

impl SerialSettings {
    /// Validate and build an unopened port description
    fn builder(&self, port: &str) -> PrintResult<serialport::SerialPortBuilder> {
        use serialport::{DataBits, FlowControl, Parity, StopBits};

        let data_bits = match self.data_bits {
            5 => DataBits::Five,
            6 => DataBits::Six,
            7 => DataBits::Seven,
            8 => DataBits::Eight,
            other => {
                return Err(PrintError::InvalidConfig(format!(
                    "Unsupported data bits: {}",
                    other
                )));
            }
        };
        let stop_bits = match self.stop_bits {
            1 => StopBits::One,
            2 => StopBits::Two,
            other => {
                return Err(PrintError::InvalidConfig(format!(
                    "Unsupported stop bits: {}",
                    other
                )));
            }
        };
        let parity = match self.parity {
            SerialParity::None => Parity::None,
            SerialParity::Odd => Parity::Odd,
            SerialParity::Even => Parity::Even,
        };

        Ok(serialport::new(port, self.baud_rate)
            .data_bits(data_bits)
            .parity(parity)
            .stop_bits(stop_bits)
            .flow_control(FlowControl::None)
            .timeout(Duration::from_millis(self.timeout_ms)))
    }
}

/// Serial printer (RS-232)
#[derive(Debug, Clone)]
pub struct SerialPrinter {
    port: String,
    settings: SerialSettings,
}

impl SerialPrinter {
    /// Create a printer on a serial port (e.g., "COM1", "/dev/ttyUSB0")
    pub fn new(port: &str) -> PrintResult<Self> {
        let port = port.trim();
        if port.is_empty() {
            return Err(PrintError::InvalidConfig("Serial port is empty".to_string()));
        }
        Ok(Self {
            port: port.to_string(),
            settings: SerialSettings::default(),
        })
    }

    /// Override the line settings
    pub fn with_settings(mut self, settings: SerialSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Get the port name
    pub fn port(&self) -> &str {
        &self.port
    }

    /// Get the line settings
    pub fn settings(&self) -> &SerialSettings {
        &self.settings
    }

    fn open(&self) -> PrintResult<Box<dyn serialport::SerialPort>> {
        self.settings
            .builder(&self.port)?
            .open()
            .map_err(|e| PrintError::DeviceUnavailable(format!("{}: {}", self.port, e)))
    }

    fn write_blocking(&self, data: &[u8]) -> PrintResult<()> {
        // Port is closed when it goes out of scope
        let mut port = self.open()?;
        debug!(port = %self.port, "Serial port opened");

        port.write_all(data)
            .map_err(|e| PrintError::Transmission(format!("{}: {}", self.port, e)))?;
        port.flush()
            .map_err(|e| PrintError::Transmission(format!("{}: {}", self.port, e)))?;
        Ok(())
    }
}

impl Printer for SerialPrinter {
    #[instrument(skip(self, data), fields(port = %self.port, baud = self.settings.baud_rate, data_len = data.len()))]
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        let printer = self.clone();
        let data = data.to_vec();

        tokio::task::spawn_blocking(move || printer.write_blocking(&data))
            .await
            .map_err(|e| PrintError::Transmission(format!("Task join failed: {}", e)))??;

        info!("Print job sent");
        Ok(())
    }

    #[instrument(skip(self), fields(port = %self.port))]
    async fn is_online(&self) -> bool {
        let printer = self.clone();
        let opened = tokio::task::spawn_blocking(move || printer.open().map(drop))
            .await
            .map_err(|e| PrintError::Transmission(format!("Task join failed: {}", e)))
            .and_then(|r| r);

        match opened {
            Ok(()) => {
                info!("Serial port available");
                true
            }
            Err(e) => {
                warn!(error = %e, "Serial port unavailable");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spooler_printer_new() {
        let printer = SpoolerPrinter::new("  ZDesigner GK420t ").unwrap();
        assert_eq!(printer.name(), "ZDesigner GK420t");
    }

    #[test]
    fn test_spooler_printer_empty_name() {
        let result = SpoolerPrinter::new("   ");
        assert!(matches!(result, Err(PrintError::InvalidConfig(_))));
    }

    #[test]
    fn test_serial_defaults() {
        let printer = SerialPrinter::new("COM1").unwrap();
        let settings = printer.settings();
        assert_eq!(printer.port(), "COM1");
        assert_eq!(settings.baud_rate, 9600);
        assert_eq!(settings.data_bits, 8);
        assert_eq!(settings.parity, SerialParity::None);
        assert_eq!(settings.stop_bits, 1);
    }

    #[test]
    fn test_serial_invalid_settings() {
        let settings = SerialSettings {
            data_bits: 9,
            ..SerialSettings::default()
        };
        assert!(matches!(
            settings.builder("COM1"),
            Err(PrintError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_virtual_ports() {
        assert!(is_virtual_port("FILE:"));
        assert!(is_virtual_port("XPSPort:"));
        assert!(!is_virtual_port("USB001"));
    }

    #[tokio::test]
    async fn test_serial_missing_port_is_unavailable() {
        let printer = SerialPrinter::new("/dev/label-printer-does-not-exist").unwrap();
        let result = printer.print(b"^XA^XZ").await;
        assert!(matches!(result, Err(PrintError::DeviceUnavailable(_))));
        assert!(!printer.is_online().await);
    }

    #[cfg(not(windows))]
    #[tokio::test]
    async fn test_spooler_unsupported_off_windows() {
        let printer = SpoolerPrinter::new("Zebra").unwrap();
        let result = printer.print(b"^XA^XZ").await;
        assert!(matches!(result, Err(PrintError::UnsupportedTransport(_))));
    }
}
