//! Transport destinations
//!
//! A destination names one physical printer and carries only the
//! configuration its transport needs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{PrintError, PrintResult};
use crate::printer::{Printer, SerialPrinter, SerialSettings, SpoolerPrinter};

/// How the printer is attached, as chosen by the operator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionKind {
    #[default]
    #[serde(rename = "USB")]
    Usb,
    #[serde(rename = "Paralelo")]
    Parallel,
    #[serde(rename = "Serie")]
    Serial,
}

impl ConnectionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionKind::Usb => "USB",
            ConnectionKind::Parallel => "Paralelo",
            ConnectionKind::Serial => "Serie",
        }
    }

    /// Build the destination for this connection kind
    ///
    /// USB and parallel printers are both reached through the spooler;
    /// serial printers are written to directly on `port`.
    pub fn destination(self, printer: &str, port: &str) -> PrintResult<TransportDestination> {
        match self {
            ConnectionKind::Usb | ConnectionKind::Parallel => {
                TransportDestination::spooler(printer)
            }
            ConnectionKind::Serial => TransportDestination::serial(port),
        }
    }
}

impl FromStr for ConnectionKind {
    type Err = PrintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "usb" => Ok(ConnectionKind::Usb),
            "paralelo" | "parallel" => Ok(ConnectionKind::Parallel),
            "serie" | "serial" => Ok(ConnectionKind::Serial),
            other => Err(PrintError::UnsupportedTransport(format!(
                "Unknown connection type: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for ConnectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a rendered label is sent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransportDestination {
    /// Named print queue, written as a RAW job
    Spooler { printer: String },
    /// Serial port with fixed line settings
    Serial {
        port: String,
        #[serde(default)]
        settings: SerialSettings,
    },
}

impl TransportDestination {
    /// Spooler destination for a printer name
    pub fn spooler(printer: &str) -> PrintResult<Self> {
        let printer = SpoolerPrinter::new(printer)?;
        Ok(TransportDestination::Spooler {
            printer: printer.name().to_string(),
        })
    }

    /// Serial destination at 9600 8N1
    pub fn serial(port: &str) -> PrintResult<Self> {
        let printer = SerialPrinter::new(port)?;
        Ok(TransportDestination::Serial {
            port: printer.port().to_string(),
            settings: *printer.settings(),
        })
    }

    /// Printer or port name
    pub fn name(&self) -> &str {
        match self {
            TransportDestination::Spooler { printer } => printer,
            TransportDestination::Serial { port, .. } => port,
        }
    }

    /// Send one document as a single job, with a single attempt
    #[instrument(skip(data), fields(destination = %self, data_len = data.len()))]
    pub async fn send(&self, data: &[u8]) -> PrintResult<()> {
        match self {
            TransportDestination::Spooler { printer } => {
                SpoolerPrinter::new(printer)?.print(data).await
            }
            TransportDestination::Serial { port, settings } => {
                SerialPrinter::new(port)?
                    .with_settings(*settings)
                    .print(data)
                    .await
            }
        }
    }

    /// Check whether the destination can be opened right now
    pub async fn is_online(&self) -> bool {
        match self {
            TransportDestination::Spooler { printer } => match SpoolerPrinter::new(printer) {
                Ok(p) => p.is_online().await,
                Err(_) => false,
            },
            TransportDestination::Serial { port, settings } => match SerialPrinter::new(port) {
                Ok(p) => p.with_settings(*settings).is_online().await,
                Err(_) => false,
            },
        }
    }
}

impl fmt::Display for TransportDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportDestination::Spooler { printer } => write!(f, "spooler:{}", printer),
            TransportDestination::Serial { port, settings } => {
                write!(f, "serial:{}@{}", port, settings.baud_rate)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_kind_parse() {
        assert_eq!("USB".parse::<ConnectionKind>().unwrap(), ConnectionKind::Usb);
        assert_eq!(
            "paralelo".parse::<ConnectionKind>().unwrap(),
            ConnectionKind::Parallel
        );
        assert_eq!(
            " Serie ".parse::<ConnectionKind>().unwrap(),
            ConnectionKind::Serial
        );
        assert_eq!(
            "serial".parse::<ConnectionKind>().unwrap(),
            ConnectionKind::Serial
        );
    }

    #[test]
    fn test_unknown_connection_kind() {
        let result = "Bluetooth".parse::<ConnectionKind>();
        assert!(matches!(result, Err(PrintError::UnsupportedTransport(_))));
    }

    #[test]
    fn test_kind_to_destination() {
        let usb = ConnectionKind::Usb.destination("ZDesigner", "COM1").unwrap();
        assert_eq!(
            usb,
            TransportDestination::Spooler {
                printer: "ZDesigner".to_string()
            }
        );

        let serial = ConnectionKind::Serial.destination("", "COM3").unwrap();
        assert_eq!(serial.name(), "COM3");
        assert_eq!(serial.to_string(), "serial:COM3@9600");
    }

    #[test]
    fn test_empty_destination_rejected() {
        assert!(matches!(
            ConnectionKind::Parallel.destination("", "COM1"),
            Err(PrintError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_destination_serde() {
        let dest = TransportDestination::serial("COM2").unwrap();
        let json = serde_json::to_string(&dest).unwrap();
        assert!(json.contains("\"kind\":\"serial\""));
        let back: TransportDestination = serde_json::from_str(&json).unwrap();
        assert_eq!(back, dest);

        let kind: ConnectionKind = serde_json::from_str("\"Paralelo\"").unwrap();
        assert_eq!(kind, ConnectionKind::Parallel);
    }
}
