//! Error types for the printer library

use thiserror::Error;

/// Printer error types
#[derive(Debug, Error)]
pub enum PrintError {
    /// The destination could not be opened (printer missing, port busy)
    #[error("Device unavailable: {0}")]
    DeviceUnavailable(String),

    /// The destination was opened but the write or close failed
    #[error("Transmission failed: {0}")]
    Transmission(String),

    /// Transport kind is unknown or not available on this platform
    #[error("Unsupported transport: {0}")]
    UnsupportedTransport(String),

    /// Invalid destination configuration
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Enumerating OS devices failed
    #[error("Device discovery failed: {0}")]
    Discovery(String),
}

/// Result type for printer operations
pub type PrintResult<T> = Result<T, PrintError>;
