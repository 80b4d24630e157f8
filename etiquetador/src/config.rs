use std::path::PathBuf;

use label_printer::LabelEncoding;

use crate::labels::renderer::DEFAULT_LOCATION;

/// Application configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | ETIQUETADOR_HOME | ~/.etiquetador | Settings folder |
/// | LOG_LEVEL | info | Log level |
/// | LOG_JSON | false | JSON log output |
/// | LOG_DIR | (none) | Daily rolling log files |
/// | LABEL_LOCATION | LUGAR: Comedor Bella Italia | Label header caption |
/// | LABEL_CHARSET | utf8 | `utf8` or `cp1252` |
#[derive(Debug, Clone)]
pub struct Config {
    /// Folder holding config.json
    pub home: PathBuf,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
    pub location: String,
    pub encoding: LabelEncoding,
}

impl Config {
    /// Load configuration from the environment, using defaults for unset values
    pub fn from_env() -> Self {
        Self {
            home: std::env::var("ETIQUETADOR_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_home()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            location: std::env::var("LABEL_LOCATION").unwrap_or_else(|_| DEFAULT_LOCATION.into()),
            encoding: std::env::var("LABEL_CHARSET")
                .ok()
                .and_then(|v| parse_encoding(&v))
                .unwrap_or_default(),
        }
    }
}

fn default_home() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".etiquetador")
}

/// Parse a character set name
pub fn parse_encoding(name: &str) -> Option<LabelEncoding> {
    match name.trim().to_lowercase().as_str() {
        "utf8" | "utf-8" => Some(LabelEncoding::Utf8),
        "cp1252" | "windows-1252" | "latin1" => Some(LabelEncoding::Windows1252),
        _ => None,
    }
}
