//! Persisted operator settings
//!
//! Remembers the last printer, connection, port and input files between
//! runs. Stored as JSON in `<home>/config.json`. The label core never reads
//! these; only the CLI adapter does.

use std::fs;
use std::path::{Path, PathBuf};

use label_printer::ConnectionKind;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Most recent input files kept
pub const MAX_RECENT_FILES: usize = 5;

const SETTINGS_FILE: &str = "config.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Settings IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings format error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub last_printer: String,
    #[serde(deserialize_with = "or_default")]
    pub last_connection: ConnectionKind,
    pub last_serial_port: String,
    pub last_folder: Option<PathBuf>,
    /// Most recent first
    #[serde(deserialize_with = "or_default")]
    pub recent_files: Vec<PathBuf>,
}

/// Replace an invalid value with its default instead of rejecting the file
fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_else(|e| {
        warn!(error = %e, "Ignoring invalid setting");
        T::default()
    }))
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            last_printer: String::new(),
            last_connection: ConnectionKind::Usb,
            last_serial_port: "COM1".to_string(),
            last_folder: None,
            recent_files: Vec::new(),
        }
    }
}

impl Settings {
    /// Path of the settings file inside a settings folder
    pub fn path_in(home: &Path) -> PathBuf {
        home.join(SETTINGS_FILE)
    }

    /// Load settings, falling back to defaults
    ///
    /// A missing file is normal on first run. An unknown connection kind or
    /// a bad recent-files list resets only that entry; a file that is not
    /// valid JSON is logged and replaced by defaults on the next save.
    pub fn load(home: &Path) -> Self {
        let path = Self::path_in(home);
        if !path.exists() {
            return Self::default();
        }
        match Self::read(&path) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable settings");
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write settings, creating the folder if needed
    pub fn save(&self, home: &Path) -> Result<(), SettingsError> {
        fs::create_dir_all(home)?;
        let path = Self::path_in(home);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content)?;
        info!(path = %path.display(), "Settings saved");
        Ok(())
    }

    /// Record an input file as most recent and remember its folder
    pub fn remember_file(&mut self, file: &Path) {
        if let Some(folder) = file.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.last_folder = Some(folder.to_path_buf());
        }
        self.recent_files.retain(|f| f != file);
        self.recent_files.insert(0, file.to_path_buf());
        self.recent_files.truncate(MAX_RECENT_FILES);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(dir.path());
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.last_serial_port, "COM1");
        assert_eq!(settings.last_connection, ConnectionKind::Usb);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let home = dir.path().join(".etiquetador");

        let mut settings = Settings {
            last_printer: "ZDesigner GK420t".to_string(),
            last_connection: ConnectionKind::Serial,
            ..Settings::default()
        };
        settings.remember_file(Path::new("/data/menus/lunes.csv"));
        settings.save(&home).unwrap();

        let loaded = Settings::load(&home);
        assert_eq!(loaded, settings);
        assert_eq!(loaded.last_folder, Some(PathBuf::from("/data/menus")));
    }

    #[test]
    fn test_partial_file_merges_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            Settings::path_in(dir.path()),
            r#"{"last_printer": "Zebra ZT230", "last_connection": "Paralelo"}"#,
        )
        .unwrap();

        let settings = Settings::load(dir.path());
        assert_eq!(settings.last_printer, "Zebra ZT230");
        assert_eq!(settings.last_connection, ConnectionKind::Parallel);
        assert_eq!(settings.last_serial_port, "COM1");
        assert!(settings.recent_files.is_empty());
    }

    #[test]
    fn test_invalid_entry_keeps_other_settings() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            Settings::path_in(dir.path()),
            r#"{"last_printer": "Zebra ZT230", "last_connection": "Bluetooth",
                "recent_files": ["/menus/lunes.xlsx"]}"#,
        )
        .unwrap();

        let settings = Settings::load(dir.path());
        assert_eq!(settings.last_printer, "Zebra ZT230");
        assert_eq!(settings.last_connection, ConnectionKind::Usb);
        assert_eq!(settings.recent_files, vec![PathBuf::from("/menus/lunes.xlsx")]);

        fs::write(
            Settings::path_in(dir.path()),
            r#"{"last_connection": "Serie", "recent_files": "lunes.xlsx"}"#,
        )
        .unwrap();
        let settings = Settings::load(dir.path());
        assert_eq!(settings.last_connection, ConnectionKind::Serial);
        assert!(settings.recent_files.is_empty());
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(Settings::path_in(dir.path()), "{not json").unwrap();
        assert_eq!(Settings::load(dir.path()), Settings::default());
    }

    #[test]
    fn test_recent_files_bounded_and_deduplicated() {
        let mut settings = Settings::default();
        for i in 0..7 {
            settings.remember_file(Path::new(&format!("/menus/{}.csv", i)));
        }
        settings.remember_file(Path::new("/menus/3.csv"));

        let names: Vec<String> = settings
            .recent_files
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["/menus/3.csv", "/menus/6.csv", "/menus/5.csv", "/menus/4.csv", "/menus/2.csv"]
        );
    }
}
