//! Character set utilities for ZPL field data
//!
//! Zebra firmware interprets field bytes according to the `^CI` command:
//! - `^CI28`: UTF-8 (current firmware)
//! - `^CI27`: Windows-1252 (older firmware without UTF-8 support)
//!
//! Widths here are counted in characters, which is what the label
//! layout budgets against (one glyph per character for font 0).

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Character set used for field data
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelEncoding {
    #[default]
    Utf8,
    Windows1252,
}

impl LabelEncoding {
    /// The `^CI` code selecting this character set
    pub fn ci_code(self) -> u8 {
        match self {
            LabelEncoding::Utf8 => 28,
            LabelEncoding::Windows1252 => 27,
        }
    }

    /// Encode a complete document
    ///
    /// Characters with no Windows-1252 mapping are replaced by numeric
    /// character references, which the printer prints literally.
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            LabelEncoding::Utf8 => text.as_bytes().to_vec(),
            LabelEncoding::Windows1252 => {
                let (bytes, _, had_errors) = encoding_rs::WINDOWS_1252.encode(text);
                if had_errors {
                    warn!("Text contains characters outside Windows-1252");
                }
                bytes.into_owned()
            }
        }
    }
}

/// Get the display width of a string in characters
pub fn char_width(s: &str) -> usize {
    s.chars().count()
}

/// Truncate a string to at most `max_width` characters
pub fn truncate_chars(s: &str, max_width: usize) -> String {
    s.chars().take(max_width).collect()
}

/// Make user text safe to place between `^FD` and `^FS`
///
/// `^` and `~` start ZPL commands; they are replaced by spaces.
pub fn sanitize_field(s: &str) -> Cow<'_, str> {
    if s.contains(['^', '~']) {
        Cow::Owned(s.replace(['^', '~'], " "))
    } else {
        Cow::Borrowed(s)
    }
}
