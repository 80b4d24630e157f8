//! Label data types

use std::borrow::Cow;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Placeholder printed for blank menu and employee names
pub const PLACEHOLDER: &str = "Sin especificar";

/// Digits carried by the barcode; the printer appends the EAN-13 check digit
pub const CODE_LENGTH: usize = 12;

/// Characters per menu line on the label
pub const MENU_LINE_WIDTH: usize = 30;

/// One input row: column header → cell text
///
/// Columns may be missing; cells are never interpreted as numbers.
pub type RawRecord = HashMap<String, String>;

/// Column headers for the three fields a label needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldNames {
    pub code: String,
    pub menu: String,
    pub employee: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            code: "Código del menú".to_string(),
            menu: "Nombre del menú".to_string(),
            employee: "Nombre de empleado".to_string(),
        }
    }
}

/// A record ready for rendering
///
/// Built only by [`RecordNormalizer`](super::RecordNormalizer); read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRecord {
    pub(crate) code: String,
    pub(crate) employee_name: String,
    pub(crate) menu_line1: String,
    pub(crate) menu_line2: String,
}

impl LabelRecord {
    /// Zero-padded barcode digits
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Employee name as "SURNAME, GIVEN NAMES"
    pub fn employee_name(&self) -> &str {
        &self.employee_name
    }

    pub fn menu_line1(&self) -> &str {
        &self.menu_line1
    }

    /// Empty when the menu name fits on one line
    pub fn menu_line2(&self) -> &str {
        &self.menu_line2
    }
}

/// A rendered label, encoded for the printer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelDocument(Vec<u8>);

impl LabelDocument {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Document text (lossy for non UTF-8 character sets)
    pub fn to_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }
}
