//! Record normalization
//!
//! Validates one raw row and derives the fields printed on the label.

use tracing::debug;

use super::types::{CODE_LENGTH, FieldNames, LabelRecord, MENU_LINE_WIDTH, PLACEHOLDER, RawRecord};
use super::wrap::wrap_two_lines;

/// Turns raw rows into label records
#[derive(Debug, Clone)]
pub struct RecordNormalizer {
    fields: FieldNames,
    line_width: usize,
}

impl RecordNormalizer {
    /// Create a normalizer reading the given columns
    pub fn new(fields: FieldNames) -> Self {
        Self {
            fields,
            line_width: MENU_LINE_WIDTH,
        }
    }

    /// Set the menu line width in characters
    pub fn with_line_width(mut self, line_width: usize) -> Self {
        self.line_width = line_width;
        self
    }

    /// True when the row carries a non-blank code
    pub fn has_code(&self, record: &RawRecord) -> bool {
        !field(record, &self.fields.code).is_empty()
    }

    /// Build the label record for a row
    ///
    /// Returns `None` when the code is blank: such a row is not a label.
    pub fn normalize(&self, record: &RawRecord) -> Option<LabelRecord> {
        let code = field(record, &self.fields.code);
        if code.is_empty() {
            debug!("Row without menu code skipped");
            return None;
        }

        let menu = or_placeholder(field(record, &self.fields.menu));
        let employee = or_placeholder(field(record, &self.fields.employee));
        let (menu_line1, menu_line2) = wrap_two_lines(menu, self.line_width);

        Some(LabelRecord {
            code: pad_code(code),
            employee_name: format_employee_name(employee),
            menu_line1,
            menu_line2,
        })
    }
}

impl Default for RecordNormalizer {
    fn default() -> Self {
        Self::new(FieldNames::default())
    }
}

/// Left-pad a code with zeros to 12 characters
///
/// Longer codes are returned unchanged; the barcode command rejects them
/// at the printer rather than having digits silently dropped here.
pub fn pad_code(code: &str) -> String {
    let width = code.chars().count();
    if width >= CODE_LENGTH {
        return code.to_string();
    }
    format!("{}{}", "0".repeat(CODE_LENGTH - width), code)
}

/// Format a name as "SURNAME, GIVEN NAMES" in upper case
///
/// Names already containing a comma are only upper-cased. Otherwise the
/// last word is taken as the surname.
pub fn format_employee_name(name: &str) -> String {
    if name.contains(',') {
        return name.to_uppercase();
    }

    let parts: Vec<&str> = name.split_whitespace().collect();
    match parts.split_last() {
        Some((surname, given)) if !given.is_empty() => {
            format!("{}, {}", surname.to_uppercase(), given.join(" ").to_uppercase())
        }
        _ => name.to_uppercase(),
    }
}

fn field<'a>(record: &'a RawRecord, name: &str) -> &'a str {
    record.get(name).map(|v| v.trim()).unwrap_or("")
}

fn or_placeholder(value: &str) -> &str {
    if value.is_empty() { PLACEHOLDER } else { value }
}
