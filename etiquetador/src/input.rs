//! Tabular input loading
//!
//! Reads the menu spreadsheet, either the workbook itself (`.xlsx`, `.xls`,
//! `.ods`; first sheet) or a CSV export. Every cell is kept as text so codes
//! such as `000123` keep their leading zeros; whole numbers stored as
//! numeric cells read as `123`, not `123.0`.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use thiserror::Error;
use tracing::{info, instrument};

use crate::labels::RawRecord;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Cannot open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Workbook has no sheets")]
    NoSheet,

    #[error("No header row after skipping {0} rows")]
    MissingHeader(usize),
}

pub type InputResult<T> = Result<T, InputError>;

/// File format, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Workbook,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => InputFormat::Workbook,
            _ => InputFormat::Csv,
        }
    }

    /// Title rows above the header: the menu workbook has one, CSV exports none
    pub fn default_skip_rows(self) -> usize {
        match self {
            InputFormat::Csv => 0,
            InputFormat::Workbook => 1,
        }
    }
}

/// How to read the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputOptions {
    /// CSV field separator (`,` or `;` for spreadsheets saved with a Spanish locale)
    pub delimiter: u8,
    /// Rows above the header row (titles), skipped
    pub skip_rows: usize,
}

impl InputOptions {
    /// Defaults for the format of `path`
    pub fn for_path(path: &Path) -> Self {
        Self {
            skip_rows: InputFormat::from_path(path).default_skip_rows(),
            ..Self::default()
        }
    }
}

impl Default for InputOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            skip_rows: 0,
        }
    }
}

/// Load every data row of a workbook or CSV file
#[instrument(skip(options), fields(path = %path.display()))]
pub fn load_records(path: &Path, options: &InputOptions) -> InputResult<Vec<RawRecord>> {
    let records = match InputFormat::from_path(path) {
        InputFormat::Workbook => read_workbook(path, options)?,
        InputFormat::Csv => {
            let file = File::open(path).map_err(|source| InputError::Open {
                path: path.display().to_string(),
                source,
            })?;
            read_records(file, options)?
        }
    };
    info!(rows = records.len(), "Input loaded");
    Ok(records)
}

/// Read data rows from any CSV source
pub fn read_records<R: Read>(reader: R, options: &InputOptions) -> InputResult<Vec<RawRecord>> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(options.delimiter)
        .from_reader(reader);

    let rows = csv.records().map(|row| {
        row.map(|r| r.iter().map(str::to_string).collect::<Vec<_>>())
            .map_err(InputError::from)
    });
    collect_records(rows, options.skip_rows)
}

/// Read data rows from the first sheet of a workbook
fn read_workbook(path: &Path, options: &InputOptions) -> InputResult<Vec<RawRecord>> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet = workbook.worksheet_range_at(0).ok_or(InputError::NoSheet)??;

    // The range starts at the first used cell; blank leading rows still count
    // towards the title rows.
    let blank_rows = sheet.start().map_or(0, |(row, _)| row as usize);
    let rows = std::iter::repeat_with(Vec::new)
        .take(blank_rows)
        .chain(sheet.rows().map(|row| row.iter().map(cell_text).collect()))
        .map(Ok);
    collect_records(rows, options.skip_rows)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => (*f as i64).to_string(),
        other => other.to_string(),
    }
}

/// Turn rows of cells into records keyed by the header row
fn collect_records<I>(rows: I, skip_rows: usize) -> InputResult<Vec<RawRecord>>
where
    I: Iterator<Item = InputResult<Vec<String>>>,
{
    let mut rows = rows.skip(skip_rows);

    let header: Vec<String> = match rows.next() {
        Some(row) => row?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect(),
        None => return Err(InputError::MissingHeader(skip_rows)),
    };

    let mut records = Vec::new();
    for row in rows {
        let row = row?;
        let record: RawRecord = header
            .iter()
            .zip(row)
            .filter(|(name, _)| !name.is_empty())
            .map(|(name, value)| (name.clone(), value))
            .collect();
        records.push(record);
    }

    Ok(records)
}

/// Keep only the selected rows (1-based data row numbers)
///
/// Returns the kept records with their original row numbers. Numbers out
/// of range are ignored; duplicates are kept once.
pub fn select_rows(records: Vec<RawRecord>, rows: &[usize]) -> (Vec<RawRecord>, Vec<usize>) {
    records
        .into_iter()
        .enumerate()
        .map(|(i, r)| (i + 1, r))
        .filter(|(n, _)| rows.contains(n))
        .map(|(n, r)| (r, n))
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SHEET: &str = "\
Código del menú,Nombre del menú,Nombre de empleado
000123,Sopa del día,Maria Lopez
,Sin código,Pedro Gil
45,\"Arroz, con pollo\",Ana
";

    #[test]
    fn test_read_records() {
        let records = read_records(SHEET.as_bytes(), &InputOptions::default()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["Código del menú"], "000123");
        assert_eq!(records[0]["Nombre de empleado"], "Maria Lopez");
        assert_eq!(records[1]["Código del menú"], "");
        assert_eq!(records[2]["Nombre del menú"], "Arroz, con pollo");
    }

    #[test]
    fn test_title_rows_and_semicolons() {
        let data = "Menús semana 12;;\nCódigo del menú;Nombre del menú;Nombre de empleado\n7;Paella;Luis\n";
        let options = InputOptions {
            delimiter: b';',
            skip_rows: 1,
        };
        let records = read_records(data.as_bytes(), &options).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["Nombre del menú"], "Paella");
    }

    #[test]
    fn test_short_rows_omit_missing_cells() {
        let data = "\u{feff}Código del menú,Nombre del menú,Nombre de empleado\n9\n";
        let records = read_records(data.as_bytes(), &InputOptions::default()).unwrap();
        assert_eq!(records[0].len(), 1);
        assert_eq!(records[0]["Código del menú"], "9");
    }

    #[test]
    fn test_missing_header() {
        let result = read_records("".as_bytes(), &InputOptions::default());
        assert!(matches!(result, Err(InputError::MissingHeader(0))));
    }

    #[test]
    fn test_load_records_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SHEET.as_bytes()).unwrap();

        let records = load_records(file.path(), &InputOptions::default()).unwrap();
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_records(Path::new("/nonexistent/menus.csv"), &InputOptions::default());
        assert!(matches!(result, Err(InputError::Open { .. })));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(InputFormat::from_path(Path::new("menus.xlsx")), InputFormat::Workbook);
        assert_eq!(InputFormat::from_path(Path::new("MENUS.XLS")), InputFormat::Workbook);
        assert_eq!(InputFormat::from_path(Path::new("menus.csv")), InputFormat::Csv);
        assert_eq!(InputFormat::from_path(Path::new("menus")), InputFormat::Csv);

        assert_eq!(InputOptions::for_path(Path::new("menus.xlsx")).skip_rows, 1);
        assert_eq!(InputOptions::for_path(Path::new("menus.csv")).skip_rows, 0);
    }

    #[test]
    fn test_numeric_cells_as_text() {
        assert_eq!(cell_text(&Data::Float(123.0)), "123");
        assert_eq!(cell_text(&Data::Float(12.5)), "12.5");
        assert_eq!(cell_text(&Data::Int(45)), "45");
        assert_eq!(cell_text(&Data::String("000045".to_string())), "000045");
        assert_eq!(cell_text(&Data::Empty), "");
    }

    #[test]
    fn test_missing_workbook() {
        let result = load_records(Path::new("/nonexistent/menus.xlsx"), &InputOptions::default());
        assert!(matches!(result, Err(InputError::Workbook(_))));
    }

    #[test]
    fn test_select_rows() {
        let records = read_records(SHEET.as_bytes(), &InputOptions::default()).unwrap();
        let (kept, numbers) = select_rows(records, &[3, 1, 9]);
        assert_eq!(numbers, vec![1, 3]);
        assert_eq!(kept[1]["Código del menú"], "45");
    }
}
