//! End-to-end: spreadsheet rows → labels → transport

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::NaiveDate;
use etiquetador::input::{InputOptions, load_records, read_records};
use etiquetador::{
    BatchPrinter, LabelDocument, LabelRenderer, LabelTransport, RecordNormalizer,
};
use label_printer::{PrintError, PrintResult, TransportDestination};

#[derive(Default)]
struct CapturingTransport {
    documents: Mutex<Vec<(String, String)>>,
}

impl LabelTransport for CapturingTransport {
    async fn send(&self, document: &LabelDocument, destination: &TransportDestination) -> PrintResult<()> {
        let text = document.to_text().into_owned();
        if text.contains("OFFLINE") {
            return Err(PrintError::DeviceUnavailable(destination.name().to_string()));
        }
        self.documents
            .lock()
            .unwrap()
            .push((destination.to_string(), text));
        Ok(())
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_reference_record() {
    let csv = "Código del menú,Nombre del menú,Nombre de empleado\n\
123,Pasta Boloñesa con salsa de tomate y albahaca fresca,Maria Lopez\n";
    let records = read_records(csv.as_bytes(), &InputOptions::default()).unwrap();

    let label = RecordNormalizer::default().normalize(&records[0]).unwrap();
    assert_eq!(label.code(), "000000000123");
    assert_eq!(label.employee_name(), "LOPEZ, MARIA");
    assert_eq!(label.menu_line1(), "Pasta Boloñesa con salsa de");
    assert_eq!(label.menu_line2(), "tomate y albahaca fresca");

    let document = LabelRenderer::default().render(&label, date(2024, 5, 30), date(2024, 6, 1));
    let text = document.to_text();
    assert!(text.starts_with("^XA\n"));
    assert!(text.ends_with("^XZ\n"));
    assert!(text.contains("VENC: 01/06/2024"));
    assert!(text.contains("ELAB: 30/05/2024"));
    assert!(text.contains("^FD000000000123^FS"));
}

#[tokio::test]
async fn test_batch_from_spreadsheet() {
    let csv = "Menús de la semana,,\n\
Código del menú,Nombre del menú,Nombre de empleado\n\
1,Lentejas,Luis Alfa\n\
,Fila sin código,Nadie\n\
2,Menu OFFLINE,Ana Beta\n\
3,Paella,Eva Gamma\n";
    let options = InputOptions {
        skip_rows: 1,
        ..InputOptions::default()
    };
    let records = read_records(csv.as_bytes(), &options).unwrap();
    assert_eq!(records.len(), 4);

    let batch = BatchPrinter::new(
        CapturingTransport::default(),
        RecordNormalizer::default(),
        LabelRenderer::default(),
    );
    assert_eq!(batch.preflight(&records).unwrap(), 3);

    let destination = TransportDestination::serial("COM4").unwrap();
    let result = batch
        .run(&records, &destination, date(2024, 5, 30), date(2024, 6, 1))
        .await;

    assert_eq!(result.attempted, 3);
    assert_eq!(result.sent, 2);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].index, 2);
    assert!(matches!(
        result.failures[0].reason,
        PrintError::DeviceUnavailable(_)
    ));

    let documents = batch.transport().documents.lock().unwrap();
    assert_eq!(documents.len(), 2);
    assert!(documents.iter().all(|(dest, _)| dest == "serial:COM4@9600"));
    assert!(documents[0].1.contains("ALFA, LUIS"));
    assert!(documents[1].1.contains("GAMMA, EVA"));
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_workbook_with_title_row() {
    let path = fixture("menus.xlsx");
    let records = load_records(&path, &InputOptions::for_path(&path)).unwrap();
    assert_eq!(records.len(), 3);

    // Numeric cell 123 and text cell "000045"
    assert_eq!(records[0]["Código del menú"], "123");
    assert_eq!(records[1]["Código del menú"], "000045");
    assert_eq!(records[2]["Código del menú"], "");

    let normalizer = RecordNormalizer::default();
    let first = normalizer.normalize(&records[0]).unwrap();
    assert_eq!(first.code(), "000000000123");
    assert_eq!(first.employee_name(), "LOPEZ, MARIA");
    assert_eq!(first.menu_line1(), "Pasta Boloñesa con salsa de");
    assert_eq!(normalizer.normalize(&records[1]).unwrap().code(), "000000000045");

    let batch = BatchPrinter::new(
        CapturingTransport::default(),
        normalizer,
        LabelRenderer::default(),
    );
    assert_eq!(batch.preflight(&records).unwrap(), 2);
}
