use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use label_printer::{
    ConnectionKind, TransportDestination, list_label_printers, list_serial_ports,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use etiquetador::input::{InputOptions, load_records, select_rows};
use etiquetador::{
    BatchPrinter, BatchProgress, Config, FieldNames, LabelRenderer, RawRecord, RecordNormalizer,
    Settings, logger,
};

#[derive(Parser)]
#[command(name = "etiquetador", version, about = "Print meal labels on Zebra printers")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print one label per row of a menu file
    Print {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        destination: DestinationArgs,
        /// Expiration date (YYYY-MM-DD), today or later
        #[arg(long)]
        expires: NaiveDate,
        /// Only print these data rows (1-based, comma separated)
        #[arg(long, value_delimiter = ',')]
        rows: Vec<usize>,
    },
    /// Write the ZPL documents for a menu file without printing
    Preview {
        #[command(flatten)]
        input: InputArgs,
        /// Expiration date (YYYY-MM-DD)
        #[arg(long)]
        expires: NaiveDate,
        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List label printers and serial ports
    Devices,
    /// Check that the printer can be reached
    Check {
        #[command(flatten)]
        destination: DestinationArgs,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Menu workbook (.xlsx, .xls, .ods) or CSV export
    #[arg(long)]
    file: PathBuf,
    /// Title rows above the header row (default: 1 for workbooks, 0 for CSV)
    #[arg(long)]
    skip_rows: Option<usize>,
    /// CSV field separator
    #[arg(long, default_value_t = ',')]
    delimiter: char,
    #[arg(long, default_value = "Código del menú")]
    code_field: String,
    #[arg(long, default_value = "Nombre del menú")]
    menu_field: String,
    #[arg(long, default_value = "Nombre de empleado")]
    employee_field: String,
}

impl InputArgs {
    fn input_options(&self) -> anyhow::Result<InputOptions> {
        if !self.delimiter.is_ascii() {
            bail!("Delimiter must be an ASCII character");
        }
        let defaults = InputOptions::for_path(&self.file);
        Ok(InputOptions {
            delimiter: self.delimiter as u8,
            skip_rows: self.skip_rows.unwrap_or(defaults.skip_rows),
        })
    }

    fn field_names(&self) -> FieldNames {
        FieldNames {
            code: self.code_field.clone(),
            menu: self.menu_field.clone(),
            employee: self.employee_field.clone(),
        }
    }

    fn load(&self) -> anyhow::Result<Vec<RawRecord>> {
        load_records(&self.file, &self.input_options()?)
            .with_context(|| format!("Cannot read {}", self.file.display()))
    }
}

#[derive(Args)]
struct DestinationArgs {
    /// USB, Paralelo or Serie (defaults to the last one used)
    #[arg(long)]
    connection: Option<String>,
    /// Printer name for USB and parallel connections
    #[arg(long)]
    printer: Option<String>,
    /// Serial port for serial connections
    #[arg(long)]
    port: Option<String>,
}

impl DestinationArgs {
    /// Resolve the destination, filling gaps from saved settings
    fn resolve(&self, settings: &Settings) -> anyhow::Result<(ConnectionKind, TransportDestination)> {
        let connection = match &self.connection {
            Some(name) => name.parse::<ConnectionKind>()?,
            None => settings.last_connection,
        };
        let printer = self.printer.as_deref().unwrap_or(&settings.last_printer);
        let port = self.port.as_deref().unwrap_or(&settings.last_serial_port);

        let destination = connection
            .destination(printer, port)
            .context("No printer selected")?;
        Ok((connection, destination))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env();
    logger::init_logger(&config.log_level, config.log_json, config.log_dir.as_deref())?;

    match cli.command {
        Command::Print {
            input,
            destination,
            expires,
            rows,
        } => print(&config, &input, &destination, expires, &rows).await,
        Command::Preview {
            input,
            expires,
            out,
        } => preview(&config, &input, expires, out.as_deref()),
        Command::Devices => devices(),
        Command::Check { destination } => check(&config, &destination).await,
    }
}

async fn print(
    config: &Config,
    input: &InputArgs,
    destination_args: &DestinationArgs,
    expires: NaiveDate,
    rows: &[usize],
) -> anyhow::Result<()> {
    let today = Local::now().date_naive();
    if expires < today {
        bail!("Expiration date {} is before today", expires);
    }

    let mut settings = Settings::load(&config.home);
    let (connection, destination) = destination_args.resolve(&settings)?;
    ensure_printer_installed(&destination)?;

    let records = input.load()?;
    let (records, row_numbers) = if rows.is_empty() {
        let numbers = (1..=records.len()).collect();
        (records, numbers)
    } else {
        select_rows(records, rows)
    };

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing current label");
            ctrl_c.cancel();
        }
    });

    let batch = BatchPrinter::with_devices(
        RecordNormalizer::new(input.field_names()),
        renderer(config),
    )
    .with_cancel(cancel);
    let total = batch.preflight(&records)?;
    info!(total, destination = %destination, "Printing labels");

    let result = batch
        .run_with_progress(&records, &destination, today, expires, report_progress)
        .await;
    eprintln!();

    for failure in &result.failures {
        let row = row_numbers.get(failure.index).copied().unwrap_or(failure.index + 1);
        eprintln!(
            "No se pudo imprimir la etiqueta para {} (fila {}, código {}): {}",
            failure.employee, row, failure.code, failure.reason
        );
    }

    settings.last_connection = connection;
    match &destination {
        TransportDestination::Spooler { printer } => settings.last_printer = printer.clone(),
        TransportDestination::Serial { port, .. } => settings.last_serial_port = port.clone(),
    }
    settings.remember_file(&input.file);
    if let Err(e) = settings.save(&config.home) {
        warn!(error = %e, "Could not save settings");
    }

    if result.cancelled {
        println!("Impresión interrumpida.");
    }
    if result.sent > 0 {
        println!(
            "Se imprimieron {} de {} etiquetas en '{}'.",
            result.sent,
            result.attempted,
            destination.name()
        );
        Ok(())
    } else if result.attempted > 0 {
        bail!("No se pudieron imprimir etiquetas en la impresora.")
    } else {
        Ok(())
    }
}

fn report_progress(progress: BatchProgress) {
    eprint!("\r{}", progress_line(progress));
    let _ = std::io::stderr().flush();
}

/// Labels sent so far against the printable rows
fn progress_line(progress: BatchProgress) -> String {
    format!("Imprimiendo etiquetas: {}/{}", progress.sent, progress.total)
}

/// A printer chosen earlier may have been removed (or was never a label
/// printer) since
fn ensure_printer_installed(destination: &TransportDestination) -> anyhow::Result<()> {
    let TransportDestination::Spooler { printer } = destination else {
        return Ok(());
    };
    if !cfg!(windows) {
        return Ok(());
    }
    ensure_listed(printer, &list_label_printers()?)
}

fn ensure_listed(printer: &str, label_printers: &[String]) -> anyhow::Result<()> {
    if !label_printers.iter().any(|p| p == printer) {
        bail!("La impresora '{}' ya no está disponible", printer);
    }
    Ok(())
}

fn preview(
    config: &Config,
    input: &InputArgs,
    expires: NaiveDate,
    out: Option<&Path>,
) -> anyhow::Result<()> {
    let records = input.load()?;
    let normalizer = RecordNormalizer::new(input.field_names());
    let renderer = renderer(config);
    let today = Local::now().date_naive();

    let mut zpl = Vec::new();
    for label in records.iter().filter_map(|r| normalizer.normalize(r)) {
        zpl.extend_from_slice(renderer.render(&label, today, expires).as_bytes());
    }

    match out {
        Some(path) => std::fs::write(path, &zpl)
            .with_context(|| format!("Cannot write {}", path.display()))?,
        None => std::io::stdout().write_all(&zpl)?,
    }
    Ok(())
}

fn devices() -> anyhow::Result<()> {
    let printers = list_label_printers()?;
    if printers.is_empty() {
        println!("No se encontraron impresoras Zebra");
    } else {
        println!("Impresoras:");
        for name in printers {
            println!("  {}", name);
        }
    }

    let ports = list_serial_ports()?;
    println!("Puertos serie:");
    for port in ports {
        println!("  {}", port);
    }
    Ok(())
}

async fn check(config: &Config, destination_args: &DestinationArgs) -> anyhow::Result<()> {
    let settings = Settings::load(&config.home);
    let (_, destination) = destination_args.resolve(&settings)?;

    if destination.is_online().await {
        println!("Impresora '{}' conectada.", destination.name());
        Ok(())
    } else {
        bail!(
            "No se puede conectar con la impresora '{}'. Verifique que esté encendida y conectada.",
            destination.name()
        )
    }
}

fn renderer(config: &Config) -> LabelRenderer {
    LabelRenderer::new(&config.location).with_encoding(config.encoding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use label_printer::filter_label_printers;

    #[test]
    fn test_progress_counts_sent_labels() {
        let progress = BatchProgress {
            sent: 2,
            attempted: 3,
            total: 5,
        };
        assert_eq!(progress_line(progress), "Imprimiendo etiquetas: 2/5");
    }

    #[test]
    fn test_saved_printer_must_be_a_label_printer() {
        let installed = filter_label_printers(["Microsoft Print to PDF", "ZDesigner GK420t"]);
        assert!(ensure_listed("ZDesigner GK420t", &installed).is_ok());
        assert!(ensure_listed("Microsoft Print to PDF", &installed).is_err());
        assert!(ensure_listed("Zebra ZT230", &installed).is_err());
    }
}
