use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use soxdash_model::Domain;
use tracing::error;
use uuid::Uuid;

use crate::config::Config;
use crate::session::{DashboardError, Session, Severity};

#[derive(Clone, Debug, ValueEnum)]
enum DownloadFormat {
    Csv,
    Xlsx,
}

#[derive(Parser)]
#[command(
    name = "soxdash",
    about = "SOX/MICS compliance dashboard: upload, list, delete and export per-domain spreadsheets."
)]
pub struct Args {
    /// Store to operate on. Defaults to the Control Status domain.
    #[arg(long, global = true, default_value = "control-status")]
    store: Domain,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the four stores; the active one is marked.
    Stores,
    /// Validate a spreadsheet (.xlsx or .csv) and persist it as one upload batch.
    Upload {
        /// Spreadsheet file to ingest.
        file: PathBuf,
    },
    /// Print stored rows, optionally restricted to one upload batch.
    List {
        /// Only rows belonging to this upload id.
        #[arg(long = "upload-id")]
        upload_id: Option<Uuid>,

        /// Exact-match column filter, `COLUMN=VALUE`. Repeatable.
        #[arg(long = "filter")]
        filters: Vec<String>,
    },
    /// Print one line per upload batch (id, file, timestamp, row count).
    Summary,
    /// Delete every row of one upload batch.
    Delete {
        upload_id: Uuid,
    },
    /// Write stored rows to a CSV or XLSX file.
    Export {
        #[arg(value_enum)]
        format: DownloadFormat,

        /// Output file path.
        #[arg(long)]
        out: PathBuf,

        /// Only rows belonging to this upload id.
        #[arg(long = "upload-id")]
        upload_id: Option<Uuid>,

        /// Exact-match column filter, `COLUMN=VALUE`. Repeatable.
        #[arg(long = "filter")]
        filters: Vec<String>,
    },
}

pub fn run() -> Result<ExitCode> {
    let args = Args::parse();
    let config = Config::from_env();
    // The non-blocking appender only flushes when this guard drops, so every
    // path out of this function must return rather than call process::exit.
    let _log_guard = crate::logging::init(&config)?;

    let mut session = Session::open(&config)
        .map_err(|err| anyhow::anyhow!("failed to open stores: {err}"))?;
    session.select(args.store);

    match execute(&session, &args.command) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(CommandError::Dashboard { operation, source }) => {
            error!(
                operation,
                store = session.active().label(),
                %source,
                "operation failed"
            );
            let prefix = match source.severity() {
                Severity::Warning => "warning",
                Severity::Error => "error",
            };
            eprintln!("{prefix}: {}", source.user_message());
            Ok(ExitCode::FAILURE)
        }
        Err(CommandError::Other(err)) => Err(err),
    }
}

enum CommandError {
    Dashboard {
        operation: &'static str,
        source: DashboardError,
    },
    Other(anyhow::Error),
}

impl From<anyhow::Error> for CommandError {
    fn from(err: anyhow::Error) -> Self {
        CommandError::Other(err)
    }
}

fn dashboard(operation: &'static str) -> impl Fn(DashboardError) -> CommandError {
    move |source| CommandError::Dashboard { operation, source }
}

fn execute(session: &Session, command: &Command) -> std::result::Result<(), CommandError> {
    match command {
        Command::Stores => {
            for domain in Domain::ALL {
                let marker = if domain == session.active() { "*" } else { " " };
                println!("{marker} {:<16} {}", domain.slug(), domain.label());
            }
            Ok(())
        }
        Command::Upload { file } => {
            let batch = session.upload(file).map_err(dashboard("upload"))?;
            println!(
                "saved {} rows to {} as upload {}",
                batch.row_count,
                session.active().label(),
                batch.upload_id
            );
            Ok(())
        }
        Command::List { upload_id, filters } => {
            let filters = parse_filters(filters)?;
            let table = session
                .list(*upload_id, &filters)
                .map_err(dashboard("list"))?;
            print_table(&table);
            Ok(())
        }
        Command::Summary => {
            let batches = session.summary().map_err(dashboard("summary"))?;
            if batches.is_empty() {
                println!("no uploads in {}", session.active().label());
                return Ok(());
            }
            for batch in batches {
                println!(
                    "{}  {}  {} rows  {}",
                    batch.upload_id,
                    batch.uploaded_at.to_rfc3339(),
                    batch.row_count,
                    batch.filename
                );
            }
            Ok(())
        }
        Command::Delete { upload_id } => {
            let deleted = session.delete(*upload_id).map_err(dashboard("delete"))?;
            println!(
                "deleted {deleted} rows of upload {upload_id} from {}",
                session.active().label()
            );
            Ok(())
        }
        Command::Export {
            format,
            out,
            upload_id,
            filters,
        } => {
            let filters = parse_filters(filters)?;
            let bytes = match format {
                DownloadFormat::Csv => session.export_csv(*upload_id, &filters),
                DownloadFormat::Xlsx => session.export_xlsx(*upload_id, &filters),
            }
            .map_err(dashboard("export"))?;
            std::fs::write(out, &bytes)
                .with_context(|| format!("write {}", out.display()))
                .map_err(CommandError::Other)?;
            println!("wrote {} bytes to {}", bytes.len(), out.display());
            Ok(())
        }
    }
}

fn parse_filters(raw: &[String]) -> std::result::Result<Vec<(String, String)>, CommandError> {
    raw.iter()
        .map(|spec| {
            spec.split_once('=')
                .map(|(column, value)| (column.trim().to_string(), value.to_string()))
                .ok_or_else(|| {
                    CommandError::Other(anyhow::anyhow!(
                        "invalid --filter '{spec}' (expected format: COLUMN=VALUE)"
                    ))
                })
        })
        .collect()
}

fn print_table(table: &soxdash_model::Table) {
    println!("{}", table.columns().join("\t"));
    for row in table.rows() {
        let line: Vec<String> = row.iter().map(|cell| cell.display_text()).collect();
        println!("{}", line.join("\t"));
    }
    println!("({} rows)", table.row_count());
}
