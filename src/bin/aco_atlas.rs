//! aco-atlas: sync, export and audit the ACO corpus page data.
//!
//! ## Configuration
//!
//! Environment variables (each also available as a flag):
//! - `ACO_ROOT`: Project root (default: current directory)
//! - `ACO_BOOK_TABLE`: Book table JSON replacing the built-in German canon
//! - `ACO_PATHS`: JSON file overriding parts of the project layout
//! - `RUST_LOG`: Log level filter (default: info)
//! - `LOG_FORMAT`: "json" for structured logs, "pretty" for development (default: pretty)
//!
//! ## Usage
//!
//! ```bash
//! aco-atlas sync all
//! aco-atlas export --out build/atlas
//! aco-atlas audit --fail-on-issues
//! aco-atlas parse Gen.3.16-18 1Cor.13
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{error, info, warn};

use aco_atlas::atlas::{export_atlas, load_audit, ExportPaths};
use aco_atlas::sync::{self, SyncTarget};
use aco_atlas::telemetry::{init_tracing, LogFormat};
use aco_atlas::{AtlasPaths, BookCanon, FsCorpusSource, OsisNormalizer, ProjectLayout};

#[derive(Parser)]
#[command(name = "aco-atlas")]
#[command(about = "OSIS reference normalization and page data for the ACO corpus")]
#[command(version)]
struct Cli {
    /// Project root
    #[arg(long, env = "ACO_ROOT", default_value = ".")]
    root: PathBuf,

    /// Book table JSON (defaults to the built-in German canon)
    #[arg(long, env = "ACO_BOOK_TABLE")]
    book_table: Option<PathBuf>,

    /// Layout override JSON
    #[arg(long, env = "ACO_PATHS")]
    paths: Option<PathBuf>,

    /// Log format: json or pretty
    #[arg(long, env = "LOG_FORMAT", default_value = "pretty")]
    log_format: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Copy pipeline output into the web app
    Sync {
        /// bible-refs, person-bios, visualizations or all
        #[arg(default_value = "all")]
        target: SyncTarget,
    },
    /// Write every page plus a manifest into a directory
    Export {
        /// Output directory
        #[arg(short, long, default_value = "atlas")]
        out: PathBuf,
    },
    /// Check every stored reference and print the report
    Audit {
        /// Exit with status 1 when any reference has an issue
        #[arg(long)]
        fail_on_issues: bool,
    },
    /// Parse references and print their key and label
    Parse {
        /// OSIS references
        #[arg(required = true)]
        references: Vec<String>,
    },
}

fn load_normalizer(book_table: Option<&PathBuf>) -> Result<OsisNormalizer, Box<dyn std::error::Error>> {
    let canon = match book_table {
        Some(path) => {
            let canon = BookCanon::from_path(path)?;
            info!(
                path = %path.display(),
                books = canon.len(),
                fingerprint = %canon.fingerprint(),
                "book table loaded"
            );
            canon
        }
        None => BookCanon::german(),
    };
    Ok(OsisNormalizer::new(Arc::new(canon)))
}

fn load_layout(cli: &Cli) -> Result<ProjectLayout, Box<dyn std::error::Error>> {
    let paths = match &cli.paths {
        Some(path) => AtlasPaths::from_json_file(path)?,
        None => AtlasPaths::default(),
    };
    Ok(ProjectLayout::with_paths(&cli.root, paths))
}

fn run(cli: Cli) -> Result<i32, Box<dyn std::error::Error>> {
    let layout = load_layout(&cli)?;
    let normalizer = load_normalizer(cli.book_table.as_ref())?;

    match cli.command {
        Command::Sync { target } => {
            let report = sync::run(target, &layout)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Export { out } => {
            let source = FsCorpusSource::new(layout.clone());
            let out = layout.resolve(&out);
            let manifest = export_atlas(&source, &normalizer, &out, &ExportPaths::default())?;
            println!("{}", serde_json::to_string_pretty(&manifest)?);
        }
        Command::Audit { fail_on_issues } => {
            let source = FsCorpusSource::new(layout);
            let report = load_audit(&source, &normalizer)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if fail_on_issues && !report.is_clean() {
                warn!(findings = report.findings.len(), "references with issues found");
                return Ok(1);
            }
        }
        Command::Parse { references } => {
            for input in references {
                let reference = normalizer.parse(&input);
                let line = json!({
                    "input": &input,
                    "reference": &reference,
                    "orderKey": normalizer.order_key_of(&reference),
                    "display": normalizer.format_reference(&reference),
                    "testament": normalizer.testament(&reference.book),
                    "issues": normalizer.validate(&input),
                });
                println!("{}", line);
            }
        }
    }
    Ok(0)
}

fn main() {
    let cli = Cli::parse();
    init_tracing(LogFormat::parse(&cli.log_format), "aco_atlas=info");

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!(error = %e, "command failed");
            std::process::exit(2);
        }
    }
}
