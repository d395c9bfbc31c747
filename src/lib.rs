//! Looselabel: an importer for loosely-structured image annotation layouts.
//!
//! Looselabel takes a directory of images plus whatever annotation files sit
//! next to them — delimited (media, label) records, colour-coded mask
//! images, per-image XML bounding-box files, or normalized-coordinate text
//! files — and converges all of them on one unified in-memory dataset:
//! items with resolved media, a canonical ordered label vocabulary, and
//! typed annotations.
//!
//! # Modules
//!
//! - [`ir`]: The unified representation (Dataset, DatasetItem, Annotation, ...)
//! - [`import`]: Format readers, structural detection, and shared services
//! - [`error`]: Error types for looselabel operations

pub mod error;
pub mod import;
pub mod ir;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

pub use error::ImportError;
pub use import::{detect_format, ColumnMap, ColumnRef, Format, Import, ImportOptions};

/// The looselabel CLI application.
#[derive(Parser)]
#[command(name = "looselabel")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Probe a directory and print which layout it matches, if any.
    Detect(DetectArgs),

    /// Import a dataset and print a summary.
    Import(ImportArgs),
}

/// Arguments for the detect subcommand.
#[derive(clap::Args)]
struct DetectArgs {
    /// Candidate dataset root directory.
    path: PathBuf,
}

/// Arguments for the import subcommand.
#[derive(clap::Args)]
struct ImportArgs {
    /// Images root directory.
    images_root: PathBuf,

    /// Layout name ('image-csv', 'image-txt', 'image-mask', 'relaxed-voc',
    /// 'relaxed-yolo'). Auto-detected from the images root when omitted.
    #[arg(long)]
    format: Option<String>,

    /// Delimited annotation file (tabular formats).
    #[arg(long)]
    ann_file: Option<PathBuf>,

    /// Directory of per-image annotation files (VOC/YOLO formats).
    #[arg(long)]
    ann_path: Option<PathBuf>,

    /// Directory of per-image mask images (mask format).
    #[arg(long)]
    mask_path: Option<PathBuf>,

    /// Explicit labelmap file (mask format).
    #[arg(long)]
    labelmap_file: Option<PathBuf>,

    /// Media column: a header name or a zero-based index (tabular formats).
    #[arg(long)]
    media_column: Option<String>,

    /// Label column: a header name or a zero-based index (tabular formats).
    #[arg(long)]
    label_column: Option<String>,

    /// Output format for the summary ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Run the looselabel CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), ImportError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Detect(args)) => run_detect(args),
        Some(Commands::Import(args)) => run_import(args),
        None => {
            println!("looselabel {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Importer for loosely-structured image annotation layouts.");
            println!();
            println!("Run 'looselabel --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the detect subcommand.
fn run_detect(args: DetectArgs) -> Result<(), ImportError> {
    match detect_format(&args.path) {
        Some(format) => {
            println!("{}", format);
            Ok(())
        }
        None => Err(ImportError::NoFormatDetected { path: args.path }),
    }
}

/// Execute the import subcommand.
fn run_import(args: ImportArgs) -> Result<(), ImportError> {
    let format = match &args.format {
        Some(name) => Format::from_name(name)?,
        None => detect_format(&args.images_root).ok_or_else(|| ImportError::NoFormatDetected {
            path: args.images_root.clone(),
        })?,
    };

    let columns = match (&args.media_column, &args.label_column) {
        (Some(media), Some(label)) => Some(ColumnMap {
            media: parse_column(media),
            label: parse_column(label),
        }),
        _ => None,
    };

    let options = ImportOptions {
        ann_file: args.ann_file,
        ann_path: args.ann_path,
        mask_path: args.mask_path,
        labelmap_file: args.labelmap_file,
        columns,
    };

    let import = format.read(&args.images_root, &options)?;

    match args.output.as_str() {
        "json" => {
            let summary = Summary::of(format, &import);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        _ => {
            println!("format:      {}", format);
            println!("items:       {}", import.dataset.items.len());
            println!("categories:  {:?}", import.dataset.categories.names());
            println!("annotations: {}", import.dataset.annotation_count());
            print!("{}", import.report);
        }
    }

    Ok(())
}

/// A digit-only column argument is an index; anything else is a header name.
fn parse_column(raw: &str) -> ColumnRef {
    match raw.parse::<usize>() {
        Ok(index) => ColumnRef::Index(index),
        Err(_) => ColumnRef::Name(raw.to_string()),
    }
}

/// JSON summary of an import run for programmatic consumers.
#[derive(Serialize)]
struct Summary<'a> {
    format: &'static str,
    item_count: usize,
    annotation_count: usize,
    categories: &'a [String],
    warnings: &'a [import::ImportWarning],
}

impl<'a> Summary<'a> {
    fn of(format: Format, import: &'a Import) -> Self {
        Self {
            format: format.name(),
            item_count: import.dataset.items.len(),
            annotation_count: import.dataset.annotation_count(),
            categories: import.dataset.categories.names(),
            warnings: &import.report.warnings,
        }
    }
}
