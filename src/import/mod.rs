//! Format readers and the shared services they converge through.
//!
//! The five supported layouts form a sealed set of strategies behind one
//! contract: a structural probe ([`Format::detect`]) and a reader
//! ([`Format::read`]) that produces an [`Import`] — the unified dataset
//! plus the warnings recorded while building it.
//!
//! Every reader threads one [`CategoryBuilder`] through its whole run, so
//! label ids are assigned in first-appearance order and repeated imports
//! can never cross-contaminate each other's vocabularies.

mod assemble;
mod categories;
mod detect;
pub mod io_mask;
pub mod io_tabular;
pub mod io_voc;
pub mod io_yolo;
mod media;
mod report;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ImportError;
use crate::ir::Dataset;

pub use assemble::ItemAssembler;
pub use categories::CategoryBuilder;
pub use media::{MediaResolver, IMAGE_EXTENSIONS};
pub use report::{ImportReport, ImportWarning, WarningCode, WarningContext};

/// The result of one import run: the unified dataset plus every recovered
/// per-record failure.
#[derive(Clone, Debug)]
pub struct Import {
    pub dataset: Dataset,
    pub report: ImportReport,
}

/// A column reference in a tabular column mapping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColumnRef {
    /// Resolved against the header row.
    Name(String),
    /// Zero-based field position.
    Index(usize),
}

/// Which fields of a tabular record hold the media key and the label token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnMap {
    pub media: ColumnRef,
    pub label: ColumnRef,
}

impl ColumnMap {
    pub fn named(media: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            media: ColumnRef::Name(media.into()),
            label: ColumnRef::Name(label.into()),
        }
    }

    pub fn indexed(media: usize, label: usize) -> Self {
        Self {
            media: ColumnRef::Index(media),
            label: ColumnRef::Index(label),
        }
    }
}

/// Format-specific locations and mappings for one import run.
///
/// Which fields are required depends on the [`Format`]; a missing required
/// field is a fatal configuration error, mirroring the fatal/lenient split
/// of the readers themselves.
#[derive(Clone, Debug, Default)]
pub struct ImportOptions {
    /// Single delimited annotation file (tabular formats).
    pub ann_file: Option<PathBuf>,

    /// Directory of per-image annotation files (VOC/YOLO). Defaults to the
    /// images root itself, which covers side-by-side layouts.
    pub ann_path: Option<PathBuf>,

    /// Directory of per-image mask images (mask format).
    pub mask_path: Option<PathBuf>,

    /// Optional explicit labelmap file (mask format).
    pub labelmap_file: Option<PathBuf>,

    /// Column mapping (tabular formats).
    pub columns: Option<ColumnMap>,
}

/// The sealed set of supported layouts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    /// Comma-separated (media, label) records with a header row.
    ImageCsv,
    /// Whitespace-separated (media, label) records.
    ImageTxt,
    /// Per-image colour-coded mask images.
    ImageMask,
    /// Per-image XML bounding-box files, tolerant of missing files.
    RelaxedVoc,
    /// Per-image normalized-coordinate text files, tolerant of missing files.
    RelaxedYolo,
}

impl Format {
    /// Probe order for auto-detection: most specific signals first.
    pub const ALL: [Format; 5] = [
        Format::RelaxedVoc,
        Format::RelaxedYolo,
        Format::ImageMask,
        Format::ImageCsv,
        Format::ImageTxt,
    ];

    /// Registry name of this format.
    pub fn name(&self) -> &'static str {
        match self {
            Format::ImageCsv => "image-csv",
            Format::ImageTxt => "image-txt",
            Format::ImageMask => "image-mask",
            Format::RelaxedVoc => "relaxed-voc",
            Format::RelaxedYolo => "relaxed-yolo",
        }
    }

    /// Looks up a format by its registry name.
    pub fn from_name(name: &str) -> Result<Format, ImportError> {
        Format::ALL
            .iter()
            .copied()
            .find(|format| format.name() == name)
            .ok_or_else(|| ImportError::UnsupportedFormat(name.to_string()))
    }

    /// Structural probe: does `root` look like this layout?
    ///
    /// Never errors on arbitrary directories; unrelated input is just false.
    pub fn detect(&self, root: &Path) -> bool {
        match self {
            Format::ImageCsv => detect::looks_like_image_csv(root),
            Format::ImageTxt => detect::looks_like_image_txt(root),
            Format::ImageMask => detect::looks_like_image_mask(root),
            Format::RelaxedVoc => detect::looks_like_relaxed_voc(root),
            Format::RelaxedYolo => detect::looks_like_relaxed_yolo(root),
        }
    }

    /// Runs this format's reader over `images_root` with the given options.
    pub fn read(&self, images_root: &Path, options: &ImportOptions) -> Result<Import, ImportError> {
        match self {
            Format::ImageCsv => io_tabular::read_image_csv(
                images_root,
                require(&options.ann_file, "ann_file")?,
                require_columns(options)?,
            ),
            Format::ImageTxt => io_tabular::read_image_txt(
                images_root,
                require(&options.ann_file, "ann_file")?,
                require_columns(options)?,
            ),
            Format::ImageMask => io_mask::read_image_mask(
                images_root,
                require(&options.mask_path, "mask_path")?,
                options.labelmap_file.as_deref(),
            ),
            Format::RelaxedVoc => io_voc::read_relaxed_voc(
                images_root,
                options.ann_path.as_deref().unwrap_or(images_root),
            ),
            Format::RelaxedYolo => io_yolo::read_relaxed_yolo(
                images_root,
                options.ann_path.as_deref().unwrap_or(images_root),
            ),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tries each probe in [`Format::ALL`] order and returns the first match.
pub fn detect_format(root: &Path) -> Option<Format> {
    Format::ALL.iter().copied().find(|format| format.detect(root))
}

fn require<'a>(field: &'a Option<PathBuf>, key: &'static str) -> Result<&'a Path, ImportError> {
    field
        .as_deref()
        .ok_or(ImportError::MissingConfigKey { key })
}

fn require_columns(options: &ImportOptions) -> Result<&ColumnMap, ImportError> {
    options
        .columns
        .as_ref()
        .ok_or(ImportError::MissingConfigKey { key: "columns" })
}
