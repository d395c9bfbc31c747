//! Import report types for recovered per-record failures.
//!
//! The lenient layouts drop malformed records instead of failing the run.
//! Each drop is recorded here as a structured warning, so "skip and
//! continue" is an explicit, testable data value rather than implicit
//! control flow.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// All warnings recorded during one import run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ImportReport {
    /// Recovered failures, in the order they were encountered.
    pub warnings: Vec<ImportWarning>,
}

impl ImportReport {
    /// Creates a new empty report.
    pub fn new() -> Self {
        Self {
            warnings: Vec::new(),
        }
    }

    /// Adds a warning to the report.
    pub fn add(&mut self, warning: ImportWarning) {
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Returns true if nothing was dropped during the run.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Warnings carrying the given code.
    pub fn with_code(&self, code: WarningCode) -> impl Iterator<Item = &ImportWarning> {
        self.warnings.iter().filter(move |w| w.code == code)
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.warnings.is_empty() {
            return writeln!(f, "Import completed: no records dropped");
        }

        writeln!(
            f,
            "Import completed with {} warning(s):",
            self.warning_count()
        )?;
        for warning in &self.warnings {
            writeln!(f, "  {}", warning)?;
        }
        Ok(())
    }
}

/// A single recovered failure.
#[derive(Clone, Debug, Serialize)]
pub struct ImportWarning {
    /// A stable code for the warning type.
    pub code: WarningCode,

    /// A human-readable description of what was dropped and why.
    pub message: String,

    /// Where the failure occurred.
    pub context: WarningContext,
}

impl ImportWarning {
    pub fn new(code: WarningCode, message: impl Into<String>, context: WarningContext) -> Self {
        Self {
            code,
            message: message.into(),
            context,
        }
    }
}

impl fmt::Display for ImportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}: {}", self.code, self.context, self.message)
    }
}

/// A stable code identifying the type of recovered failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum WarningCode {
    /// A tabular record had too few fields or an unusable value.
    MalformedRecord,
    /// A normalized-coordinate line had missing or non-numeric fields.
    MalformedLine,
    /// An individual object entry in an object-description file was unusable.
    MalformedObject,
    /// An object-description file existed but could not be parsed at all.
    UnparseableFile,
    /// A mask pixel colour was absent from the explicit labelmap; the item
    /// degraded to empty annotations.
    UnmappedColor,
}

/// Context about where a recovered failure occurred.
#[derive(Clone, Debug, Serialize)]
pub struct WarningContext {
    /// The file the record came from.
    pub path: PathBuf,

    /// One-based line or record number, when the source is line-oriented.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl WarningContext {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            line: None,
        }
    }

    pub fn line(path: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            path: path.into(),
            line: Some(line),
        }
    }
}

impl fmt::Display for WarningContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}", self.path.display(), line),
            None => write!(f, "{}", self.path.display()),
        }
    }
}
