//! Delimited tabular layouts: one (media, label) classification pair per
//! record.
//!
//! Two variants share this module: a comma-separated file with a header row
//! (columns addressed by name or position) and a whitespace-separated text
//! file (columns addressed by position, or by name when a header row is
//! present). Records that cannot be parsed are dropped with a warning; the
//! run continues.

use std::fs;
use std::path::Path;

use crate::error::ImportError;
use crate::ir::Annotation;

use super::assemble::ItemAssembler;
use super::categories::CategoryBuilder;
use super::media::MediaResolver;
use super::report::{ImportReport, ImportWarning, WarningCode, WarningContext};
use super::{ColumnMap, ColumnRef, Import};

/// Read a comma-separated annotation file against an images root.
///
/// The first row is always a header; named columns are resolved against it,
/// indexed columns are used as-is.
pub fn read_image_csv(
    images_root: &Path,
    ann_file: &Path,
    columns: &ColumnMap,
) -> Result<Import, ImportError> {
    let resolver = MediaResolver::new(images_root)?;
    let mut categories = CategoryBuilder::new();
    let mut assembler = ItemAssembler::new();
    let mut report = ImportReport::new();

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(ann_file)
        .map_err(|source| ImportError::CsvParse {
            path: ann_file.to_path_buf(),
            source,
        })?;

    let headers = reader
        .headers()
        .map_err(|source| ImportError::CsvParse {
            path: ann_file.to_path_buf(),
            source,
        })?
        .clone();
    let header_fields: Vec<&str> = headers.iter().collect();

    let media_col = resolve_column(&columns.media, Some(&header_fields), ann_file)?;
    let label_col = resolve_column(&columns.label, Some(&header_fields), ann_file)?;

    for (record_idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = record_idx + 2;
        let record = match result {
            Ok(record) => record,
            Err(source) => {
                report.add(ImportWarning::new(
                    WarningCode::MalformedRecord,
                    format!("unreadable record: {source}"),
                    WarningContext::line(ann_file, line),
                ));
                continue;
            }
        };

        let fields: Vec<&str> = record.iter().collect();
        consume_record(
            &fields,
            media_col,
            label_col,
            &resolver,
            &mut categories,
            &mut assembler,
            &mut report,
            ann_file,
            line,
        )?;
    }

    Ok(assembler.finish(categories, report))
}

/// Read a whitespace-separated annotation file against an images root.
///
/// A header row is consumed only when the column mapping addresses columns
/// by name; purely positional mappings treat every line as data.
pub fn read_image_txt(
    images_root: &Path,
    ann_file: &Path,
    columns: &ColumnMap,
) -> Result<Import, ImportError> {
    let resolver = MediaResolver::new(images_root)?;
    let mut categories = CategoryBuilder::new();
    let mut assembler = ItemAssembler::new();
    let mut report = ImportReport::new();

    let content = fs::read_to_string(ann_file)?;
    let mut lines = content.lines().enumerate();

    let uses_names = matches!(columns.media, ColumnRef::Name(_))
        || matches!(columns.label, ColumnRef::Name(_));

    let header_fields: Option<Vec<&str>> = if uses_names {
        match lines.next() {
            Some((_, header)) => Some(header.split_whitespace().collect()),
            None => None,
        }
    } else {
        None
    };

    let media_col = resolve_column(&columns.media, header_fields.as_deref(), ann_file)?;
    let label_col = resolve_column(&columns.label, header_fields.as_deref(), ann_file)?;

    for (line_idx, line) in lines {
        let line_num = line_idx + 1;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        consume_record(
            &fields,
            media_col,
            label_col,
            &resolver,
            &mut categories,
            &mut assembler,
            &mut report,
            ann_file,
            line_num,
        )?;
    }

    Ok(assembler.finish(categories, report))
}

/// Maps a column reference to a concrete field index.
fn resolve_column(
    column: &ColumnRef,
    header: Option<&[&str]>,
    ann_file: &Path,
) -> Result<usize, ImportError> {
    match column {
        ColumnRef::Index(index) => Ok(*index),
        ColumnRef::Name(name) => {
            let header = header.ok_or_else(|| ImportError::ColumnNotFound {
                column: name.clone(),
                path: ann_file.to_path_buf(),
            })?;
            header
                .iter()
                .position(|field| field.trim() == name)
                .ok_or_else(|| ImportError::ColumnNotFound {
                    column: name.clone(),
                    path: ann_file.to_path_buf(),
                })
        }
    }
}

/// Handles one record: resolve media, intern the label, emit a Label
/// annotation. Short or empty fields drop the record with a warning.
#[allow(clippy::too_many_arguments)]
fn consume_record(
    fields: &[&str],
    media_col: usize,
    label_col: usize,
    resolver: &MediaResolver,
    categories: &mut CategoryBuilder,
    assembler: &mut ItemAssembler,
    report: &mut ImportReport,
    ann_file: &Path,
    line: usize,
) -> Result<(), ImportError> {
    let required = media_col.max(label_col) + 1;
    if fields.len() < required {
        report.add(ImportWarning::new(
            WarningCode::MalformedRecord,
            format!("expected at least {required} fields, found {}", fields.len()),
            WarningContext::line(ann_file, line),
        ));
        return Ok(());
    }

    let media_key = fields[media_col].trim();
    let label_token = fields[label_col].trim();
    if media_key.is_empty() || label_token.is_empty() {
        report.add(ImportWarning::new(
            WarningCode::MalformedRecord,
            "empty media key or label field",
            WarningContext::line(ann_file, line),
        ));
        return Ok(());
    }

    let media = resolver.resolve(media_key)?;
    let label = categories.intern(label_token);
    assembler.push(media, Annotation::Label { label });
    Ok(())
}
