//! Relaxed YOLO-style layout: one normalized-coordinate text file per image.
//!
//! Each line is `<class-token> <cx> <cy> <w> <h>` with coordinates in [0, 1].
//! The raw class token is interned verbatim as the category name; it is not
//! resolved against any external class list, so the resulting table holds
//! the literal tokens in first-appearance order. Boxes are denormalized
//! against the image's pixel dimensions.

use std::fs;
use std::path::Path;

use crate::error::ImportError;
use crate::ir::Annotation;

use super::assemble::ItemAssembler;
use super::categories::CategoryBuilder;
use super::media::MediaResolver;
use super::report::{ImportReport, ImportWarning, WarningCode, WarningContext};
use super::Import;

const LABEL_EXTENSION: &str = "txt";

/// Read a directory of per-image YOLO text files against an images root.
///
/// `ann_dir` may be a dedicated directory or the images root itself. Images
/// without a text file become items with zero annotations.
pub fn read_relaxed_yolo(images_root: &Path, ann_dir: &Path) -> Result<Import, ImportError> {
    let resolver = MediaResolver::new(images_root)?;
    if !ann_dir.is_dir() {
        return Err(ImportError::MissingAnnotationPath {
            path: ann_dir.to_path_buf(),
        });
    }

    let mut categories = CategoryBuilder::new();
    let mut assembler = ItemAssembler::new();
    let mut report = ImportReport::new();

    for media in resolver.iter() {
        let label_path = ann_dir.join(&media.id).with_extension(LABEL_EXTENSION);
        let media_path = media.path.clone();
        let item = assembler.item_mut(media);

        if !label_path.is_file() {
            continue;
        }

        let (width, height) = image_dimensions(&media_path)?;
        let content = fs::read_to_string(&label_path)?;

        for (line_idx, line) in content.lines().enumerate() {
            let line_num = line_idx + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            match parse_label_line(trimmed) {
                Ok((token, cx, cy, w, h)) => {
                    let label = categories.intern(token);
                    let ordinal = item.annotations.len();
                    item.annotations.push(Annotation::Bbox {
                        x: (cx - w / 2.0) * width,
                        y: (cy - h / 2.0) * height,
                        w: w * width,
                        h: h * height,
                        label,
                        ordinal,
                    });
                }
                Err(message) => {
                    report.add(ImportWarning::new(
                        WarningCode::MalformedLine,
                        message,
                        WarningContext::line(&label_path, line_num),
                    ));
                }
            }
        }
    }

    Ok(assembler.finish(categories, report))
}

/// Parses one non-empty label line into (token, cx, cy, w, h).
fn parse_label_line(line: &str) -> Result<(&str, f64, f64, f64, f64), String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != 5 {
        return Err(format!("expected 5 tokens, found {}", tokens.len()));
    }

    let cx = parse_coord(tokens[1], "cx")?;
    let cy = parse_coord(tokens[2], "cy")?;
    let w = parse_coord(tokens[3], "w")?;
    let h = parse_coord(tokens[4], "h")?;

    Ok((tokens[0], cx, cy, w, h))
}

fn parse_coord(raw: &str, field: &str) -> Result<f64, String> {
    raw.parse::<f64>()
        .map_err(|_| format!("invalid {field} '{raw}'; expected floating-point number"))
}

fn image_dimensions(path: &Path) -> Result<(f64, f64), ImportError> {
    let size = imagesize::size(path).map_err(|source| ImportError::ImageDimensionRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok((size.width as f64, size.height as f64))
}
