//! Colour-coded mask layout: one RGB mask image per item, decoded into
//! per-class binary layers.
//!
//! Two modes share this module. With an explicit labelmap file the category
//! table and colormap are fixed up front and a pixel colour outside the map
//! degrades that item to empty annotations. Without one, colours are
//! discovered: the first time a distinct RGB triple is seen across the run
//! (mask files in filename order, pixels in row-major order) it is interned
//! as a new category.

use std::path::{Path, PathBuf};

use image::RgbImage;
use walkdir::WalkDir;

use crate::error::ImportError;
use crate::ir::{Annotation, BinaryMask, LabelId, Rgb};

use super::assemble::ItemAssembler;
use super::categories::CategoryBuilder;
use super::media::{MediaResolver, IMAGE_EXTENSIONS};
use super::report::{ImportReport, ImportWarning, WarningCode, WarningContext};
use super::Import;

/// Read a directory of per-image RGB masks against an images root.
///
/// Mask files carry the same basenames as the images they annotate. When
/// `labelmap_file` is given it fixes the vocabulary and colormap; otherwise
/// both are discovered from the masks themselves.
pub fn read_image_mask(
    images_root: &Path,
    mask_dir: &Path,
    labelmap_file: Option<&Path>,
) -> Result<Import, ImportError> {
    let resolver = MediaResolver::new(images_root)?;
    if !mask_dir.is_dir() {
        return Err(ImportError::MissingAnnotationPath {
            path: mask_dir.to_path_buf(),
        });
    }

    let mut categories = CategoryBuilder::new();
    let mut assembler = ItemAssembler::new();
    let mut report = ImportReport::new();

    let explicit = match labelmap_file {
        Some(path) => {
            load_labelmap(path, &mut categories)?;
            true
        }
        None => false,
    };

    for mask_path in collect_mask_files(mask_dir)? {
        let stem = rel_stem(mask_dir, &mask_path);
        let media = resolver.resolve(&stem)?;
        let item = assembler.item_mut(media);

        let pixels = decode_rgb(&mask_path)?;
        match decode_layers(&pixels, &mut categories, explicit) {
            Ok(layers) => {
                for (label, mask) in layers {
                    item.annotations.push(Annotation::Mask { label, mask });
                }
            }
            Err(color) => {
                // Cannot silently invent a label; this item stays empty and
                // the run continues.
                report.add(ImportWarning::new(
                    WarningCode::UnmappedColor,
                    format!(
                        "colour ({}, {}, {}) is not in the labelmap",
                        color.0, color.1, color.2
                    ),
                    WarningContext::file(&mask_path),
                ));
            }
        }
    }

    Ok(assembler.finish(categories, report))
}

/// Loads an explicit `id,color,name` table, interning names in file order.
///
/// The colour field is a space-separated `R G B` triple; the expanded
/// five-field row form `id,r,g,b,name` is also accepted.
fn load_labelmap(path: &Path, categories: &mut CategoryBuilder) -> Result<(), ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|source| ImportError::CsvParse {
            path: path.to_path_buf(),
            source,
        })?;

    for (row_idx, result) in reader.records().enumerate() {
        let record = result.map_err(|source| ImportError::CsvParse {
            path: path.to_path_buf(),
            source,
        })?;
        let fields: Vec<&str> = record.iter().map(str::trim).collect();

        let (id_field, color, name) = match fields.len() {
            3 => (fields[0], parse_color_triple(fields[1]), fields[2]),
            5 => (
                fields[0],
                parse_color_fields(fields[1], fields[2], fields[3]),
                fields[4],
            ),
            n => {
                return Err(ImportError::LabelmapInvalid {
                    path: path.to_path_buf(),
                    message: format!("row {}: expected 3 or 5 fields, found {n}", row_idx + 1),
                })
            }
        };

        let color = color.ok_or_else(|| ImportError::LabelmapInvalid {
            path: path.to_path_buf(),
            message: format!("row {}: unparseable colour", row_idx + 1),
        })?;

        let id: usize = id_field
            .parse()
            .map_err(|_| ImportError::LabelmapInvalid {
                path: path.to_path_buf(),
                message: format!("row {}: id '{}' is not an integer", row_idx + 1, id_field),
            })?;
        if id != categories.len() {
            return Err(ImportError::LabelmapInvalid {
                path: path.to_path_buf(),
                message: format!(
                    "row {}: id {} is out of order (expected {})",
                    row_idx + 1,
                    id,
                    categories.len()
                ),
            });
        }
        if name.is_empty() {
            return Err(ImportError::LabelmapInvalid {
                path: path.to_path_buf(),
                message: format!("row {}: empty label name", row_idx + 1),
            });
        }

        categories.intern_with_color(name, color);
    }

    if categories.is_empty() {
        return Err(ImportError::LabelmapInvalid {
            path: path.to_path_buf(),
            message: "labelmap contains no rows".to_string(),
        });
    }

    Ok(())
}

fn parse_color_triple(field: &str) -> Option<Rgb> {
    let mut parts = field.split_whitespace();
    let r = parts.next()?;
    let g = parts.next()?;
    let b = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    parse_color_fields(r, g, b)
}

fn parse_color_fields(r: &str, g: &str, b: &str) -> Option<Rgb> {
    Some(Rgb(
        r.trim().parse().ok()?,
        g.trim().parse().ok()?,
        b.trim().parse().ok()?,
    ))
}

/// Decodes one mask image into (label, binary layer) pairs in ascending
/// label-id order. Returns the offending colour when an explicit labelmap
/// does not cover a pixel.
fn decode_layers(
    pixels: &RgbImage,
    categories: &mut CategoryBuilder,
    explicit: bool,
) -> Result<Vec<(LabelId, BinaryMask)>, Rgb> {
    // Distinct colours in row-major first-appearance order.
    let mut present: Vec<Rgb> = Vec::new();
    for pixel in pixels.pixels() {
        let color = Rgb(pixel[0], pixel[1], pixel[2]);
        if !present.contains(&color) {
            present.push(color);
        }
    }

    let mut layers = Vec::with_capacity(present.len());
    for color in present {
        let label = match categories.id_of_color(color) {
            Some(label) => label,
            None if explicit => return Err(color),
            None => {
                let name = discovered_name(categories.len());
                categories.intern_with_color(&name, color)
            }
        };

        let mask = BinaryMask::from_fn(
            pixels.width() as usize,
            pixels.height() as usize,
            |x, y| {
                let p = pixels.get_pixel(x as u32, y as u32);
                Rgb(p[0], p[1], p[2]) == color
            },
        );
        layers.push((label, mask));
    }

    layers.sort_by_key(|(label, _)| *label);
    Ok(layers)
}

/// Auto-generated names for discovered colours. The first colour seen in a
/// run is overwhelmingly the background fill, so it gets the conventional
/// name.
fn discovered_name(index: usize) -> String {
    match index {
        0 => "background".to_string(),
        1 => "object".to_string(),
        n => format!("object_{n}"),
    }
}

fn decode_rgb(path: &Path) -> Result<RgbImage, ImportError> {
    let decoded = image::open(path).map_err(|source| ImportError::MaskDecode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(decoded.to_rgb8())
}

fn collect_mask_files(mask_dir: &Path) -> Result<Vec<PathBuf>, ImportError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(mask_dir).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|source| {
            ImportError::Io(
                source
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory traversal failed")),
            )
        })?;
        if entry.file_type().is_file() && has_media_extension(entry.path()) {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort_by_cached_key(|path| rel_stem(mask_dir, path));
    Ok(files)
}

fn has_media_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

fn rel_stem(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let rel = rel.to_string_lossy().replace('\\', "/");
    match rel.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => rel,
    }
}
