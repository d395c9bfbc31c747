//! Cheap structural probes over candidate directories.
//!
//! These back the external format registry's auto-selection: each probe
//! inspects directory structure only, never file contents, and returns
//! false (never an error) on arbitrary unrelated directories.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use super::media::IMAGE_EXTENSIONS;

/// A root .csv file plus a subdirectory of images.
pub(crate) fn looks_like_image_csv(root: &Path) -> bool {
    !file_stems(root, &["csv"]).is_empty() && has_image_subdir(root)
}

/// A root .txt annotation file plus a subdirectory of images. A .txt whose
/// stem matches an image stem is a per-image label file, which is the YOLO
/// layout's signal, not this one's.
pub(crate) fn looks_like_image_txt(root: &Path) -> bool {
    if !has_image_subdir(root) {
        return false;
    }
    let txt_stems = file_stems(root, &["txt"]);
    if txt_stems.is_empty() {
        return false;
    }
    let image_stems = image_stems_anywhere(root);
    txt_stems.iter().any(|stem| !image_stems.contains(stem))
}

/// Two sibling image directories with overlapping basenames: originals plus
/// their colour-coded masks.
pub(crate) fn looks_like_image_mask(root: &Path) -> bool {
    let Ok(entries) = fs::read_dir(root) else {
        return false;
    };

    let mut stem_sets: Vec<BTreeSet<String>> = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let stems = file_stems(&path, &IMAGE_EXTENSIONS);
        if !stems.is_empty() {
            stem_sets.push(stems);
        }
    }

    for (i, left) in stem_sets.iter().enumerate() {
        for right in &stem_sets[i + 1..] {
            if left.intersection(right).next().is_some() {
                return true;
            }
        }
    }
    false
}

/// An .xml object-description file whose basename matches an image, either
/// side by side in one directory or split across sibling directories.
pub(crate) fn looks_like_relaxed_voc(root: &Path) -> bool {
    stems_match_across(root, "xml")
}

/// A .txt label file whose basename matches an image, either side by side
/// or split across sibling directories.
pub(crate) fn looks_like_relaxed_yolo(root: &Path) -> bool {
    stems_match_across(root, "txt")
}

/// True when some file with `ann_ext` shares a stem with some image, looking
/// at the root itself and each immediate subdirectory.
fn stems_match_across(root: &Path, ann_ext: &str) -> bool {
    let mut image_stems: BTreeSet<String> = file_stems(root, &IMAGE_EXTENSIONS);
    let mut ann_stems: BTreeSet<String> = file_stems(root, &[ann_ext]);

    if let Ok(entries) = fs::read_dir(root) {
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            image_stems.extend(file_stems(&path, &IMAGE_EXTENSIONS));
            ann_stems.extend(file_stems(&path, &[ann_ext]));
        }
    }

    image_stems.intersection(&ann_stems).next().is_some()
}

fn has_image_subdir(root: &Path) -> bool {
    let Ok(entries) = fs::read_dir(root) else {
        return false;
    };
    entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .any(|dir| !file_stems(&dir, &IMAGE_EXTENSIONS).is_empty())
}

fn image_stems_anywhere(root: &Path) -> BTreeSet<String> {
    let mut stems = file_stems(root, &IMAGE_EXTENSIONS);
    if let Ok(entries) = fs::read_dir(root) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stems.extend(file_stems(&path, &IMAGE_EXTENSIONS));
            }
        }
    }
    stems
}

/// Extension-stripped names of immediate files in `dir` carrying one of the
/// given extensions.
fn file_stems(dir: &Path, extensions: &[&str]) -> BTreeSet<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return BTreeSet::new();
    };

    entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
                .unwrap_or(false)
        })
        .filter_map(|path| {
            path.file_stem()
                .and_then(|stem| stem.to_str())
                .map(str::to_string)
        })
        .collect()
}
