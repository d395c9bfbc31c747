//! Media resolution: mapping logical record keys to image files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::ImportError;
use crate::ir::MediaReference;

/// File extensions treated as media when enumerating an images root.
pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "webp"];

/// Resolves logical identifiers (with or without extension) to image files
/// under an images root.
///
/// The root is enumerated exactly once, at construction. Ambiguity — two
/// files sharing an extension-stripped relative stem — is detected during
/// that enumeration and is fatal, even if no record ever references the
/// colliding stem: it means extension-less keys cannot be interpreted.
#[derive(Debug)]
pub struct MediaResolver {
    root: PathBuf,
    by_stem: BTreeMap<String, PathBuf>,
}

impl MediaResolver {
    /// Enumerates `root` and builds the stem lookup table.
    pub fn new(root: &Path) -> Result<Self, ImportError> {
        if !root.is_dir() {
            return Err(ImportError::MissingImagesRoot {
                path: root.to_path_buf(),
            });
        }

        let mut by_stem: BTreeMap<String, PathBuf> = BTreeMap::new();

        for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|source| {
                ImportError::Io(source.into_io_error().unwrap_or_else(|| {
                    std::io::Error::other("directory traversal failed")
                }))
            })?;

            if !entry.file_type().is_file() || !has_media_extension(entry.path()) {
                continue;
            }

            let stem = rel_stem(root, entry.path());
            if let Some(existing) = by_stem.get(&stem) {
                return Err(ImportError::AmbiguousMedia {
                    stem,
                    root: root.to_path_buf(),
                    candidates: vec![existing.clone(), entry.path().to_path_buf()],
                });
            }
            by_stem.insert(stem, entry.path().to_path_buf());
        }

        Ok(Self {
            root: root.to_path_buf(),
            by_stem,
        })
    }

    /// Resolves a record key to exactly one media file.
    ///
    /// A key carrying a recognized extension is first tried as an exact
    /// relative path; otherwise the extension is stripped and the stem table
    /// consulted.
    pub fn resolve(&self, key: &str) -> Result<MediaReference, ImportError> {
        let key = key.trim();

        if has_media_extension(Path::new(key)) {
            let exact = self.root.join(key);
            if exact.is_file() {
                let stem = strip_extension(key);
                return Ok(MediaReference::new(stem, exact));
            }
        }

        // Map keys had exactly one extension stripped, so a dotted basename
        // like `a.b` is already in its lookup form. Try the key verbatim
        // before stripping it a second time.
        if let Some(path) = self.by_stem.get(key) {
            return Ok(MediaReference::new(key.to_string(), path.clone()));
        }

        let stem = strip_extension(key);
        match self.by_stem.get(&stem) {
            Some(path) => Ok(MediaReference::new(stem, path.clone())),
            None => Err(ImportError::MediaNotFound {
                key: key.to_string(),
                root: self.root.clone(),
            }),
        }
    }

    /// All media under the root, in lexicographic stem order.
    ///
    /// Multi-file formats enumerate images through this to get the
    /// deterministic traversal order that first-appearance label ids
    /// depend on.
    pub fn iter(&self) -> impl Iterator<Item = MediaReference> + '_ {
        self.by_stem
            .iter()
            .map(|(stem, path)| MediaReference::new(stem.clone(), path.clone()))
    }
}

fn has_media_extension(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };
    IMAGE_EXTENSIONS
        .iter()
        .any(|allowed| ext.eq_ignore_ascii_case(allowed))
}

/// Relative path with the extension removed, normalized to forward slashes.
fn rel_stem(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    strip_extension(&rel.to_string_lossy().replace('\\', "/"))
}

fn strip_extension(key: &str) -> String {
    match key.rsplit_once('.') {
        // Only strip a real extension, not a dotted directory component.
        Some((stem, ext)) if !ext.contains('/') && !stem.is_empty() => stem.to_string(),
        _ => key.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(path, b"dummy").expect("write file");
    }

    #[test]
    fn resolve_is_extension_insensitive() {
        let temp = tempfile::tempdir().expect("create temp dir");
        touch(&temp.path().join("1.jpg"));
        touch(&temp.path().join("2.png"));

        let resolver = MediaResolver::new(temp.path()).expect("build resolver");

        let with_ext = resolver.resolve("1.jpg").expect("resolve with ext");
        let without_ext = resolver.resolve("1").expect("resolve without ext");
        assert_eq!(with_ext, without_ext);
        assert_eq!(with_ext.id, "1");
        assert!(with_ext.path.ends_with("1.jpg"));
    }

    #[test]
    fn ambiguity_is_fatal_at_build_time() {
        let temp = tempfile::tempdir().expect("create temp dir");
        touch(&temp.path().join("1.jpg"));
        touch(&temp.path().join("1.png"));
        touch(&temp.path().join("2.jpg"));

        let err = MediaResolver::new(temp.path()).unwrap_err();
        match err {
            ImportError::AmbiguousMedia { stem, candidates, .. } => {
                assert_eq!(stem, "1");
                assert_eq!(candidates.len(), 2);
            }
            other => panic!("expected AmbiguousMedia, got {other:?}"),
        }
    }

    #[test]
    fn dotted_basenames_resolve_with_and_without_extension() {
        let temp = tempfile::tempdir().expect("create temp dir");
        touch(&temp.path().join("a.b.jpg"));

        let resolver = MediaResolver::new(temp.path()).expect("build resolver");

        let with_ext = resolver.resolve("a.b.jpg").expect("resolve with ext");
        let without_ext = resolver.resolve("a.b").expect("resolve without ext");
        assert_eq!(with_ext, without_ext);
        assert_eq!(with_ext.id, "a.b");
        assert!(with_ext.path.ends_with("a.b.jpg"));
    }

    #[test]
    fn missing_key_is_media_not_found() {
        let temp = tempfile::tempdir().expect("create temp dir");
        touch(&temp.path().join("a.jpg"));

        let resolver = MediaResolver::new(temp.path()).expect("build resolver");
        let err = resolver.resolve("b").unwrap_err();
        assert!(matches!(err, ImportError::MediaNotFound { .. }));
    }

    #[test]
    fn subdirectories_keep_their_prefix() {
        let temp = tempfile::tempdir().expect("create temp dir");
        touch(&temp.path().join("train/7.bmp"));

        let resolver = MediaResolver::new(temp.path()).expect("build resolver");
        let media = resolver.resolve("train/7").expect("resolve nested key");
        assert_eq!(media.id, "train/7");
    }

    #[test]
    fn iter_is_lexicographic() {
        let temp = tempfile::tempdir().expect("create temp dir");
        touch(&temp.path().join("b.jpg"));
        touch(&temp.path().join("a.jpg"));
        touch(&temp.path().join("c.jpg"));

        let resolver = MediaResolver::new(temp.path()).expect("build resolver");
        let ids: Vec<String> = resolver.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn missing_root_is_fatal() {
        let err = MediaResolver::new(Path::new("/nonexistent/images")).unwrap_err();
        assert!(matches!(err, ImportError::MissingImagesRoot { .. }));
    }
}
