//! Relaxed VOC-style layout: one XML object-description file per image.
//!
//! Items are enumerated from the images root, not the annotation directory,
//! so an image without a description file still becomes an item with zero
//! annotations. Individual malformed `<object>` entries are skipped with a
//! warning; an unparseable file degrades its item to empty annotations. The
//! tolerance is the point of this variant, not an accident.

use std::fs;
use std::path::Path;

use roxmltree::{Document, Node};

use crate::error::ImportError;
use crate::ir::Annotation;

use super::assemble::ItemAssembler;
use super::categories::CategoryBuilder;
use super::media::MediaResolver;
use super::report::{ImportReport, ImportWarning, WarningCode, WarningContext};
use super::Import;

const VOC_EXTENSION: &str = "xml";

/// Read a directory of per-image VOC XML files against an images root.
///
/// `ann_dir` may be a dedicated annotations directory or the images root
/// itself, with XML files sitting next to the images.
pub fn read_relaxed_voc(images_root: &Path, ann_dir: &Path) -> Result<Import, ImportError> {
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
        let xml_path = ann_dir.join(&media.id).with_extension(VOC_EXTENSION);
        let item = assembler.item_mut(media);

        if !xml_path.is_file() {
            // Image-only item; tolerated by design.
            continue;
        }

        let content = match fs::read_to_string(&xml_path) {
            Ok(content) => content,
            Err(err) => {
                report.add(ImportWarning::new(
                    WarningCode::UnparseableFile,
                    format!("could not read file: {err}"),
                    WarningContext::file(&xml_path),
                ));
                continue;
            }
        };

        let document = match Document::parse(&content) {
            Ok(document) => document,
            Err(err) => {
                report.add(ImportWarning::new(
                    WarningCode::UnparseableFile,
                    format!("invalid XML: {err}"),
                    WarningContext::file(&xml_path),
                ));
                continue;
            }
        };

        for object in document
            .root_element()
            .children()
            .filter(|node| node.has_tag_name("object"))
        {
            match parse_object(object) {
                Some((name, xmin, ymin, xmax, ymax)) => {
                    let label = categories.intern(&name);
                    let ordinal = item.annotations.len();
                    item.annotations.push(Annotation::Bbox {
                        x: xmin,
                        y: ymin,
                        w: xmax - xmin,
                        h: ymax - ymin,
                        label,
                        ordinal,
                    });
                }
                None => {
                    report.add(ImportWarning::new(
                        WarningCode::MalformedObject,
                        "object entry is missing its name or box coordinates",
                        WarningContext::file(&xml_path),
                    ));
                }
            }
        }
    }

    Ok(assembler.finish(categories, report))
}

/// Extracts (name, xmin, ymin, xmax, ymax) from one `<object>` node.
fn parse_object(object: Node<'_, '_>) -> Option<(String, f64, f64, f64, f64)> {
    let name = child_text(object, "name")?;
    let bndbox = object.children().find(|node| node.has_tag_name("bndbox"))?;

    let xmin = child_f64(bndbox, "xmin")?;
    let ymin = child_f64(bndbox, "ymin")?;
    let xmax = child_f64(bndbox, "xmax")?;
    let ymax = child_f64(bndbox, "ymax")?;

    Some((name, xmin, ymin, xmax, ymax))
}

fn child_text(node: Node<'_, '_>, tag: &str) -> Option<String> {
    let text = node
        .children()
        .find(|child| child.has_tag_name(tag))?
        .text()?
        .trim()
        .to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn child_f64(node: Node<'_, '_>, tag: &str) -> Option<f64> {
    child_text(node, tag)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::LabelId;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(path, b"dummy").expect("write file");
    }

    const XML_TWO_OBJECTS: &str = "<annotation>\n  <object>\n    <name>cat</name>\n    <bndbox><xmin>1</xmin><ymin>2</ymin><xmax>3</xmax><ymax>4</ymax></bndbox>\n  </object>\n  <object>\n    <name>person</name>\n    <bndbox><xmin>4</xmin><ymin>5</ymin><xmax>6</xmax><ymax>7</ymax></bndbox>\n  </object>\n</annotation>\n";

    #[test]
    fn boxes_convert_to_xywh_with_sequential_ordinals() {
        let temp = tempfile::tempdir().expect("create temp dir");
        touch(&temp.path().join("images/2007_000001.jpg"));
        fs::create_dir_all(temp.path().join("annotations")).expect("create ann dir");
        fs::write(
            temp.path().join("annotations/2007_000001.xml"),
            XML_TWO_OBJECTS,
        )
        .expect("write xml");

        let import = read_relaxed_voc(
            &temp.path().join("images"),
            &temp.path().join("annotations"),
        )
        .expect("import voc");

        assert_eq!(import.dataset.items.len(), 1);
        assert_eq!(
            import.dataset.categories.names(),
            &["cat".to_string(), "person".to_string()]
        );
        assert_eq!(
            import.dataset.items[0].annotations,
            vec![
                Annotation::Bbox {
                    x: 1.0,
                    y: 2.0,
                    w: 2.0,
                    h: 2.0,
                    label: LabelId(0),
                    ordinal: 0,
                },
                Annotation::Bbox {
                    x: 4.0,
                    y: 5.0,
                    w: 2.0,
                    h: 2.0,
                    label: LabelId(1),
                    ordinal: 1,
                },
            ]
        );
    }

    #[test]
    fn image_without_annotation_file_yields_empty_item() {
        let temp = tempfile::tempdir().expect("create temp dir");
        touch(&temp.path().join("images/2007_000002.jpg"));
        fs::create_dir_all(temp.path().join("annotations")).expect("create ann dir");

        let import = read_relaxed_voc(
            &temp.path().join("images"),
            &temp.path().join("annotations"),
        )
        .expect("import voc");

        assert!(import.report.is_clean());
        assert_eq!(import.dataset.items.len(), 1);
        assert!(import.dataset.items[0].annotations.is_empty());
    }

    #[test]
    fn malformed_object_is_skipped_with_warning() {
        let temp = tempfile::tempdir().expect("create temp dir");
        touch(&temp.path().join("images/1.jpg"));
        fs::create_dir_all(temp.path().join("annotations")).expect("create ann dir");
        fs::write(
            temp.path().join("annotations/1.xml"),
            "<annotation>\n  <object><name>cat</name></object>\n  <object>\n    <name>dog</name>\n    <bndbox><xmin>0</xmin><ymin>0</ymin><xmax>2</xmax><ymax>2</ymax></bndbox>\n  </object>\n</annotation>\n",
        )
        .expect("write xml");

        let import = read_relaxed_voc(
            &temp.path().join("images"),
            &temp.path().join("annotations"),
        )
        .expect("import voc");

        assert_eq!(
            import.report.with_code(WarningCode::MalformedObject).count(),
            1
        );
        let item = &import.dataset.items[0];
        assert_eq!(item.annotations.len(), 1);
        // The surviving box takes ordinal 0 even though it was second in file order.
        assert!(matches!(
            item.annotations[0],
            Annotation::Bbox { ordinal: 0, .. }
        ));
        assert_eq!(import.dataset.categories.names(), &["dog".to_string()]);
    }

    #[test]
    fn unparseable_file_degrades_to_empty_item() {
        let temp = tempfile::tempdir().expect("create temp dir");
        touch(&temp.path().join("images/1.jpg"));
        fs::create_dir_all(temp.path().join("annotations")).expect("create ann dir");
        fs::write(temp.path().join("annotations/1.xml"), "not xml at all <<<")
            .expect("write xml");

        let import = read_relaxed_voc(
            &temp.path().join("images"),
            &temp.path().join("annotations"),
        )
        .expect("import voc");

        assert_eq!(
            import.report.with_code(WarningCode::UnparseableFile).count(),
            1
        );
        assert_eq!(import.dataset.items.len(), 1);
        assert!(import.dataset.items[0].annotations.is_empty());
    }

    #[test]
    fn annotations_beside_images_are_accepted() {
        let temp = tempfile::tempdir().expect("create temp dir");
        touch(&temp.path().join("1.jpg"));
        fs::write(temp.path().join("1.xml"), XML_TWO_OBJECTS).expect("write xml");

        let import = read_relaxed_voc(temp.path(), temp.path()).expect("import voc");
        assert_eq!(import.dataset.items.len(), 1);
        assert_eq!(import.dataset.items[0].annotations.len(), 2);
    }
}
