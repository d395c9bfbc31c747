mod common;

use std::collections::BTreeSet;

use looselabel::import::{io_mask, WarningCode};
use looselabel::ir::{Annotation, BinaryMask, LabelId, Rgb};

use common::{write_bmp, write_mask_png, write_text};

const BLACK: Rgb = Rgb(0, 0, 0);
const WHITE: Rgb = Rgb(255, 255, 255);
const RED: Rgb = Rgb(255, 0, 0);
const GREEN: Rgb = Rgb(0, 255, 0);

#[test]
fn discovery_mode_interns_colors_in_scan_order() {
    let temp = tempfile::tempdir().expect("create temp dir");
    write_bmp(&temp.path().join("images/001.jpg"), 5, 1);
    write_bmp(&temp.path().join("images/002.jpg"), 5, 1);
    // 001 is scanned first and starts with black, so black becomes id 0.
    write_mask_png(
        &temp.path().join("masks/001.png"),
        &[&[BLACK, BLACK, WHITE, WHITE, BLACK]],
    );
    write_mask_png(
        &temp.path().join("masks/002.png"),
        &[&[WHITE, WHITE, BLACK, WHITE, BLACK]],
    );

    let import = io_mask::read_image_mask(
        &temp.path().join("images"),
        &temp.path().join("masks"),
        None,
    )
    .expect("import masks");

    assert!(import.report.is_clean());
    let dataset = &import.dataset;
    assert_eq!(
        dataset.categories.names(),
        &["background".to_string(), "object".to_string()]
    );
    assert_eq!(dataset.categories.colormap(), Some(&[BLACK, WHITE][..]));

    assert_eq!(dataset.items.len(), 2);
    assert_eq!(
        dataset.items[0].annotations,
        vec![
            Annotation::Mask {
                label: LabelId(0),
                mask: BinaryMask::from_rows(&[&[1, 1, 0, 0, 1]]),
            },
            Annotation::Mask {
                label: LabelId(1),
                mask: BinaryMask::from_rows(&[&[0, 0, 1, 1, 0]]),
            },
        ]
    );
    assert_eq!(
        dataset.items[1].annotations,
        vec![
            Annotation::Mask {
                label: LabelId(0),
                mask: BinaryMask::from_rows(&[&[0, 0, 1, 0, 1]]),
            },
            Annotation::Mask {
                label: LabelId(1),
                mask: BinaryMask::from_rows(&[&[1, 1, 0, 1, 0]]),
            },
        ]
    );
}

#[test]
fn explicit_labelmap_fixes_names_and_colormap() {
    let temp = tempfile::tempdir().expect("create temp dir");
    for id in ["001", "002", "003"] {
        write_bmp(&temp.path().join(format!("images/{id}.jpg")), 5, 1);
    }
    write_text(
        &temp.path().join("labelmap.csv"),
        "id,color,name\n0,0 0 0,background\n1,255 0 0,cat\n2,0 255 0,dog\n",
    );
    write_mask_png(
        &temp.path().join("masks/001.png"),
        &[&[RED, GREEN, BLACK, GREEN, RED]],
    );
    write_mask_png(
        &temp.path().join("masks/002.png"),
        &[&[BLACK, BLACK, GREEN, BLACK, RED]],
    );
    write_mask_png(
        &temp.path().join("masks/003.png"),
        &[&[GREEN, RED, BLACK, BLACK, BLACK]],
    );

    let import = io_mask::read_image_mask(
        &temp.path().join("images"),
        &temp.path().join("masks"),
        Some(&temp.path().join("labelmap.csv")),
    )
    .expect("import masks");

    assert!(import.report.is_clean());
    let dataset = &import.dataset;
    assert_eq!(
        dataset.categories.names(),
        &[
            "background".to_string(),
            "cat".to_string(),
            "dog".to_string()
        ]
    );
    assert_eq!(
        dataset.categories.colormap(),
        Some(&[BLACK, RED, GREEN][..])
    );

    // Every item emits its masks in ascending label-id order regardless of
    // which colour its first pixel has.
    assert_eq!(
        dataset.items[0].annotations,
        vec![
            Annotation::Mask {
                label: LabelId(0),
                mask: BinaryMask::from_rows(&[&[0, 0, 1, 0, 0]]),
            },
            Annotation::Mask {
                label: LabelId(1),
                mask: BinaryMask::from_rows(&[&[1, 0, 0, 0, 1]]),
            },
            Annotation::Mask {
                label: LabelId(2),
                mask: BinaryMask::from_rows(&[&[0, 1, 0, 1, 0]]),
            },
        ]
    );
}

#[test]
fn unmapped_color_degrades_item_but_not_run() {
    let temp = tempfile::tempdir().expect("create temp dir");
    write_bmp(&temp.path().join("images/001.jpg"), 2, 1);
    write_bmp(&temp.path().join("images/002.jpg"), 2, 1);
    write_text(
        &temp.path().join("labelmap.csv"),
        "id,color,name\n0,0 0 0,background\n",
    );
    write_mask_png(&temp.path().join("masks/001.png"), &[&[BLACK, WHITE]]);
    write_mask_png(&temp.path().join("masks/002.png"), &[&[BLACK, BLACK]]);

    let import = io_mask::read_image_mask(
        &temp.path().join("images"),
        &temp.path().join("masks"),
        Some(&temp.path().join("labelmap.csv")),
    )
    .expect("import masks");

    assert_eq!(import.report.with_code(WarningCode::UnmappedColor).count(), 1);
    assert_eq!(import.dataset.items.len(), 2);
    assert!(import.dataset.items[0].annotations.is_empty());
    assert_eq!(import.dataset.items[1].annotations.len(), 1);
}

#[test]
fn masks_partition_each_image() {
    let temp = tempfile::tempdir().expect("create temp dir");
    write_bmp(&temp.path().join("images/a.jpg"), 4, 2);
    write_mask_png(
        &temp.path().join("masks/a.png"),
        &[
            &[BLACK, BLACK, RED, RED],
            &[GREEN, BLACK, RED, GREEN],
        ],
    );

    let import = io_mask::read_image_mask(
        &temp.path().join("images"),
        &temp.path().join("masks"),
        None,
    )
    .expect("import masks");

    let item = &import.dataset.items[0];
    // One mask per distinct colour present in the image.
    assert_eq!(item.annotations.len(), 3);

    // Each pixel belongs to exactly one emitted mask.
    for y in 0..2 {
        for x in 0..4 {
            let owners: BTreeSet<usize> = item
                .annotations
                .iter()
                .enumerate()
                .filter(|(_, ann)| match ann {
                    Annotation::Mask { mask, .. } => mask.get(x, y) == 1,
                    _ => false,
                })
                .map(|(idx, _)| idx)
                .collect();
            assert_eq!(owners.len(), 1, "pixel ({x}, {y}) has {owners:?} owners");
        }
    }
}

#[test]
fn missing_mask_dir_is_fatal() {
    let temp = tempfile::tempdir().expect("create temp dir");
    write_bmp(&temp.path().join("images/001.jpg"), 2, 1);

    let err = io_mask::read_image_mask(
        &temp.path().join("images"),
        &temp.path().join("masks"),
        None,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        looselabel::ImportError::MissingAnnotationPath { .. }
    ));
}
