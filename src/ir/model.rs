//! Core dataset model for the looselabel unified representation.
//!
//! Every format-specific reader converges on these types: items with
//! resolved media, a single ordered category table per import run, and
//! typed annotations.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::ids::LabelId;
use super::mask::BinaryMask;

/// Subset tag used when a layout carries no split information.
pub const DEFAULT_SUBSET: &str = "default";

/// An RGB colour triple, as used by mask colormaps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// The ordered, deduplicated label vocabulary of one import run.
///
/// The index of a name is its [`LabelId`]; ids are dense and zero-based.
/// For mask imports a parallel colormap maps each id to the RGB triple that
/// encodes it in the mask images.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryTable {
    labels: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    colormap: Option<Vec<Rgb>>,
}

impl CategoryTable {
    /// Builds a table from names in order, without a colormap.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: names.into_iter().map(Into::into).collect(),
            colormap: None,
        }
    }

    /// Builds a table with a colormap parallel to the names.
    ///
    /// Panics if the lengths differ; callers construct both sides together.
    pub fn with_colormap<I, S>(names: I, colormap: Vec<Rgb>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = names.into_iter().map(Into::into).collect();
        assert_eq!(labels.len(), colormap.len(), "colormap length mismatch");
        Self {
            labels,
            colormap: Some(colormap),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label names in id order.
    pub fn names(&self) -> &[String] {
        &self.labels
    }

    pub fn name(&self, id: LabelId) -> Option<&str> {
        self.labels.get(id.as_usize()).map(String::as_str)
    }

    /// Linear scan; the table is small and this is not on a hot path.
    pub fn id_of(&self, name: &str) -> Option<LabelId> {
        self.labels
            .iter()
            .position(|label| label == name)
            .map(LabelId::new)
    }

    pub fn colormap(&self) -> Option<&[Rgb]> {
        self.colormap.as_deref()
    }

    pub fn color(&self, id: LabelId) -> Option<Rgb> {
        self.colormap
            .as_ref()
            .and_then(|map| map.get(id.as_usize()))
            .copied()
    }
}

/// A resolved piece of media: the logical id used by annotation records and
/// the concrete file it resolved to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaReference {
    /// Extension-stripped logical identifier (relative to the images root).
    pub id: String,

    /// Resolved filesystem path of the image.
    pub path: PathBuf,
}

impl MediaReference {
    pub fn new(id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
        }
    }
}

/// A single typed annotation attached to a dataset item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Annotation {
    /// A whole-image classification tag.
    Label { label: LabelId },

    /// An axis-aligned box in pixel units, (x, y) top-left, plus width and
    /// height. `ordinal` is a zero-based per-item counter assigned in read
    /// order; it gives boxes a stable identity when comparing datasets.
    Bbox {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        label: LabelId,
        ordinal: usize,
    },

    /// A per-class binary mask with the same extent as the owning image.
    Mask { label: LabelId, mask: BinaryMask },
}

/// One imported item: media plus its annotations, in record order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatasetItem {
    pub id: String,
    pub subset: String,
    pub media: MediaReference,
    pub annotations: Vec<Annotation>,
}

impl DatasetItem {
    pub fn new(id: impl Into<String>, media: MediaReference) -> Self {
        Self {
            id: id.into(),
            subset: DEFAULT_SUBSET.to_string(),
            media,
            annotations: Vec::new(),
        }
    }
}

/// The unified result of one import run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub items: Vec<DatasetItem>,
    pub categories: CategoryTable,
}

impl Dataset {
    /// Total annotation count across all items.
    pub fn annotation_count(&self) -> usize {
        self.items.iter().map(|item| item.annotations.len()).sum()
    }
}
