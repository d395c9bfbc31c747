//! Folding parsed records into final dataset items.

use std::collections::HashMap;

use crate::ir::{Annotation, Dataset, DatasetItem, MediaReference};

use super::categories::CategoryBuilder;
use super::report::ImportReport;
use super::Import;

/// Accumulates items in first-reference order during a single-pass import.
///
/// Tabular layouts can mention the same media key on several records; the
/// assembler appends later annotations to the already-created item instead
/// of duplicating it. Label ids are assigned at first encounter, so item
/// materialization never has to wait for the category table to finish.
#[derive(Debug, Default)]
pub struct ItemAssembler {
    items: Vec<DatasetItem>,
    index: HashMap<String, usize>,
}

impl ItemAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the item for `media`, creating it on first reference.
    pub fn item_mut(&mut self, media: MediaReference) -> &mut DatasetItem {
        let idx = match self.index.get(&media.id) {
            Some(&idx) => idx,
            None => {
                let idx = self.items.len();
                self.index.insert(media.id.clone(), idx);
                self.items.push(DatasetItem::new(media.id.clone(), media));
                idx
            }
        };
        &mut self.items[idx]
    }

    /// Creates the item and appends one annotation in a single step.
    pub fn push(&mut self, media: MediaReference, annotation: Annotation) {
        self.item_mut(media).annotations.push(annotation);
    }

    /// Finalizes the run: items in first-reference order plus the finished
    /// category table and the warnings recorded along the way.
    pub fn finish(self, categories: CategoryBuilder, report: ImportReport) -> Import {
        Import {
            dataset: Dataset {
                items: self.items,
                categories: categories.finish(),
            },
            report,
        }
    }
}
