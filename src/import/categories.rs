//! Order-preserving label vocabulary accumulator.

use std::collections::HashMap;

use crate::ir::{CategoryTable, LabelId, Rgb};

/// A mutable label interner scoped to one import run.
///
/// Names get dense, zero-based ids in strict first-appearance order. That
/// order is an external contract: two runs over the same input must produce
/// identical category tables, which is why readers traverse their inputs in
/// a deterministic order before calling [`CategoryBuilder::intern`].
///
/// A builder is owned by the current import call and threaded explicitly
/// through every reader; it is never shared between runs.
#[derive(Debug, Default)]
pub struct CategoryBuilder {
    names: Vec<String>,
    index: HashMap<String, LabelId>,
    colormap: Option<Vec<Rgb>>,
}

impl CategoryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id for `name`, appending it on first occurrence.
    pub fn intern(&mut self, name: &str) -> LabelId {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = LabelId::new(self.names.len());
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), id);
        if let Some(colormap) = &mut self.colormap {
            // Keep the colormap parallel; callers that discover colours use
            // intern_color instead and never hit this placeholder.
            colormap.push(Rgb(0, 0, 0));
        }
        id
    }

    /// Interns a name with its mask colour, keeping the colormap parallel.
    pub fn intern_with_color(&mut self, name: &str, color: Rgb) -> LabelId {
        let had = self.index.contains_key(name);
        let id = self.intern(name);
        let colormap = self.colormap.get_or_insert_with(Vec::new);
        if !had {
            while colormap.len() < self.names.len() {
                colormap.push(color);
            }
            colormap[id.as_usize()] = color;
        }
        id
    }

    /// Number of names interned so far.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Id of the label encoded by `color`, if one was interned with it.
    pub fn id_of_color(&self, color: Rgb) -> Option<LabelId> {
        self.colormap
            .as_ref()
            .and_then(|map| map.iter().position(|&c| c == color))
            .map(LabelId::new)
    }

    /// Consumes the builder into the immutable table shared by the run's items.
    pub fn finish(self) -> CategoryTable {
        match self.colormap {
            Some(colormap) => CategoryTable::with_colormap(self.names, colormap),
            None => CategoryTable::from_names(self.names),
        }
    }
}
