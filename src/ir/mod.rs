//! Unified representation for imported annotation datasets.
//!
//! This module defines the single object model that all five supported
//! layouts converge on: [`DatasetItem`]s owning resolved media, one ordered
//! [`CategoryTable`] per import run, and typed [`Annotation`]s.
//!
//! # Design Principles
//!
//! 1. **One model, many layouts**: readers do the converging; these types
//!    never know which layout produced them.
//!
//! 2. **Dense label ids**: a [`LabelId`] is an index into the run's category
//!    table, assigned in first-appearance order. Downstream comparisons rely
//!    on that order being deterministic.
//!
//! 3. **Permissive construction**: the model can represent data a validator
//!    would reject (e.g. a zero-area box), so parsing never panics.

mod ids;
mod mask;
mod model;

// Re-export core types for convenient access
pub use ids::LabelId;
pub use mask::BinaryMask;
pub use model::{
    Annotation, CategoryTable, Dataset, DatasetItem, MediaReference, Rgb, DEFAULT_SUBSET,
};
