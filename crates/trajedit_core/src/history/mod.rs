//! Edit history for the document model.
//!
//! # Responsibility
//! - Record reversible point edits and apply their inverses.
//!
//! # Invariants
//! - History is strictly LIFO with no redo branch.

pub mod undo;
