//! Storage codecs for trajectory files.
//!
//! # Responsibility
//! - Convert raw file bytes into `FileDocument` values and back.
//! - Keep serialization details out of store and session logic.
//!
//! # Invariants
//! - Decode never produces a partially built document.
//! - Encode derives a fresh pose sequence and never mutates the document.

pub mod yaml;
