//! Storage collaborator contracts and filesystem implementation.
//!
//! # Responsibility
//! - Define the read/write/list contract the session persists through.
//! - Keep filesystem details out of store and session logic.
//!
//! # Invariants
//! - Storage APIs deal in raw bytes only; decoding happens above this layer.
//! - Every failure names the document it concerns.

pub mod document_storage;
