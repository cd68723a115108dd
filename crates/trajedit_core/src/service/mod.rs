//! Editor use-case services.
//!
//! # Responsibility
//! - Orchestrate codec, history and storage into editor commands.
//! - Keep input and rendering layers decoupled from storage details.

pub mod activity;
pub mod document_store;
pub mod editor_session;
