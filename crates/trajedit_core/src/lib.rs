//! Core document model for the trajectory editor.
//! This crate is the single source of truth for editing invariants.

pub mod codec;
pub mod config;
pub mod history;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use codec::yaml::{decode, encode, CodecError, CodecResult};
pub use config::{ConfigError, EditorConfig, DEFAULT_PALETTE};
pub use history::undo::{UndoAction, UndoEngine, UndoError, UndoOutcome};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::point::{DocumentId, PaletteColor, PointArena, PointEntity, PointId};
pub use model::pose::{FileDocument, PoseRecord, Position};
pub use repo::document_storage::{
    DocumentStorage, FsDocumentStorage, StorageError, StorageResult, DEFAULT_EXTENSION,
};
pub use service::activity::{ActivitySink, MemoryActivityLog};
pub use service::document_store::{
    DocumentStore, LoadOutcome, LoadedDocument, RenderPoint, SaveFailure, SaveReport,
    StoreError, StoreResult,
};
pub use service::editor_session::{EditorSession, SessionError, SessionResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
