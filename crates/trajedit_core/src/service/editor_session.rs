//! Editor session use-case service.
//!
//! # Responsibility
//! - Own all mutable editor state: storage, loaded documents, undo history
//!   and the pending drag.
//! - Translate input events (press, release, delete, undo, save) into
//!   recorded, reversible edits.
//! - Report every event to the activity sink.
//!
//! # Invariants
//! - History is recorded before a point is mutated.
//! - Every command is all-or-nothing: on error neither the store nor the
//!   history changes.
//! - Changing the working directory drops all documents and history.

use crate::config::EditorConfig;
use crate::history::undo::{UndoAction, UndoEngine, UndoError, UndoOutcome};
use crate::model::point::PointId;
use crate::model::pose::Position;
use crate::repo::document_storage::{DocumentStorage, StorageError};
use crate::service::activity::ActivitySink;
use crate::service::document_store::{
    DocumentStore, LoadOutcome, RenderPoint, SaveReport, StoreError,
};
use log::{info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug)]
pub enum SessionError {
    Storage(StorageError),
    Store(StoreError),
    Undo(UndoError),
    /// Point handle does not exist (never created or document closed).
    UnknownPoint(PointId),
    /// Point exists but is deleted.
    PointDeleted(PointId),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Undo(err) => write!(f, "{err}"),
            Self::UnknownPoint(id) => write!(f, "point not found: {id}"),
            Self::PointDeleted(id) => write!(f, "point is deleted: {id}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Undo(err) => Some(err),
            Self::UnknownPoint(_) | Self::PointDeleted(_) => None,
        }
    }
}

impl From<StorageError> for SessionError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<StoreError> for SessionError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<UndoError> for SessionError {
    fn from(value: UndoError) -> Self {
        Self::Undo(value)
    }
}

/// Press position captured between `begin_drag` and `end_drag`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingDrag {
    point: PointId,
    origin: Position,
}

/// Process-owned editor state for one working directory.
pub struct EditorSession<S: DocumentStorage, A: ActivitySink> {
    storage: S,
    store: DocumentStore,
    history: UndoEngine,
    activity: A,
    drag: Option<PendingDrag>,
}

impl<S: DocumentStorage, A: ActivitySink> EditorSession<S, A> {
    pub fn new(storage: S, config: EditorConfig, activity: A) -> Self {
        Self {
            storage,
            store: DocumentStore::new(config),
            history: UndoEngine::new(),
            activity,
            drag: None,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn history(&self) -> &UndoEngine {
        &self.history
    }

    pub fn activity(&self) -> &A {
        &self.activity
    }

    /// Switches to a new working directory.
    ///
    /// Lists candidates from `storage` first; only when that succeeds are
    /// documents, history and colors reset.
    pub fn open_directory(&mut self, storage: S) -> SessionResult<Vec<String>> {
        let names = storage.list_documents()?;
        self.storage = storage;
        self.store.clear();
        self.history.clear();
        self.drag = None;

        info!(
            "event=directory_open module=session status=ok candidates={}",
            names.len()
        );
        self.report(format!("Opened directory with {} files", names.len()));
        Ok(names)
    }

    /// Candidate file names in the current working directory.
    pub fn list_files(&self) -> SessionResult<Vec<String>> {
        Ok(self.storage.list_documents()?)
    }

    /// Reads and loads one file. Loading an already loaded name is a no-op.
    pub fn open_file(&mut self, name: &str) -> SessionResult<LoadOutcome> {
        if let Some(existing) = self.store.document_by_name(name) {
            return Ok(LoadOutcome::AlreadyLoaded(existing.id()));
        }

        let raw = self.storage.read_document(name)?;
        let outcome = self.store.load(name, &raw)?;
        if let LoadOutcome::Loaded { poses, .. } = outcome {
            self.report(format!("Loaded file: {name} ({poses} poses)"));
        }
        Ok(outcome)
    }

    /// Closes one file, dropping its points and their history.
    pub fn close_file(&mut self, name: &str) -> bool {
        let Some(points) = self.store.unload(name) else {
            return false;
        };
        let points = points.into_iter().collect::<HashSet<_>>();
        let discarded = self.history.discard_points(|id| points.contains(&id));
        if self.drag.is_some_and(|drag| points.contains(&drag.point)) {
            self.drag = None;
        }

        info!("event=document_close module=session status=ok name={name} discarded={discarded}");
        self.report(format!("Closed file: {name}"));
        true
    }

    /// Alive points for display.
    pub fn render_points(&self) -> Vec<RenderPoint> {
        self.store.render_points()
    }

    /// Press on a point: remembers where the drag started.
    pub fn begin_drag(&mut self, point: PointId) -> SessionResult<()> {
        let origin = self.alive_position(point)?;
        self.drag = Some(PendingDrag { point, origin });
        Ok(())
    }

    /// Release of a point at `position`.
    ///
    /// Records a move from the press position. Returns `false` when the
    /// point was released where it was pressed and nothing was recorded.
    pub fn end_drag(&mut self, point: PointId, position: Position) -> SessionResult<bool> {
        let current = self.alive_position(point)?;
        let origin = match self.drag.take() {
            Some(drag) if drag.point == point => drag.origin,
            Some(drag) => {
                warn!(
                    "event=drag_end module=session status=mismatch pressed={} released={}",
                    drag.point, point
                );
                current
            }
            None => current,
        };

        if origin == position {
            return Ok(false);
        }
        self.apply_move(point, origin, position)?;
        Ok(true)
    }

    /// Moves a point in one step.
    pub fn move_point(&mut self, point: PointId, position: Position) -> SessionResult<()> {
        let before = self.alive_position(point)?;
        self.apply_move(point, before, position)
    }

    /// Deletes a point, keeping it addressable for undo.
    pub fn delete_point(&mut self, point: PointId) -> SessionResult<()> {
        let position = self.alive_position(point)?;
        let entity = self
            .store
            .point_mut(point)
            .ok_or(SessionError::UnknownPoint(point))?;
        entity.mark_deleted();
        self.history.record_delete(entity, position);
        if self.drag.is_some_and(|drag| drag.point == point) {
            self.drag = None;
        }

        self.report(format!("Deleted point {point} at {position}"));
        Ok(())
    }

    /// Reverses the most recent edit. Nothing to undo is a silent no-op.
    pub fn undo(&mut self) -> SessionResult<UndoOutcome> {
        let outcome = self.history.undo(self.store.arena_mut())?;
        match outcome {
            UndoOutcome::Applied(UndoAction::Move { point, before, .. }) => {
                self.report(format!("Undo move: point {point} moved back to {before}"));
            }
            UndoOutcome::Applied(UndoAction::Delete {
                point,
                position_at_deletion,
            }) => {
                self.report(format!(
                    "Undo delete: point {point} restored to {position_at_deletion}"
                ));
            }
            UndoOutcome::Empty => {}
        }
        Ok(outcome)
    }

    /// Writes every loaded document back to storage.
    pub fn save_all(&mut self) -> SaveReport {
        let report = self.store.save_all(&self.storage);
        for (name, poses) in &report.saved {
            self.report(format!("Saved file: {name} ({poses} poses)"));
        }
        for failure in &report.failed {
            self.report(format!(
                "Failed to save file: {} ({})",
                failure.name, failure.error
            ));
        }
        self.report(format!(
            "Saved modifications to {} files",
            report.saved.len()
        ));
        report
    }

    fn apply_move(
        &mut self,
        point: PointId,
        before: Position,
        after: Position,
    ) -> SessionResult<()> {
        let entity = self
            .store
            .point_mut(point)
            .ok_or(SessionError::UnknownPoint(point))?;
        self.history.record_move(entity, before, after)?;
        entity.move_to(after);

        self.report(format!("Moved point {point} from {before} to {after}"));
        Ok(())
    }

    fn alive_position(&self, point: PointId) -> SessionResult<Position> {
        let entity = self
            .store
            .point(point)
            .ok_or(SessionError::UnknownPoint(point))?;
        if !entity.is_alive() {
            return Err(SessionError::PointDeleted(point));
        }
        Ok(entity.position())
    }

    fn report(&mut self, message: String) {
        info!("event=activity module=session message={message:?}");
        self.activity.record(message);
    }
}
