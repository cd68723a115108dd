//! Loaded document registry.
//!
//! # Responsibility
//! - Register decoded documents by name and create their points.
//! - Assign display colors by load order.
//! - Encode and save every loaded document from live point state.
//!
//! # Invariants
//! - Document names are unique; a duplicate load changes nothing.
//! - A failed load leaves the store unchanged.
//! - Saving never mutates documents or points, and one document's failure
//!   does not stop the others from being written.
//! - Each document is saved from its own points only.

use crate::codec::yaml::{self, CodecError, POSES_KEY};
use crate::config::EditorConfig;
use crate::model::point::{DocumentId, PaletteColor, PointArena, PointEntity, PointId};
use crate::model::pose::{FileDocument, Position};
use crate::repo::document_storage::{DocumentStorage, StorageError};
use log::{error, info, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    Codec(CodecError),
    Storage(StorageError),
    UnknownDocument(DocumentId),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Codec(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::UnknownDocument(id) => write!(f, "document not loaded: {id}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Codec(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::UnknownDocument(_) => None,
        }
    }
}

impl From<CodecError> for StoreError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

impl From<StorageError> for StoreError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Result of `DocumentStore::load`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded {
        document: DocumentId,
        poses: usize,
        color: PaletteColor,
    },
    /// A document with this name is already loaded; nothing changed.
    AlreadyLoaded(DocumentId),
}

/// Point data exposed to the rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderPoint {
    pub id: PointId,
    pub position: Position,
    pub color: PaletteColor,
}

/// One registered document with its points in display order.
#[derive(Debug)]
pub struct LoadedDocument {
    id: DocumentId,
    document: FileDocument,
    color: PaletteColor,
    points: Vec<PointId>,
}

impl LoadedDocument {
    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.document.name
    }

    pub fn document(&self) -> &FileDocument {
        &self.document
    }

    pub fn color(&self) -> PaletteColor {
        self.color
    }

    /// Every point handle, deleted ones included, in display order.
    pub fn point_ids(&self) -> &[PointId] {
        &self.points
    }
}

/// Per-document save result.
#[derive(Debug)]
pub struct SaveFailure {
    pub name: String,
    pub error: StoreError,
}

/// Outcome of `save_all`, one entry per attempted document.
#[derive(Debug, Default)]
pub struct SaveReport {
    /// `(name, written pose count)` for each successful write.
    pub saved: Vec<(String, usize)>,
    pub failed: Vec<SaveFailure>,
}

impl SaveReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Registry of loaded documents and the arena of their points.
///
/// Document slots and point slots are append-only for the lifetime of one
/// working directory: `unload` leaves `None` behind so stale handles can never
/// alias a later document. Only `clear` (directory change) reclaims them, so
/// memory grows with the number of loads, not with what is currently open.
#[derive(Debug)]
pub struct DocumentStore {
    config: EditorConfig,
    slots: Vec<Option<LoadedDocument>>,
    by_name: HashMap<String, DocumentId>,
    arena: PointArena,
    load_sequence: usize,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl DocumentStore {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            slots: Vec::new(),
            by_name: HashMap::new(),
            arena: PointArena::new(),
            load_sequence: 0,
        }
    }

    /// Decodes and registers one document.
    ///
    /// # Contract
    /// - Returns `AlreadyLoaded` without decoding when `name` is registered.
    /// - Color is `palette[load_sequence mod palette_len]`.
    /// - Points are created in pose order and all start alive.
    ///
    /// # Errors
    /// - `Codec` when the bytes are not a pose document; nothing is registered.
    pub fn load(&mut self, name: &str, raw: &[u8]) -> StoreResult<LoadOutcome> {
        if let Some(existing) = self.by_name.get(name) {
            info!("event=document_load module=store status=skipped reason=already_loaded name={name}");
            return Ok(LoadOutcome::AlreadyLoaded(*existing));
        }

        let document = match yaml::decode(name, raw) {
            Ok(document) => document,
            Err(err) => {
                error!("event=document_load module=store status=error name={name} error={err}");
                return Err(err.into());
            }
        };

        let id = DocumentId(self.slots.len());
        let color = self.config.color_for(self.load_sequence);
        let points = document
            .poses
            .iter()
            .enumerate()
            .map(|(index, pose)| self.arena.insert(id, index, pose.position(), color))
            .collect::<Vec<_>>();
        let poses = points.len();

        self.by_name.insert(name.to_string(), id);
        self.slots.push(Some(LoadedDocument {
            id,
            document,
            color,
            points,
        }));
        self.load_sequence += 1;

        info!(
            "event=document_load module=store status=ok name={name} document={id} poses={poses} color={}",
            color.as_str()
        );
        Ok(LoadOutcome::Loaded {
            document: id,
            poses,
            color,
        })
    }

    /// Removes a document and vacates its points.
    ///
    /// Returns the removed document's point handles so history referencing
    /// them can be discarded.
    pub fn unload(&mut self, name: &str) -> Option<Vec<PointId>> {
        let id = self.by_name.remove(name)?;
        let loaded = self.slots.get_mut(id.0).and_then(Option::take)?;
        for point in &loaded.points {
            self.arena.vacate(*point);
        }
        info!(
            "event=document_unload module=store status=ok name={name} document={id} points={}",
            loaded.points.len()
        );
        Some(loaded.points)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn document(&self, id: DocumentId) -> Option<&LoadedDocument> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn document_by_name(&self, name: &str) -> Option<&LoadedDocument> {
        self.by_name.get(name).and_then(|id| self.document(*id))
    }

    /// Loaded documents in load order.
    pub fn documents(&self) -> impl Iterator<Item = &LoadedDocument> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Number of successful loads since construction or the last `clear`.
    pub fn load_sequence(&self) -> usize {
        self.load_sequence
    }

    pub fn point(&self, id: PointId) -> Option<&PointEntity> {
        self.arena.get(id)
    }

    pub fn point_mut(&mut self, id: PointId) -> Option<&mut PointEntity> {
        self.arena.get_mut(id)
    }

    pub fn arena(&self) -> &PointArena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut PointArena {
        &mut self.arena
    }

    /// Alive points of one document in display order.
    pub fn points_of(&self, id: DocumentId) -> impl Iterator<Item = &PointEntity> {
        self.document(id)
            .map(|loaded| loaded.points.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(move |point| self.arena.get(*point))
            .filter(|point| point.is_alive())
    }

    /// Alive points of every document, grouped in load order.
    pub fn render_points(&self) -> Vec<RenderPoint> {
        self.documents()
            .flat_map(|loaded| self.points_of(loaded.id))
            .map(|point| RenderPoint {
                id: point.id(),
                position: point.position(),
                color: point.color(),
            })
            .collect()
    }

    /// Encodes one document from its alive points in display order.
    pub fn encode_document(&self, id: DocumentId) -> StoreResult<Vec<u8>> {
        let loaded = self.document(id).ok_or(StoreError::UnknownDocument(id))?;
        Ok(yaml::encode(&loaded.document, self.points_of(id))?)
    }

    /// Encodes and writes every loaded document.
    ///
    /// Documents without a pose sequence are skipped. Failures are collected
    /// per document and never stop the remaining writes.
    pub fn save_all<S>(&self, storage: &S) -> SaveReport
    where
        S: DocumentStorage + ?Sized,
    {
        let mut report = SaveReport::default();
        for loaded in self.documents() {
            let name = loaded.name();
            if !loaded.document.root.contains_key(POSES_KEY) {
                warn!("event=document_save module=store status=skipped reason=no_poses name={name}");
                continue;
            }

            let written = self.points_of(loaded.id).count();
            let result = self
                .encode_document(loaded.id)
                .and_then(|bytes| {
                    storage
                        .write_document(name, &bytes)
                        .map_err(StoreError::from)
                });
            match result {
                Ok(()) => {
                    info!("event=document_save module=store status=ok name={name} poses={written}");
                    report.saved.push((name.to_string(), written));
                }
                Err(err) => {
                    error!("event=document_save module=store status=error name={name} error={err}");
                    report.failed.push(SaveFailure {
                        name: name.to_string(),
                        error: err,
                    });
                }
            }
        }
        report
    }

    /// Drops every document and point and restarts color assignment.
    ///
    /// This is the only place vacated slots are reclaimed; handles issued
    /// before the call must not be used afterwards.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.by_name.clear();
        self.arena.clear();
        self.load_sequence = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::{DocumentStore, LoadOutcome};
    use crate::model::point::PaletteColor;

    const TWO_POSES: &[u8] = b"poses:\n  - position: {x: 0.0, y: 0.0}\n  - position: {x: 1.0, y: 1.0}\n";

    #[test]
    fn colors_follow_load_order_and_skip_duplicates() {
        let mut store = DocumentStore::default();
        store.load("a.yaml", TWO_POSES).unwrap();
        store.load("a.yaml", TWO_POSES).unwrap();
        let outcome = store.load("b.yaml", TWO_POSES).unwrap();

        assert!(matches!(
            outcome,
            LoadOutcome::Loaded {
                color: PaletteColor::Blue,
                ..
            }
        ));
        assert_eq!(store.load_sequence(), 2);
    }

    #[test]
    fn failed_load_leaves_store_unchanged() {
        let mut store = DocumentStore::default();
        store.load("a.yaml", TWO_POSES).unwrap();

        assert!(store.load("bad.yaml", b"name: no poses\n").is_err());
        assert_eq!(store.len(), 1);
        assert_eq!(store.arena().len(), 2);
        assert!(!store.contains("bad.yaml"));
        assert_eq!(store.load_sequence(), 1);
    }

    #[test]
    fn unload_vacates_points_and_keeps_other_documents() {
        let mut store = DocumentStore::default();
        store.load("a.yaml", TWO_POSES).unwrap();
        store.load("b.yaml", TWO_POSES).unwrap();

        let removed = store.unload("a.yaml").unwrap();
        assert_eq!(removed.len(), 2);
        assert!(removed.iter().all(|id| store.point(*id).is_none()));
        assert_eq!(store.render_points().len(), 2);
        assert!(store.unload("a.yaml").is_none());
    }

    #[test]
    fn reopen_issues_fresh_handles_until_clear() {
        let mut store = DocumentStore::default();
        let LoadOutcome::Loaded { document: first, .. } = store.load("a.yaml", TWO_POSES).unwrap()
        else {
            panic!("expected a fresh load");
        };
        let stale = store.unload("a.yaml").unwrap();

        let LoadOutcome::Loaded { document: second, .. } = store.load("a.yaml", TWO_POSES).unwrap()
        else {
            panic!("expected a fresh load");
        };
        assert_ne!(first, second);
        assert!(store.document(first).is_none());
        assert!(stale.iter().all(|id| store.point(*id).is_none()));
        assert!(store
            .points_of(second)
            .all(|point| !stale.contains(&point.id())));

        store.clear();
        let LoadOutcome::Loaded { document: after_clear, .. } =
            store.load("a.yaml", TWO_POSES).unwrap()
        else {
            panic!("expected a fresh load");
        };
        assert_eq!(after_clear.index(), 0);
    }
}
