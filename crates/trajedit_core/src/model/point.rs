//! Live point entities and their arena.
//!
//! # Responsibility
//! - Represent one editable pose with a mutable position.
//! - Address points through index-stable handles instead of references.
//!
//! # Invariants
//! - `alive` is the source of truth for deleted state.
//! - `mark_deleted`/`mark_restored` never change `position`.
//! - Arena slots are append-only; vacated slots are never reused.

use crate::model::pose::Position;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Opaque handle of one point in a `PointArena`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PointId(pub(crate) usize);

impl PointId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for PointId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "p{}", self.0)
    }
}

impl FromStr for PointId {
    type Err = std::num::ParseIntError;

    /// Accepts the display form (`p3`) or a bare index (`3`).
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let digits = trimmed.strip_prefix('p').unwrap_or(trimmed);
        digits.parse().map(Self)
    }
}

/// Opaque handle of one loaded document slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(pub(crate) usize);

impl DocumentId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for DocumentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "d{}", self.0)
    }
}

/// Display color, assigned per document by load order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteColor {
    Red,
    Blue,
    Green,
    Yellow,
    Cyan,
}

impl PaletteColor {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Cyan => "cyan",
        }
    }
}

/// Editable counterpart of one pose.
#[derive(Debug, Clone, PartialEq)]
pub struct PointEntity {
    id: PointId,
    /// Owning document. Lookup only; the store owns both sides.
    document: DocumentId,
    /// Index of the pose record this point was created from.
    source_index: usize,
    position: Position,
    color: PaletteColor,
    alive: bool,
}

impl PointEntity {
    /// Creates a live point.
    pub fn new(
        id: PointId,
        document: DocumentId,
        source_index: usize,
        position: Position,
        color: PaletteColor,
    ) -> Self {
        Self {
            id,
            document,
            source_index,
            position,
            color,
            alive: true,
        }
    }

    pub fn id(&self) -> PointId {
        self.id
    }

    pub fn document(&self) -> DocumentId {
        self.document
    }

    pub fn source_index(&self) -> usize {
        self.source_index
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn color(&self) -> PaletteColor {
        self.color
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Moves the point without recording history.
    ///
    /// Callers must record the prior position with
    /// `UndoEngine::record_move` first or the edit cannot be undone.
    pub fn move_to(&mut self, position: Position) {
        self.position = position;
    }

    pub fn mark_deleted(&mut self) {
        self.alive = false;
    }

    pub fn mark_restored(&mut self) {
        self.alive = true;
    }
}

/// Slot storage for all points of a session.
///
/// Grows monotonically: `vacate` leaves a `None` hole and only `clear`
/// shrinks the vector. A handle therefore never refers to a different point
/// than the one it was issued for.
#[derive(Debug, Default)]
pub struct PointArena {
    slots: Vec<Option<PointEntity>>,
}

impl PointArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a new point and returns its handle.
    pub fn insert(
        &mut self,
        document: DocumentId,
        source_index: usize,
        position: Position,
        color: PaletteColor,
    ) -> PointId {
        let id = PointId(self.slots.len());
        self.slots.push(Some(PointEntity::new(
            id,
            document,
            source_index,
            position,
            color,
        )));
        id
    }

    pub fn get(&self, id: PointId) -> Option<&PointEntity> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: PointId) -> Option<&mut PointEntity> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Vacates a slot. The handle stays invalid for the rest of the session.
    pub fn vacate(&mut self, id: PointId) -> Option<PointEntity> {
        self.slots.get_mut(id.0).and_then(Option::take)
    }

    /// Iterates occupied slots in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = &PointEntity> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{DocumentId, PaletteColor, PointArena, PointId};
    use crate::model::pose::Position;

    #[test]
    fn delete_and_restore_keep_position() {
        let mut arena = PointArena::new();
        let id = arena.insert(DocumentId(0), 0, Position::new(5.0, 5.0), PaletteColor::Red);
        let point = arena.get_mut(id).unwrap();

        point.mark_deleted();
        assert!(!point.is_alive());
        assert_eq!(point.position(), Position::new(5.0, 5.0));

        point.mark_restored();
        assert!(point.is_alive());
        assert_eq!(point.position(), Position::new(5.0, 5.0));
    }

    #[test]
    fn vacated_slots_are_not_reused() {
        let mut arena = PointArena::new();
        let first = arena.insert(DocumentId(0), 0, Position::default(), PaletteColor::Red);
        arena.vacate(first).unwrap();
        let second = arena.insert(DocumentId(1), 0, Position::default(), PaletteColor::Blue);

        assert_ne!(first, second);
        assert!(arena.get(first).is_none());
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn point_id_parses_display_form() {
        let id = PointId(12);
        assert_eq!(id.to_string().parse::<PointId>().unwrap(), id);
        assert_eq!("7".parse::<PointId>().unwrap(), PointId(7));
        assert!("q1".parse::<PointId>().is_err());
    }

    #[test]
    fn palette_color_serializes_snake_case() {
        let yaml = serde_yaml::to_string(&PaletteColor::Cyan).unwrap();
        assert_eq!(yaml.trim(), "cyan");
    }
}
