//! Undo engine for point edits.
//!
//! # Responsibility
//! - Keep one ordered stack of reversible `Move`/`Delete` actions.
//! - Apply the inverse of the most recent action on request.
//!
//! # Invariants
//! - `undo` pops exactly one action and fully reverses it, or leaves both
//!   the stack and the arena untouched.
//! - Undone actions are discarded; there is no redo.
//! - An empty stack is a normal state, never an error.

use crate::model::point::{PointArena, PointEntity, PointId};
use crate::model::pose::Position;
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One recorded, reversible edit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UndoAction {
    Move {
        point: PointId,
        before: Position,
        after: Position,
    },
    Delete {
        point: PointId,
        position_at_deletion: Position,
    },
}

impl UndoAction {
    pub fn point(&self) -> PointId {
        match self {
            Self::Move { point, .. } | Self::Delete { point, .. } => *point,
        }
    }
}

/// Result of one `undo` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UndoOutcome {
    /// The action was popped and its inverse applied.
    Applied(UndoAction),
    /// Nothing to undo.
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoError {
    /// Moves can only be recorded for points that are not deleted.
    PointNotAlive(PointId),
    /// The action references a point that no longer exists in the arena.
    UnknownPoint(PointId),
}

impl Display for UndoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PointNotAlive(id) => write!(f, "cannot record move for deleted point {id}"),
            Self::UnknownPoint(id) => write!(f, "undo target point not found: {id}"),
        }
    }
}

impl Error for UndoError {}

/// LIFO action log.
#[derive(Debug, Default)]
pub struct UndoEngine {
    stack: Vec<UndoAction>,
}

impl UndoEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a move. Must be called before `PointEntity::move_to`.
    pub fn record_move(
        &mut self,
        point: &PointEntity,
        before: Position,
        after: Position,
    ) -> Result<(), UndoError> {
        if !point.is_alive() {
            return Err(UndoError::PointNotAlive(point.id()));
        }
        self.stack.push(UndoAction::Move {
            point: point.id(),
            before,
            after,
        });
        debug!(
            "event=undo_record module=history kind=move point={} depth={}",
            point.id(),
            self.stack.len()
        );
        Ok(())
    }

    /// Records a delete. The caller has already marked the point deleted.
    pub fn record_delete(&mut self, point: &PointEntity, position_at_deletion: Position) {
        self.stack.push(UndoAction::Delete {
            point: point.id(),
            position_at_deletion,
        });
        debug!(
            "event=undo_record module=history kind=delete point={} depth={}",
            point.id(),
            self.stack.len()
        );
    }

    /// Pops the most recent action and applies its inverse to `arena`.
    ///
    /// A `Move` inverse repositions the point whether or not it is alive.
    ///
    /// # Errors
    /// - `UnknownPoint` when the target slot was vacated. The action is put
    ///   back so the stack is unchanged.
    pub fn undo(&mut self, arena: &mut PointArena) -> Result<UndoOutcome, UndoError> {
        let Some(action) = self.stack.pop() else {
            return Ok(UndoOutcome::Empty);
        };

        let Some(point) = arena.get_mut(action.point()) else {
            self.stack.push(action);
            return Err(UndoError::UnknownPoint(action.point()));
        };

        match action {
            UndoAction::Move { before, .. } => point.move_to(before),
            UndoAction::Delete {
                position_at_deletion,
                ..
            } => {
                point.mark_restored();
                point.move_to(position_at_deletion);
            }
        }

        debug!(
            "event=undo_apply module=history point={} depth={}",
            action.point(),
            self.stack.len()
        );
        Ok(UndoOutcome::Applied(action))
    }

    /// Returns the action the next `undo` would reverse.
    pub fn peek(&self) -> Option<&UndoAction> {
        self.stack.last()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }

    /// Drops every action whose point matches `predicate`.
    ///
    /// Used when points leave the arena so no action outlives its target.
    pub fn discard_points<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(PointId) -> bool,
    {
        let before = self.stack.len();
        self.stack.retain(|action| !predicate(action.point()));
        before - self.stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{UndoAction, UndoEngine, UndoError, UndoOutcome};
    use crate::model::point::{DocumentId, PaletteColor, PointArena, PointId};
    use crate::model::pose::Position;

    fn arena_with(points: &[(f64, f64)]) -> (PointArena, Vec<PointId>) {
        let mut arena = PointArena::new();
        let ids = points
            .iter()
            .enumerate()
            .map(|(index, (x, y))| {
                arena.insert(DocumentId(0), index, Position::new(*x, *y), PaletteColor::Red)
            })
            .collect();
        (arena, ids)
    }

    #[test]
    fn record_move_rejects_deleted_point() {
        let (mut arena, ids) = arena_with(&[(0.0, 0.0)]);
        arena.get_mut(ids[0]).unwrap().mark_deleted();
        let mut engine = UndoEngine::new();

        let err = engine
            .record_move(
                arena.get(ids[0]).unwrap(),
                Position::new(0.0, 0.0),
                Position::new(1.0, 1.0),
            )
            .unwrap_err();
        assert_eq!(err, UndoError::PointNotAlive(ids[0]));
        assert!(engine.is_empty());
    }

    #[test]
    fn undo_on_vacated_point_keeps_stack_intact() {
        let (mut arena, ids) = arena_with(&[(1.0, 1.0)]);
        let mut engine = UndoEngine::new();
        engine
            .record_move(
                arena.get(ids[0]).unwrap(),
                Position::new(1.0, 1.0),
                Position::new(2.0, 2.0),
            )
            .unwrap();
        arena.vacate(ids[0]);

        assert_eq!(
            engine.undo(&mut arena).unwrap_err(),
            UndoError::UnknownPoint(ids[0])
        );
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn discard_points_removes_matching_actions_only() {
        let (arena, ids) = arena_with(&[(0.0, 0.0), (1.0, 1.0)]);
        let mut engine = UndoEngine::new();
        engine.record_delete(arena.get(ids[0]).unwrap(), Position::new(0.0, 0.0));
        engine.record_delete(arena.get(ids[1]).unwrap(), Position::new(1.0, 1.0));

        assert_eq!(engine.discard_points(|id| id == ids[0]), 1);
        assert_eq!(
            engine.peek(),
            Some(&UndoAction::Delete {
                point: ids[1],
                position_at_deletion: Position::new(1.0, 1.0),
            })
        );
    }

    #[test]
    fn empty_undo_reports_empty() {
        let (mut arena, _) = arena_with(&[]);
        let mut engine = UndoEngine::new();
        assert_eq!(engine.undo(&mut arena).unwrap(), UndoOutcome::Empty);
    }
}
