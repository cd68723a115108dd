//! Pose file data model.
//!
//! # Responsibility
//! - Hold one file's ordered pose sequence exactly as decoded.
//! - Keep the original top-level mapping and entries for pass-through writes.
//!
//! # Invariants
//! - `poses` order is the on-disk order and is never rewritten after decode.
//! - `name` is the storage-relative file name and doubles as the store key.

use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;
use std::fmt::{Display, Formatter};

/// 2D position in document (metric) space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

impl From<(f64, f64)> for Position {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// One decoded pose entry.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseRecord {
    pub x: f64,
    pub y: f64,
    /// Verbatim source entry; fields other than `position.x/y` are written
    /// back unchanged on save.
    pub entry: Mapping,
}

impl PoseRecord {
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

/// One loaded trajectory file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileDocument {
    pub name: String,
    pub poses: Vec<PoseRecord>,
    /// Full original top-level mapping, including `poses`.
    pub root: Mapping,
}

impl FileDocument {
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::Position;

    #[test]
    fn position_display_uses_fixed_precision() {
        assert_eq!(Position::new(1.0, -2.5).to_string(), "(1.000, -2.500)");
    }

    #[test]
    fn position_converts_from_tuple() {
        assert_eq!(Position::from((3.0, 4.0)), Position::new(3.0, 4.0));
    }
}
