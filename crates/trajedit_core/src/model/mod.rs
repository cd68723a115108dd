//! Editable document model for pose trajectories.
//!
//! # Responsibility
//! - Define passive file data (`FileDocument`, `PoseRecord`).
//! - Define live editable points and the arena that addresses them.
//!
//! # Invariants
//! - Every point is addressed by a stable `PointId`, never reused in a session.
//! - Deletion is represented by the `alive` flag, not by removing the point.

pub mod point;
pub mod pose;
