//! Editor configuration.
//!
//! # Responsibility
//! - Hold the few knobs the editor core needs: file extension, display
//!   palette and default log level.
//!
//! # Invariants
//! - A validated config always has a non-empty palette and extension.

use crate::logging::default_log_level;
use crate::model::point::PaletteColor;
use crate::repo::document_storage::DEFAULT_EXTENSION;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Palette cycled through by load order.
pub const DEFAULT_PALETTE: [PaletteColor; 5] = [
    PaletteColor::Red,
    PaletteColor::Blue,
    PaletteColor::Green,
    PaletteColor::Yellow,
    PaletteColor::Cyan,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    /// Trajectory file extension, without the leading dot.
    pub extension: String,
    pub palette: Vec<PaletteColor>,
    pub log_level: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            palette: DEFAULT_PALETTE.to_vec(),
            log_level: default_log_level().to_string(),
        }
    }
}

impl EditorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.extension.trim().trim_start_matches('.').is_empty() {
            return Err(ConfigError::EmptyExtension);
        }
        if self.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        Ok(())
    }

    /// Color for the document loaded as number `sequence` (0-based).
    pub fn color_for(&self, sequence: usize) -> PaletteColor {
        match self.palette.len() {
            0 => DEFAULT_PALETTE[sequence % DEFAULT_PALETTE.len()],
            len => self.palette[sequence % len],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    EmptyExtension,
    EmptyPalette,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyExtension => write!(f, "file extension must not be empty"),
            Self::EmptyPalette => write!(f, "palette must contain at least one color"),
        }
    }
}

impl Error for ConfigError {}
