//! Command-line and shell-line grammar.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use trajedit_core::{EditorConfig, PointId, DEFAULT_EXTENSION};

#[derive(Debug, Parser)]
#[command(
    name = "trajedit",
    version,
    about = "Edit robot pose trajectory files from a line shell"
)]
pub struct Cli {
    /// Working directory holding trajectory files
    pub dir: PathBuf,

    /// Extension of trajectory files in the working directory
    #[arg(long, default_value = DEFAULT_EXTENSION)]
    pub extension: String,

    /// Absolute directory for rolling log files; file logging is off when unset
    #[arg(long, env = "TRAJEDIT_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error
    #[arg(long, env = "TRAJEDIT_LOG_LEVEL")]
    pub log_level: Option<String>,
}

impl Cli {
    pub fn config(&self) -> EditorConfig {
        let mut config = EditorConfig {
            extension: self.extension.clone(),
            ..EditorConfig::default()
        };
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        config
    }
}

/// One line typed at the `trajedit>` prompt.
#[derive(Debug, Parser)]
#[command(
    name = "trajedit",
    no_binary_name = true,
    disable_version_flag = true
)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum ShellCommand {
    /// List trajectory files (`*` marks loaded ones)
    Ls,
    /// Switch working directory; drops all loaded files and edits
    Cd { dir: PathBuf },
    /// Load a file
    Open { file: String },
    /// Unload a file
    Close { file: String },
    /// List visible points
    Points,
    /// Move a point
    Move {
        #[arg(value_parser = parse_point)]
        point: PointId,
        #[arg(allow_negative_numbers = true, value_parser = parse_coordinate)]
        x: f64,
        #[arg(allow_negative_numbers = true, value_parser = parse_coordinate)]
        y: f64,
    },
    /// Delete a point
    Delete {
        #[arg(value_parser = parse_point)]
        point: PointId,
    },
    /// Undo the last edit
    Undo,
    /// Write all loaded files
    Save,
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

fn parse_point(value: &str) -> Result<PointId, String> {
    value
        .parse()
        .map_err(|_| format!("invalid point `{value}`, expected e.g. p3"))
}

fn parse_coordinate(value: &str) -> Result<f64, String> {
    value
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
        .ok_or_else(|| format!("invalid coordinate `{value}`"))
}
