//! YAML pose file codec.
//!
//! # Responsibility
//! - Locate the `poses` sequence and extract `position.x/y` per entry.
//! - Write live point positions back under `poses`, passing every other
//!   field through unchanged.
//!
//! # Invariants
//! - Decode rejects any document whose pose sequence cannot be located or
//!   whose coordinates are not numeric.
//! - Encode keeps top-level key order and only rewrites `poses`.
//! - Deleted points never reach encoded output.

use crate::model::point::PointEntity;
use crate::model::pose::{FileDocument, PoseRecord};
use serde_yaml::{Mapping, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Top-level key holding the pose sequence.
pub const POSES_KEY: &str = "poses";
/// Per-entry key holding the position mapping.
pub const POSITION_KEY: &str = "position";
const X_KEY: &str = "x";
const Y_KEY: &str = "y";

pub type CodecResult<T> = Result<T, CodecError>;

/// Codec failure for decode and encode paths.
#[derive(Debug)]
pub enum CodecError {
    /// Input is valid YAML but not a pose document.
    MalformedDocument(String),
    /// Input is not valid YAML.
    Parse(serde_yaml::Error),
    /// Output could not be serialized.
    Serialize(serde_yaml::Error),
    /// A point refers to a pose record the document does not have.
    SourceOutOfRange { index: usize, len: usize },
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedDocument(message) => write!(f, "malformed pose document: {message}"),
            Self::Parse(err) => write!(f, "invalid yaml: {err}"),
            Self::Serialize(err) => write!(f, "failed to serialize pose document: {err}"),
            Self::SourceOutOfRange { index, len } => write!(
                f,
                "point source index {index} out of range for document with {len} poses"
            ),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) | Self::Serialize(err) => Some(err),
            Self::MalformedDocument(_) | Self::SourceOutOfRange { .. } => None,
        }
    }
}

/// Decodes one pose file.
///
/// # Errors
/// - `Parse` when the bytes are not YAML.
/// - `MalformedDocument` when the top level is not a mapping, `poses` is
///   absent or not a sequence, or any entry lacks numeric `position.x/y`.
pub fn decode(name: &str, raw: &[u8]) -> CodecResult<FileDocument> {
    let value: Value = serde_yaml::from_slice(raw).map_err(CodecError::Parse)?;
    let root = match value {
        Value::Mapping(mapping) => mapping,
        other => {
            return Err(CodecError::MalformedDocument(format!(
                "top level must be a mapping, found {}",
                value_kind(&other)
            )))
        }
    };

    let entries = match root.get(POSES_KEY) {
        Some(Value::Sequence(entries)) => entries,
        Some(other) => {
            return Err(CodecError::MalformedDocument(format!(
                "`{POSES_KEY}` must be a sequence, found {}",
                value_kind(other)
            )))
        }
        None => {
            return Err(CodecError::MalformedDocument(format!(
                "missing top-level `{POSES_KEY}` key"
            )))
        }
    };

    let poses = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| decode_entry(index, entry))
        .collect::<CodecResult<Vec<_>>>()?;

    Ok(FileDocument {
        name: name.to_string(),
        poses,
        root,
    })
}

/// Encodes a document with the given points as its new pose sequence.
///
/// Points are written in iteration order; points that are not alive are
/// skipped. Each written entry is a copy of the point's source entry with
/// `position.x/y` replaced by the point's current position.
pub fn encode<'a, I>(document: &FileDocument, points: I) -> CodecResult<Vec<u8>>
where
    I: IntoIterator<Item = &'a PointEntity>,
{
    let mut poses = Vec::new();
    for point in points.into_iter().filter(|point| point.is_alive()) {
        let record = document.poses.get(point.source_index()).ok_or(
            CodecError::SourceOutOfRange {
                index: point.source_index(),
                len: document.poses.len(),
            },
        )?;
        let position = point.position();
        poses.push(Value::Mapping(with_position(
            &record.entry,
            position.x,
            position.y,
        )));
    }

    let mut root = document.root.clone();
    root.insert(Value::from(POSES_KEY), Value::Sequence(poses));

    let text = serde_yaml::to_string(&Value::Mapping(root)).map_err(CodecError::Serialize)?;
    Ok(text.into_bytes())
}

fn decode_entry(index: usize, entry: &Value) -> CodecResult<PoseRecord> {
    let mapping = entry.as_mapping().ok_or_else(|| {
        CodecError::MalformedDocument(format!(
            "pose {index} must be a mapping, found {}",
            value_kind(entry)
        ))
    })?;
    let position = mapping
        .get(POSITION_KEY)
        .and_then(Value::as_mapping)
        .ok_or_else(|| {
            CodecError::MalformedDocument(format!(
                "pose {index} is missing a `{POSITION_KEY}` mapping"
            ))
        })?;

    Ok(PoseRecord {
        x: coordinate(index, position, X_KEY)?,
        y: coordinate(index, position, Y_KEY)?,
        entry: mapping.clone(),
    })
}

fn coordinate(index: usize, position: &Mapping, key: &str) -> CodecResult<f64> {
    match position.get(key) {
        Some(value) => value.as_f64().ok_or_else(|| {
            CodecError::MalformedDocument(format!(
                "pose {index} `{POSITION_KEY}.{key}` must be numeric, found {}",
                value_kind(value)
            ))
        }),
        None => Err(CodecError::MalformedDocument(format!(
            "pose {index} is missing `{POSITION_KEY}.{key}`"
        ))),
    }
}

fn with_position(entry: &Mapping, x: f64, y: f64) -> Mapping {
    let mut entry = entry.clone();
    let mut position = entry
        .get(POSITION_KEY)
        .and_then(Value::as_mapping)
        .cloned()
        .unwrap_or_default();
    position.insert(Value::from(X_KEY), Value::from(x));
    position.insert(Value::from(Y_KEY), Value::from(y));
    entry.insert(Value::from(POSITION_KEY), Value::Mapping(position));
    entry
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::{decode, CodecError};

    #[test]
    fn decode_accepts_integer_coordinates() {
        let doc = decode("int.yaml", b"poses:\n  - position: {x: 1, y: -2}\n").unwrap();
        assert_eq!(doc.poses[0].x, 1.0);
        assert_eq!(doc.poses[0].y, -2.0);
    }

    #[test]
    fn decode_reports_offending_entry_index() {
        let raw = b"poses:\n  - position: {x: 1.0, y: 2.0}\n  - position: {x: 1.0}\n";
        let err = decode("bad.yaml", raw).unwrap_err();
        assert!(matches!(err, CodecError::MalformedDocument(_)));
        assert!(err.to_string().contains("pose 1"), "unexpected error: {err}");
    }

    #[test]
    fn decode_rejects_non_mapping_top_level() {
        let err = decode("list.yaml", b"- 1\n- 2\n").unwrap_err();
        assert!(err.to_string().contains("top level must be a mapping"));
    }

    #[test]
    fn decode_rejects_invalid_yaml() {
        let err = decode("broken.yaml", b"poses: [unclosed").unwrap_err();
        assert!(matches!(err, CodecError::Parse(_)));
    }
}
