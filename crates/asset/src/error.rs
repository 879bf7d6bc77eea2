//! Loader diagnostics.

use std::{fmt, io, path::PathBuf};

use thiserror::Error;

use crate::mesh::IndexWidth;

/// Record kinds the OBJ reader understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordTag {
    Vertex,
    Face,
}

impl RecordTag {
    /// Number of fields a well-formed record carries after the tag.
    pub const fn expected_fields(self) -> usize {
        match self {
            RecordTag::Vertex => 3,
            RecordTag::Face => 6,
        }
    }
}

impl fmt::Display for RecordTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordTag::Vertex => f.write_str("v"),
            RecordTag::Face => f.write_str("f"),
        }
    }
}

/// A `v` or `f` record that did not match its field pattern.
///
/// `values` holds the raw text of the fields that did match, in file order.
#[derive(Clone, Debug, Error, PartialEq)]
#[error(
    "malformed `{tag}` record on line {line}: matched {scanned} of {} fields {values:?}",
    .tag.expected_fields()
)]
pub struct MalformedRecord {
    pub line: usize,
    pub tag: RecordTag,
    pub scanned: usize,
    pub values: Vec<String>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("couldn't read {}: {source}", .path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    MalformedRecord(#[from] MalformedRecord),

    #[error(
        "geometry lengths don't line up: {vertices} vertex floats, \
         {face_indices} face indices, {normal_indices} normal indices"
    )]
    InconsistentGeometry {
        vertices: usize,
        face_indices: usize,
        normal_indices: usize,
    },

    #[error("{buffer} indices need a maximum value of {required}, which does not fit {width}")]
    CapacityOverflow {
        buffer: &'static str,
        width: IndexWidth,
        required: u64,
    },
}
