//! Move records: the facts the index is built from.

use serde::{Deserialize, Serialize};

use crate::core::{PositionKey, Side, SourceTag};

/// "From `position`, `mv` is known, belonging to line `line_name` (intended for
/// `intended_side`), originating from `source`."
///
/// Immutable once created; stores only ever add or drop whole records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRecord {
    pub position: PositionKey,
    #[serde(rename = "move")]
    pub mv: String,
    pub line_name: String,
    pub intended_side: Side,
    pub source: SourceTag,
}

impl MoveRecord {
    pub fn new(
        position: PositionKey,
        mv: impl Into<String>,
        line_name: impl Into<String>,
        intended_side: Side,
        source: SourceTag,
    ) -> Self {
        Self {
            position,
            mv: mv.into(),
            line_name: line_name.into(),
            intended_side,
            source,
        }
    }

    /// The `(source, line name)` pair that identifies a line.
    pub fn line_id(&self) -> LineId {
        LineId {
            source: self.source,
            line_name: self.line_name.clone(),
        }
    }

    #[inline]
    pub fn belongs_to(&self, line: &LineId) -> bool {
        self.source == line.source && self.line_name == line.line_name
    }
}

/// Line identity. A line name is only unique within its source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineId {
    pub source: SourceTag,
    pub line_name: String,
}

impl LineId {
    pub fn new(source: SourceTag, line_name: impl Into<String>) -> Self {
        Self {
            source,
            line_name: line_name.into(),
        }
    }
}
