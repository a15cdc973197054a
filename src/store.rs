//! Source stores: one editable record collection per [`SourceTag`].
//!
//! A store is only edited by whole lines: [`SourceStore::replace_line`] swaps every record
//! of one line name for a new path, [`SourceStore::remove_lines`] drops records by name
//! pattern and [`SourceStore::clear`] empties it. Records are never patched field by field.

use std::collections::BTreeMap;

use crate::core::{PositionKey, Side, SourceMap, SourceTag};
use crate::record::MoveRecord;

/// A line ready to be written: the plies of every game in one batch segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedLine {
    pub name: String,
    pub intended_side: Side,
    /// `(position before the move, move)` in replay order, without duplicates.
    pub plies: Vec<(PositionKey, String)>,
}

/// Which line names a delete applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinePattern {
    /// Exactly this name.
    Exact(String),
    /// `base` itself and every numbered sibling `"base N"` a batch import produces.
    Variations(String),
}

impl LinePattern {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            LinePattern::Exact(n) => n == name,
            LinePattern::Variations(base) => {
                if name == base {
                    return true;
                }
                name.strip_prefix(base.as_str())
                    .and_then(|rest| rest.strip_prefix(' '))
                    .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplaceOutcome {
    pub removed: usize,
    pub inserted: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceStore {
    tag: SourceTag,
    buckets: BTreeMap<PositionKey, Vec<MoveRecord>>,
}

impl SourceStore {
    pub fn new(tag: SourceTag) -> Self {
        Self {
            tag,
            buckets: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn tag(&self) -> SourceTag {
        self.tag
    }

    /// Records at `key`, in insertion order.
    pub fn get(&self, key: &PositionKey) -> &[MoveRecord] {
        self.buckets.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Buckets in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&PositionKey, &[MoveRecord])> + '_ {
        self.buckets.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn records(&self) -> impl Iterator<Item = &MoveRecord> + '_ {
        self.buckets.values().flatten()
    }

    pub fn position_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn record_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Append a record stamped with this store's tag.
    pub fn push(&mut self, position: PositionKey, mv: String, line_name: String, side: Side) {
        let record = MoveRecord {
            position: position.clone(),
            mv,
            line_name,
            intended_side: side,
            source: self.tag,
        };
        self.buckets.entry(position).or_default().push(record);
    }

    /// Drop every record of `line.name` (at any position), then insert the new path.
    pub fn replace_line(&mut self, line: &StagedLine) -> ReplaceOutcome {
        let removed = self.remove_lines(&LinePattern::Exact(line.name.clone()));
        for (key, mv) in &line.plies {
            self.push(key.clone(), mv.clone(), line.name.clone(), line.intended_side);
        }
        ReplaceOutcome {
            removed,
            inserted: line.plies.len(),
        }
    }

    /// Remove all records whose line name matches; returns how many were removed.
    pub fn remove_lines(&mut self, pattern: &LinePattern) -> usize {
        let mut removed = 0;
        self.buckets.retain(|_, bucket| {
            let before = bucket.len();
            bucket.retain(|r| !pattern.matches(&r.line_name));
            removed += before - bucket.len();
            !bucket.is_empty()
        });
        removed
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
    }
}

/// Every store, one per tag.
pub type SourceSet = SourceMap<SourceStore>;

impl SourceSet {
    pub fn empty() -> Self {
        SourceMap::from_fn(SourceStore::new)
    }
}
