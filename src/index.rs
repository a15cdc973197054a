//! The merged, read-only position index.
//!
//! [`PositionIndex::rebuild`] is a pure fold over every [`SourceStore`]: it never patches an
//! existing index. Callers publish the result by swapping an `Arc` (see
//! [`crate::library::TrapLibrary`]), so readers see either the old or the new value.

use std::collections::BTreeMap;

use tracing::debug;

use crate::core::{PositionKey, SourceTag};
use crate::record::MoveRecord;
use crate::store::SourceStore;

/// All records of one line name, grouped by position.
pub type LineDetails = BTreeMap<PositionKey, Vec<MoveRecord>>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionIndex {
    buckets: BTreeMap<PositionKey, Vec<MoveRecord>>,
    records: usize,
}

impl PositionIndex {
    /// Merge stores into a fresh index.
    ///
    /// Buckets list sources in iteration order of `stores`; within a source the store's own
    /// bucket order is kept, so "first known move" defaults are reproducible.
    pub fn rebuild<'a, I>(stores: I) -> Self
    where
        I: IntoIterator<Item = &'a SourceStore>,
    {
        let mut buckets: BTreeMap<PositionKey, Vec<MoveRecord>> = BTreeMap::new();
        let mut records = 0usize;
        for store in stores {
            for (key, bucket) in store.iter() {
                debug_assert!(bucket.iter().all(|r| r.source == store.tag()));
                records += bucket.len();
                buckets
                    .entry(key.clone())
                    .or_default()
                    .extend(bucket.iter().cloned());
            }
        }
        debug!(
            positions = buckets.len(),
            records, "position index rebuilt"
        );
        Self { buckets, records }
    }

    /// Every record known at `key`, in index order.
    pub fn moves_at(&self, key: &PositionKey) -> &[MoveRecord] {
        self.buckets.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every record of `line_name` across all sources, grouped by position.
    pub fn line_details(&self, line_name: &str) -> LineDetails {
        let mut out = LineDetails::new();
        for (key, bucket) in &self.buckets {
            let hits: Vec<MoveRecord> = bucket
                .iter()
                .filter(|r| r.line_name == line_name)
                .cloned()
                .collect();
            if !hits.is_empty() {
                out.insert(key.clone(), hits);
            }
        }
        out
    }

    /// Buckets in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&PositionKey, &[MoveRecord])> + '_ {
        self.buckets.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn records(&self) -> impl Iterator<Item = &MoveRecord> + '_ {
        self.buckets.values().flatten()
    }

    pub fn records_from(&self, source: SourceTag) -> impl Iterator<Item = &MoveRecord> + '_ {
        self.records().filter(move |r| r.source == source)
    }

    pub fn position_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn record_count(&self) -> usize {
        self.records
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
