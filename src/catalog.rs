//! Distinct named lines, for selection lists.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::core::{Side, SourceTag};
use crate::index::PositionIndex;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSummary {
    pub name: String,
    pub intended_side: Side,
    pub source: SourceTag,
}

/// One entry per distinct line name in `index`.
///
/// The first record seen in source order ([`SourceTag::ALL`]), then key order, decides the
/// entry's side and source. Entries are sorted by name, byte-wise and case-sensitive; the
/// sort is stable.
pub fn list_lines(index: &PositionIndex) -> Vec<LineSummary> {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mut out = Vec::new();
    let in_source_order = SourceTag::ALL
        .into_iter()
        .flat_map(|tag| index.records_from(tag));
    for record in in_source_order {
        if seen.insert(record.line_name.as_str()) {
            out.push(LineSummary {
                name: record.line_name.clone(),
                intended_side: record.intended_side,
                source: record.source,
            });
        }
    }
    out.sort_by(|a, b| a.name.cmp(&b.name));
    out
}
