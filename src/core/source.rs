use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One independently editable collection of lines.
///
/// The set is closed: every tag has exactly one store, see [`SourceMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceTag {
    Traps,
    ProGames,
    MyGames,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown source {0:?}")]
pub struct ParseSourceError(pub String);

impl SourceTag {
    /// All tags, in index merge order.
    pub const ALL: [SourceTag; 3] = [SourceTag::Traps, SourceTag::ProGames, SourceTag::MyGames];

    /// Wire name (`traps`, `proGames`, `myGames`).
    pub fn as_str(self) -> &'static str {
        match self {
            SourceTag::Traps => "traps",
            SourceTag::ProGames => "proGames",
            SourceTag::MyGames => "myGames",
        }
    }

    /// Human-readable name for listings.
    pub fn label(self) -> &'static str {
        match self {
            SourceTag::Traps => "Traps/Gambits",
            SourceTag::ProGames => "Pro Games",
            SourceTag::MyGames => "My Games",
        }
    }

    /// File stem used by the JSON store directory.
    pub fn file_stem(self) -> &'static str {
        match self {
            SourceTag::Traps => "traps",
            SourceTag::ProGames => "pro-games",
            SourceTag::MyGames => "my-games",
        }
    }

    #[inline]
    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceTag {
    type Err = ParseSourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceTag::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| ParseSourceError(s.to_string()))
    }
}

/// A total mapping `SourceTag -> T`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMap<T> {
    slots: [T; 3],
}

impl<T> SourceMap<T> {
    pub fn from_fn(mut f: impl FnMut(SourceTag) -> T) -> Self {
        Self {
            slots: SourceTag::ALL.map(&mut f),
        }
    }

    #[inline]
    pub fn get(&self, tag: SourceTag) -> &T {
        &self.slots[tag.slot()]
    }

    #[inline]
    pub fn get_mut(&mut self, tag: SourceTag) -> &mut T {
        &mut self.slots[tag.slot()]
    }

    /// `(tag, value)` pairs in [`SourceTag::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (SourceTag, &T)> + '_ {
        SourceTag::ALL.into_iter().zip(self.slots.iter())
    }

    pub fn map<U>(&self, mut f: impl FnMut(SourceTag, &T) -> U) -> SourceMap<U> {
        SourceMap::from_fn(|tag| f(tag, self.get(tag)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_roundtrip_through_from_str() {
        for tag in SourceTag::ALL {
            assert_eq!(tag.as_str().parse::<SourceTag>(), Ok(tag));
        }
        assert_eq!(
            "games".parse::<SourceTag>(),
            Err(ParseSourceError("games".to_string()))
        );
    }

    #[test]
    fn serde_uses_camel_case() {
        let json = serde_json::to_string(&SourceTag::ProGames).unwrap();
        assert_eq!(json, "\"proGames\"");
    }

    #[test]
    fn source_map_slots_follow_tags() {
        let m = SourceMap::from_fn(|t| t.file_stem());
        assert_eq!(*m.get(SourceTag::MyGames), "my-games");
        let order: Vec<_> = m.iter().map(|(t, _)| t).collect();
        assert_eq!(order, SourceTag::ALL.to_vec());
    }
}
