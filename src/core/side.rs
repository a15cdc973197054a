use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The side a line is meant to be studied from (and the board orientation when replaying it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown side {0:?} (expected 'white' or 'black')")]
pub struct ParseSideError(pub String);

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::White => "white",
            Side::Black => "black",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = ParseSideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "white" => Ok(Side::White),
            "black" => Ok(Side::Black),
            other => Err(ParseSideError(other.to_string())),
        }
    }
}
