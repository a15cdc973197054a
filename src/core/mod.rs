//! Small value types shared by every layer:
//!
//! - [`key`]: canonical position keys (transposition-safe FEN prefix).
//! - [`side`]: the side a line is intended for.
//! - [`source`]: the closed set of source tags plus a total tag → value map.

pub mod key;
pub mod side;
pub mod source;

pub use key::{KeyError, PositionKey};
pub use side::{ParseSideError, Side};
pub use source::{ParseSourceError, SourceMap, SourceTag};
