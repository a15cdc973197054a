//! An opening-trap index: ingest curated move sequences from several sources, merge them into
//! one position-keyed index, and walk it move by move.
//!
//! Data flows one way: [`import`] stages lines, [`library`] writes them into a [`store`] and
//! republishes the merged [`index`], which [`catalog`] and [`explorer`] read.

pub mod catalog;
pub mod config;
pub mod core;
pub mod explorer;
pub mod import;
pub mod index;
pub mod library;
pub mod persist;
pub mod pgn;
pub mod record;
pub mod rules;
pub mod store;

pub use crate::core::{PositionKey, Side, SourceTag};
pub use crate::library::{LibraryError, TrapLibrary};
pub use crate::record::{LineId, MoveRecord};
