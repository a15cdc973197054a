//! [`TrapLibrary`]: the stores, the published index and every read / write operation.
//!
//! Concurrency model:
//! - each source has its own writer lock, so two writes to one source never interleave;
//! - stores and the index are immutable values behind [`ArcSwap`]; a write builds a new store,
//!   persists it, swaps it in and then republishes a freshly rebuilt index;
//! - readers only `load` and never block, seeing either the previous or the next index.

use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tracing::info;

use crate::catalog::{list_lines, LineSummary};
use crate::config::LibraryConfig;
use crate::core::{KeyError, PositionKey, SourceMap, SourceTag};
use crate::explorer::{ExplorerSession, LineReplay, MoveLookup};
use crate::import::{stage_batch, ImportError, ImportReport, ImportRequest};
use crate::index::{LineDetails, PositionIndex};
use crate::persist::{JsonStoreDir, PersistError};
use crate::record::MoveRecord;
use crate::rules::{RulesEngine, StandardChess};
use crate::store::{LinePattern, SourceSet, SourceStore};

#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

pub struct TrapLibrary<R = StandardChess> {
    rules: R,
    stores: SourceMap<ArcSwap<SourceStore>>,
    writers: SourceMap<Mutex<()>>,
    index: ArcSwap<PositionIndex>,
    publish: Mutex<()>,
    persist: Option<JsonStoreDir>,
}

impl TrapLibrary<StandardChess> {
    /// Standard chess rules; stores loaded from `config.data_dir` when set.
    pub fn open(config: &LibraryConfig) -> Result<Self, LibraryError> {
        Self::with_rules(StandardChess, config)
    }

    /// Standard chess rules, empty in-memory stores.
    pub fn in_memory() -> Self {
        Self::from_stores(StandardChess, SourceSet::empty(), None)
    }
}

impl<R: RulesEngine> TrapLibrary<R> {
    pub fn with_rules(rules: R, config: &LibraryConfig) -> Result<Self, LibraryError> {
        let persist = config
            .data_dir
            .as_ref()
            .map(|dir| JsonStoreDir::new(dir).with_pretty(config.pretty_json));
        let stores = match &persist {
            Some(dir) => dir.load_all()?,
            None => SourceSet::empty(),
        };
        Ok(Self::from_stores(rules, stores, persist))
    }

    fn from_stores(rules: R, stores: SourceSet, persist: Option<JsonStoreDir>) -> Self {
        let index = PositionIndex::rebuild(stores.iter().map(|(_, s)| s));
        Self {
            rules,
            stores: stores.map(|_, s| ArcSwap::from_pointee(s.clone())),
            writers: SourceMap::from_fn(|_| Mutex::new(())),
            index: ArcSwap::from_pointee(index),
            publish: Mutex::new(()),
            persist,
        }
    }

    /// The currently published index. Stays valid (and unchanged) after later writes.
    pub fn snapshot(&self) -> Arc<PositionIndex> {
        self.index.load_full()
    }

    pub fn store(&self, tag: SourceTag) -> Arc<SourceStore> {
        self.stores.get(tag).load_full()
    }

    // ---- reads ----

    pub fn query_moves(&self, key: &PositionKey) -> Vec<MoveRecord> {
        PositionIndex::moves_at(&self.index.load(), key).to_vec()
    }

    /// [`Self::query_moves`] for a FEN produced elsewhere (move counters are ignored).
    pub fn query_fen(&self, fen: &str) -> Result<Vec<MoveRecord>, KeyError> {
        Ok(self.query_moves(&PositionKey::from_fen(fen)?))
    }

    pub fn list_lines(&self) -> Vec<LineSummary> {
        list_lines(&self.index.load())
    }

    pub fn line_details(&self, line_name: &str) -> LineDetails {
        self.index.load().line_details(line_name)
    }

    // ---- writes ----

    /// Import a batch of games as one line (or numbered sibling lines).
    ///
    /// All-or-nothing: every segment is parsed and replayed before the store is touched. Each
    /// effective line name replaces its previous records at every position; other lines are
    /// left alone.
    pub fn import_batch(&self, req: ImportRequest<'_>) -> Result<ImportReport, LibraryError> {
        let tag: SourceTag = req
            .source
            .parse()
            .map_err(|_| ImportError::UnknownSource(req.source.to_string()))?;
        let lines = stage_batch(&self.rules, req.line_name, req.intended_side, req.pgn)?;

        let replaced = self.write(tag, |store| {
            lines
                .iter()
                .map(|line| store.replace_line(line).removed)
                .sum::<usize>()
        })?;

        let report = ImportReport::new(req.line_name.trim(), &lines, replaced);
        info!(
            source = %tag,
            lines = ?report.line_names,
            records = report.records_written,
            replaced,
            "batch imported"
        );
        Ok(report)
    }

    /// Delete every record of `source` whose line name matches `pattern`.
    pub fn delete_lines(
        &self,
        source: SourceTag,
        pattern: &LinePattern,
    ) -> Result<usize, LibraryError> {
        let removed = self.write(source, |store| store.remove_lines(pattern))?;
        info!(source = %source, ?pattern, removed, "lines deleted");
        Ok(removed)
    }

    pub fn reset_source(&self, source: SourceTag) -> Result<(), LibraryError> {
        self.write(source, SourceStore::clear)?;
        info!(source = %source, "source reset");
        Ok(())
    }

    /// Empty every source as one write: all files are saved before any store is swapped, and
    /// the index is republished once.
    pub fn reset_all(&self) -> Result<(), LibraryError> {
        let _writers: Vec<_> = SourceTag::ALL
            .iter()
            .map(|&tag| self.writers.get(tag).lock())
            .collect();

        let cleared = SourceSet::empty();
        if let Some(dir) = &self.persist {
            for (_, store) in cleared.iter() {
                dir.save(store)?;
            }
        }
        for (tag, store) in cleared.iter() {
            self.stores.get(tag).store(Arc::new(store.clone()));
        }
        self.republish();
        info!("all sources reset");
        Ok(())
    }

    // ---- sessions ----

    /// An explorer over the live index of this library.
    pub fn explorer(&self) -> ExplorerSession<R, &Self>
    where
        R: Clone,
    {
        ExplorerSession::new(self.rules.clone(), self)
    }

    /// Replay of one line, preloaded from the current index. `None` if the line is unknown.
    pub fn line_session(&self, line_name: &str) -> Option<(LineSummary, LineReplay<R>)>
    where
        R: Clone,
    {
        let index = self.snapshot();
        let summary = list_lines(&index)
            .into_iter()
            .find(|l| l.name == line_name)?;
        let details = index.line_details(line_name);
        Some((summary, ExplorerSession::new(self.rules.clone(), details)))
    }

    /// Run one serialized write against a copy of `tag`'s store, persist it, swap it in and
    /// republish the index. Nothing changes if persisting fails.
    fn write<T>(
        &self,
        tag: SourceTag,
        edit: impl FnOnce(&mut SourceStore) -> T,
    ) -> Result<T, LibraryError> {
        let _writer = self.writers.get(tag).lock();

        let slot = self.stores.get(tag);
        let mut next = SourceStore::clone(&slot.load());
        let out = edit(&mut next);

        if let Some(dir) = &self.persist {
            dir.save(&next)?;
        }
        slot.store(Arc::new(next));
        self.republish();
        Ok(out)
    }

    fn republish(&self) {
        let _publish = self.publish.lock();
        let stores: Vec<Arc<SourceStore>> =
            SourceTag::ALL.iter().map(|&t| self.store(t)).collect();
        let index = PositionIndex::rebuild(stores.iter().map(|s| s.as_ref()));
        self.index.store(Arc::new(index));
    }
}

impl<R: RulesEngine> MoveLookup for TrapLibrary<R> {
    fn moves_at(&self, key: &PositionKey) -> Vec<MoveRecord> {
        self.query_moves(key)
    }
}
