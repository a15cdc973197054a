//! JSON file persistence for source stores: one file per [`SourceTag`].
//!
//! File layout: `{ "<fen or key>": [ { "move", "lineName", "intendedSide" }, ... ] }`.
//! The source is implied by the file. Keys are normalized on load, so files written with full
//! FENs (move counters included) still land in the right bucket.

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::{KeyError, PositionKey, Side, SourceTag};
use crate::store::{SourceSet, SourceStore};

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("io error at {stage} for {}: {source}", .path.display())]
    Io {
        stage: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid store file {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid position key in {}: {source}", .path.display())]
    Key {
        path: PathBuf,
        #[source]
        source: KeyError,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredEntry {
    #[serde(rename = "move")]
    mv: String,
    #[serde(alias = "trapName")]
    line_name: String,
    #[serde(alias = "trapFor")]
    intended_side: Side,
}

type StoredFile = BTreeMap<String, Vec<StoredEntry>>;

/// A directory holding one JSON file per source.
#[derive(Debug, Clone)]
pub struct JsonStoreDir {
    root: PathBuf,
    pretty: bool,
}

impl JsonStoreDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            pretty: true,
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn path_for(&self, tag: SourceTag) -> PathBuf {
        self.root.join(format!("{}.json", tag.file_stem()))
    }

    /// Load every store, creating the directory and missing files.
    pub fn load_all(&self) -> Result<SourceSet, PersistError> {
        fs::create_dir_all(&self.root).map_err(|source| PersistError::Io {
            stage: "store_dir_create",
            path: self.root.clone(),
            source,
        })?;
        let mut set = SourceSet::empty();
        for tag in SourceTag::ALL {
            *set.get_mut(tag) = self.load(tag)?;
        }
        Ok(set)
    }

    pub fn load(&self, tag: SourceTag) -> Result<SourceStore, PersistError> {
        let path = self.path_for(tag);
        if !path.exists() {
            warn!(source = %tag, path = %path.display(), "store file not found; creating an empty one");
            let store = SourceStore::new(tag);
            self.save(&store)?;
            return Ok(store);
        }

        let f = fs::File::open(&path).map_err(|source| PersistError::Io {
            stage: "store_open",
            path: path.clone(),
            source,
        })?;
        let file: StoredFile =
            serde_json::from_reader(BufReader::new(f)).map_err(|source| PersistError::Json {
                path: path.clone(),
                source,
            })?;

        let mut store = SourceStore::new(tag);
        for (raw_key, entries) in file {
            let key = PositionKey::from_fen(&raw_key).map_err(|source| PersistError::Key {
                path: path.clone(),
                source,
            })?;
            for e in entries {
                store.push(key.clone(), e.mv, e.line_name, e.intended_side);
            }
        }
        info!(
            source = %tag,
            positions = store.position_count(),
            records = store.record_count(),
            "store loaded"
        );
        Ok(store)
    }

    /// Write `store` to its file. The file is replaced atomically (write, then rename).
    pub fn save(&self, store: &SourceStore) -> Result<(), PersistError> {
        let path = self.path_for(store.tag());
        let tmp = path.with_extension("json.tmp");

        let file: StoredFile = store
            .iter()
            .map(|(key, bucket)| {
                let entries = bucket
                    .iter()
                    .map(|r| StoredEntry {
                        mv: r.mv.clone(),
                        line_name: r.line_name.clone(),
                        intended_side: r.intended_side,
                    })
                    .collect();
                (key.as_str().to_string(), entries)
            })
            .collect();

        let f = fs::File::create(&tmp).map_err(io_err("store_create", &tmp))?;
        let mut w = BufWriter::new(f);
        let written = if self.pretty {
            serde_json::to_writer_pretty(&mut w, &file)
        } else {
            serde_json::to_writer(&mut w, &file)
        };
        written.map_err(|source| PersistError::Json {
            path: tmp.clone(),
            source,
        })?;
        w.flush().map_err(io_err("store_flush", &tmp))?;
        drop(w);
        fs::rename(&tmp, &path).map_err(io_err("store_rename", &path))?;
        Ok(())
    }
}

fn io_err(stage: &'static str, path: &Path) -> impl FnOnce(std::io::Error) -> PersistError {
    let path = path.to_path_buf();
    move |source| PersistError::Io {
        stage,
        path,
        source,
    }
}
