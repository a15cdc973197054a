use std::path::PathBuf;

/// Library configuration (pure Rust; the CLI fills it from flags / environment).
#[derive(Debug, Clone)]
pub struct LibraryConfig {
    /// Directory with one JSON file per source. `None` keeps every store in memory only.
    pub data_dir: Option<PathBuf>,

    /// Pretty-print store files (larger, but diff-friendly).
    pub pretty_json: bool,
}

impl LibraryConfig {
    pub fn new() -> Self {
        Self {
            data_dir: None,
            pretty_json: true,
        }
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    pub fn with_pretty_json(mut self, pretty: bool) -> Self {
        self.pretty_json = pretty;
        self
    }
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self::new()
    }
}
