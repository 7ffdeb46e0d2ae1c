//! Memoization of prepared tables.
//!
//! Entries are keyed by source path and remember the content hash of the bytes
//! they were prepared from. A lookup whose hash still matches returns the
//! cached snapshot; a changed hash replaces the entry.

use {
    std::{collections::HashMap, fs, io::Cursor, path::{Path, PathBuf}, sync::Arc},
    tracing::{info, debug},
    crate::{
        error::{PrepareError, DataSourceError},
        hasher::bytes_hash,
        preparation::{ReviewDatasetPreparer, PreparedTable},
        sentiment::{SentimentScorer, LexiconScorer},
    },
};

struct CacheEntry {
    content_hash: u128,
    table: Arc<PreparedTable>,
}

pub struct PreparedCache<S = LexiconScorer> {
    preparer: ReviewDatasetPreparer<S>,
    entries: HashMap<PathBuf, CacheEntry>,
}

impl<S: SentimentScorer> PreparedCache<S> {
    pub fn new(preparer: ReviewDatasetPreparer<S>) -> Self {
        Self {
            preparer,
            entries: HashMap::new(),
        }
    }

    pub fn get_or_prepare(&mut self, path: &Path) -> Result<Arc<PreparedTable>, PrepareError> {
        let data = fs::read(path).map_err(|source| DataSourceError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        self.get_or_prepare_bytes(path, &data)
    }

    /// Same as [`get_or_prepare`](Self::get_or_prepare) for a source already in
    /// memory; `identity` names the source for keying.
    pub fn get_or_prepare_bytes(&mut self, identity: &Path, data: &[u8]) -> Result<Arc<PreparedTable>, PrepareError> {
        let content_hash = bytes_hash(data);

        if let Some(entry) = self.entries.get(identity) {
            if entry.content_hash == content_hash {
                debug!("using cached table for {}", identity.display());
                return Ok(entry.table.clone());
            }
            info!("source {} changed since it was prepared, preparing again", identity.display());
        }

        let table = Arc::new(self.preparer.prepare_reader(Cursor::new(data))?);
        self.entries.insert(identity.to_path_buf(), CacheEntry {
            content_hash,
            table: table.clone(),
        });

        Ok(table)
    }

    pub fn invalidate(&mut self, identity: &Path) -> bool {
        self.entries.remove(identity).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
