use crate::{Error, Result};
use rocksdb::{IteratorMode, Options, WriteBatch, DB};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Local store of governance objects synced from the daemon and of the votes
/// this node has cast.
pub struct NetworkDatastore {
    db: DB,
    path: PathBuf,
    // keeps a scratch directory alive for as long as the in-memory store
    _scratch: Option<TempDir>,
}

impl std::fmt::Debug for NetworkDatastore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkDatastore").field("path", &self.path).finish()
    }
}

impl NetworkDatastore {
    pub fn new(path: &Path) -> Result<Self> {
        let db = DB::open_default(path)?;
        Ok(Self { db, path: path.to_path_buf(), _scratch: None })
    }

    pub fn create_in_directory(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::new(path)
    }

    // "in-memory" database
    pub fn create_in_memory() -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_allow_mmap_reads(false);
        opts.set_compression_type(rocksdb::DBCompressionType::None);
        let temp_dir = tempfile::tempdir()?;
        let temp_path = temp_dir.path().to_path_buf();
        let db = DB::open(&opts, &temp_path)?;
        Ok(Self { db, path: temp_path, _scratch: Some(temp_dir) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn get_data_by_key(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.db.get(key)?)
    }

    pub async fn get_string(&self, key: &str) -> Result<Option<String>> {
        match self.get_data_by_key(key).await? {
            Some(data) => Ok(Some(String::from_utf8(data)?)),
            None => Ok(None),
        }
    }

    pub async fn get_json<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Result<Option<T>> {
        match self.get_string(key).await? {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    pub async fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        self.db.put(key, value)?;
        Ok(())
    }

    /// Writes all entries atomically.
    pub async fn put_many(&self, entries: &[(String, Vec<u8>)]) -> Result<()> {
        let mut batch = WriteBatch::default();
        for (key, value) in entries {
            batch.put(key.as_bytes(), value);
        }
        self.db.write(batch)?;
        Ok(())
    }

    /// Iterates every key directly below `prefix/`.
    pub fn iterator(&self, prefix: &str) -> impl Iterator<Item = Result<(Box<[u8]>, Box<[u8]>)>> + '_ {
        let mut readopts = rocksdb::ReadOptions::default();
        readopts.set_iterate_lower_bound(format!("{}/", prefix).into_bytes());
        readopts.set_iterate_upper_bound(format!("{}0", prefix).into_bytes());
        let iter = self.db.iterator_opt(IteratorMode::Start, readopts);
        iter.map(|result| {
            result.map_err(|e| Error::Database(e.to_string()))
        })
    }

    pub async fn count_keys(&self, prefix: &str) -> Result<usize> {
        let mut count = 0;
        for result in self.iterator(prefix) {
            result?;
            count += 1;
        }
        Ok(count)
    }
}
