//! the staging index: what goes into the next commit
//!
//! a flat `path -> blob hash` map persisted as an encoded [`Snapshot`] at
//! `<repo>/index`. every hash in the index must resolve in the object store.

use std::collections::BTreeMap;
use std::fs;

use tracing::debug;

use crate::error::{Error, Result};
use crate::fs::atomic_write;
use crate::hash::Hash;
use crate::object::object_exists;
use crate::repo::Repo;
use crate::types::Snapshot;

/// the mutable staging area
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StagingIndex {
    entries: BTreeMap<String, Hash>,
}

impl StagingIndex {
    /// load the index from disk
    ///
    /// a missing index file is treated as empty.
    pub fn load(repo: &Repo) -> Result<Self> {
        let path = repo.index_path();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io { path, source: e }),
        };

        let snapshot: Snapshot =
            ciborium::from_reader(&bytes[..]).map_err(|e| Error::CorruptIndex(e.to_string()))?;
        Ok(Self {
            entries: snapshot.entries,
        })
    }

    /// persist the index, replacing the previous file atomically
    pub fn save(&self, repo: &Repo) -> Result<()> {
        let bytes = self.snapshot().encode()?;
        atomic_write(&repo.tmp_path(), &repo.index_path(), &bytes)?;
        debug!(entries = self.entries.len(), "saved index");
        Ok(())
    }

    /// stage `hash` under `path`, replacing any previous entry
    ///
    /// the hash must already be stored.
    pub fn set(&mut self, repo: &Repo, path: impl Into<String>, hash: Hash) -> Result<()> {
        if !object_exists(repo, &hash) {
            return Err(Error::ObjectNotFound(hash));
        }
        self.entries.insert(path.into(), hash);
        Ok(())
    }

    /// look up a staged path
    pub fn get(&self, path: &str) -> Option<&Hash> {
        self.entries.get(path)
    }

    /// unstage a path, returning its previous hash
    pub fn remove(&mut self, path: &str) -> Option<Hash> {
        self.entries.remove(path)
    }

    /// remove all entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// number of staged paths
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// is nothing staged
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// iterate entries in path order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Hash)> {
        self.entries.iter()
    }

    /// freeze the current mapping
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.entries.clone())
    }
}
