use tracing::debug;

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::object::store::{read_object, write_object};
use crate::repo::Repo;
use crate::types::Snapshot;

/// write a snapshot to the object store
pub fn write_snapshot(repo: &Repo, snapshot: &Snapshot) -> Result<Hash> {
    let bytes = snapshot.encode()?;
    let hash = write_object(repo, &bytes)?;
    debug!(%hash, entries = snapshot.len(), "wrote snapshot");
    Ok(hash)
}

/// read a snapshot from the object store
pub fn read_snapshot(repo: &Repo, hash: &Hash) -> Result<Snapshot> {
    let bytes = read_object(repo, hash)?;
    ciborium::from_reader(&bytes[..]).map_err(|e| Error::CorruptSnapshot {
        hash: *hash,
        reason: e.to_string(),
    })
}
