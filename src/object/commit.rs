use tracing::debug;

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::object::snapshot::read_snapshot;
use crate::object::store::{read_object, write_object};
use crate::repo::Repo;
use crate::types::Commit;

/// build, validate and store a commit
///
/// the snapshot must resolve to a stored snapshot and the parent, if any,
/// must load as a commit. returns the new commit's hash, which is the hash of
/// its own encoded bytes.
pub fn create_commit(
    repo: &Repo,
    snapshot: Hash,
    parent: Option<Hash>,
    message: &str,
    timestamp: i64,
) -> Result<Hash> {
    read_snapshot(repo, &snapshot)?;
    if let Some(parent) = parent {
        read_commit(repo, &parent)?;
    }

    let commit = Commit::with_timestamp(snapshot, parent, message, timestamp);
    write_commit(repo, &commit)
}

/// write a commit to the object store without validating its references
pub fn write_commit(repo: &Repo, commit: &Commit) -> Result<Hash> {
    let bytes = commit.encode()?;
    let hash = write_object(repo, &bytes)?;
    debug!(%hash, parent = ?commit.parent, "wrote commit");
    Ok(hash)
}

/// read a commit from the object store
pub fn read_commit(repo: &Repo, hash: &Hash) -> Result<Commit> {
    let bytes = read_object(repo, hash)?;
    ciborium::from_reader(&bytes[..]).map_err(|e| Error::CorruptCommit {
        hash: *hash,
        reason: e.to_string(),
    })
}
