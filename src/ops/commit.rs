use tracing::info;

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::index::StagingIndex;
use crate::object::{create_commit, write_snapshot};
use crate::refs::{advance_branch, current_branch, read_branch};
use crate::repo::Repo;
use crate::types::now;

/// commit the staging index to the current branch
pub fn commit(repo: &Repo, message: &str) -> Result<Hash> {
    commit_with_timestamp(repo, message, now())
}

/// commit the staging index to the current branch with an explicit timestamp
///
/// fails with `EmptyIndex` when nothing is staged; refs are left untouched
/// on any failure. the index is cleared afterwards only if the repository is
/// configured to do so.
pub fn commit_with_timestamp(repo: &Repo, message: &str, timestamp: i64) -> Result<Hash> {
    let _lock = repo.lock()?;

    let mut index = StagingIndex::load(repo)?;
    if index.is_empty() {
        return Err(Error::EmptyIndex);
    }

    let branch = current_branch(repo)?;
    let parent = read_branch(repo, &branch)?;

    let snapshot_hash = write_snapshot(repo, &index.snapshot())?;
    let commit_hash = create_commit(repo, snapshot_hash, parent, message, timestamp)?;
    advance_branch(repo, &branch, commit_hash)?;

    let files = index.len();
    if repo.config().clear_index_after_commit {
        index.clear();
        index.save(repo)?;
    }

    info!(%branch, commit = %commit_hash, files, "committed");
    Ok(commit_hash)
}
