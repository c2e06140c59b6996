//! branch refs and HEAD
//!
//! a branch is a file `refs/heads/<name>` holding a commit hash, or nothing
//! when the branch has no commits yet. HEAD is a file holding
//! `refs/heads/<name>` for the current branch.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{not_found_or_io, Error, IoResultExt, Result};
use crate::fs::atomic_write;
use crate::hash::Hash;
use crate::object::read_commit;
use crate::repo::Repo;

/// prefix HEAD uses to name a branch
pub const HEADS_PREFIX: &str = "refs/heads/";

/// name of the branch HEAD points at
///
/// fails with `DetachedHead` if HEAD is malformed or names a branch that has
/// no ref file.
pub fn current_branch(repo: &Repo) -> Result<String> {
    let head_path = repo.head_path();
    let content = fs::read_to_string(&head_path).with_path(&head_path)?;
    let target = content.trim();

    let name = target
        .strip_prefix(HEADS_PREFIX)
        .filter(|name| validate_branch_name(name).is_ok())
        .ok_or_else(|| Error::DetachedHead(target.to_string()))?;

    if !branch_exists(repo, name) {
        return Err(Error::DetachedHead(target.to_string()));
    }

    Ok(name.to_string())
}

/// commit the current branch points at, None before the first commit
pub fn current_commit(repo: &Repo) -> Result<Option<Hash>> {
    let branch = current_branch(repo)?;
    read_branch(repo, &branch)
}

/// point HEAD at a branch
pub fn set_head(repo: &Repo, branch: &str) -> Result<()> {
    validate_branch_name(branch)?;
    let content = format!("{}{}\n", HEADS_PREFIX, branch);
    atomic_write(&repo.tmp_path(), &repo.head_path(), content.as_bytes())
}

/// read a branch ref
///
/// returns None for a branch that exists but has no commits.
pub fn read_branch(repo: &Repo, name: &str) -> Result<Option<Hash>> {
    validate_branch_name(name)?;
    let path = branch_path(repo, name);

    if path.is_dir() {
        return Err(Error::BranchNotFound(name.to_string()));
    }
    let content = fs::read_to_string(&path)
        .map_err(|e| not_found_or_io(e, &path, || Error::BranchNotFound(name.to_string())))?;

    let hex = content.trim();
    if hex.is_empty() {
        return Ok(None);
    }
    Hash::from_hex(hex).map(Some).map_err(|_| Error::CorruptRef {
        branch: name.to_string(),
        reason: format!("not a commit hash: {:?}", hex),
    })
}

/// create a new branch pointing at `from` (None for an empty branch)
pub fn create_branch(repo: &Repo, name: &str, from: Option<Hash>) -> Result<()> {
    validate_branch_name(name)?;

    let path = branch_path(repo, name);
    if path.is_file() {
        return Err(Error::BranchExists(name.to_string()));
    }
    check_hierarchy(repo, name)?;

    if let Some(hash) = from {
        read_commit(repo, &hash)?;
    }

    write_branch(repo, name, from)?;
    info!(branch = name, commit = ?from, "created branch");
    Ok(())
}

/// move a branch forward to `commit`
///
/// `commit` must be a stored commit whose parent is the branch's current
/// value; anything else would drop history and is rejected.
pub fn advance_branch(repo: &Repo, name: &str, commit: Hash) -> Result<()> {
    let current = read_branch(repo, name)?;
    let new_commit = read_commit(repo, &commit)?;

    if new_commit.parent != current {
        return Err(Error::NotFastForward {
            branch: name.to_string(),
            commit,
            expected: describe(current),
            found: describe(new_commit.parent),
        });
    }

    write_branch(repo, name, Some(commit))?;
    debug!(branch = name, %commit, "advanced branch");
    Ok(())
}

/// check if a branch exists
pub fn branch_exists(repo: &Repo, name: &str) -> bool {
    validate_branch_name(name).is_ok() && branch_path(repo, name).is_file()
}

/// list all branches, sorted by name
pub fn list_branches(repo: &Repo) -> Result<Vec<String>> {
    let refs_dir = repo.refs_path();
    let mut branches = Vec::new();

    if refs_dir.exists() {
        collect_branches(&refs_dir, &refs_dir, &mut branches)?;
    }

    branches.sort();
    Ok(branches)
}

/// validate a branch name
///
/// names may be hierarchical (`feature/login`) but must stay inside
/// `refs/heads`.
pub fn validate_branch_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| Err(Error::InvalidBranchName(format!("{}: {}", reason, name)));

    if name.is_empty() {
        return invalid("empty branch name");
    }

    if name.starts_with('/') || name.ends_with('/') {
        return invalid("cannot start or end with '/'");
    }

    if name.contains("//") {
        return invalid("cannot contain '//'");
    }

    if name.contains('\0') || name.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return invalid("cannot contain whitespace or control characters");
    }

    if name.ends_with(".lock") {
        return invalid("cannot end with '.lock'");
    }

    // check for path traversal
    for component in name.split('/') {
        if component == "." || component == ".." {
            return invalid("cannot contain '.' or '..' components");
        }
    }

    Ok(())
}

/// get filesystem path for a branch
fn branch_path(repo: &Repo, name: &str) -> PathBuf {
    repo.refs_path().join(name)
}

/// write a branch ref (create or overwrite)
fn write_branch(repo: &Repo, name: &str, hash: Option<Hash>) -> Result<()> {
    let path = branch_path(repo, name);

    // ensure parent directories exist for hierarchical names
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_path(parent)?;
    }

    let content = match hash {
        Some(hash) => format!("{}\n", hash.to_hex()),
        None => String::new(),
    };
    atomic_write(&repo.tmp_path(), &path, content.as_bytes())
}

/// a ref file cannot also be a directory of refs
///
/// rejects `a/b` when branch `a` exists and `a` when `a/...` branches exist.
fn check_hierarchy(repo: &Repo, name: &str) -> Result<()> {
    if branch_path(repo, name).is_dir() {
        return Err(Error::InvalidBranchName(format!(
            "{}: branches exist below it",
            name
        )));
    }

    for (i, _) in name.match_indices('/') {
        let prefix = &name[..i];
        if branch_path(repo, prefix).is_file() {
            return Err(Error::InvalidBranchName(format!(
                "{}: conflicts with existing branch {}",
                name, prefix
            )));
        }
    }

    Ok(())
}

fn describe(hash: Option<Hash>) -> String {
    hash.map_or_else(|| "none".to_string(), |h| h.to_hex())
}

/// recursively collect branch names from directory
fn collect_branches(base: &Path, dir: &Path, branches: &mut Vec<String>) -> Result<()> {
    for entry in fs::read_dir(dir).with_path(dir)? {
        let entry = entry.with_path(dir)?;
        let path = entry.path();

        if path.is_dir() {
            collect_branches(base, &path, branches)?;
        } else if path.is_file() {
            // compute branch name relative to base
            if let Ok(rel) = path.strip_prefix(base) {
                let name = rel.to_string_lossy().to_string();
                branches.push(name);
            }
        }
    }
    Ok(())
}
