use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::{Error, IoResultExt, Result};
use crate::hash::{compute_hash, Hash};
use crate::index::StagingIndex;
use crate::object::{list_objects, object_exists, object_path, read_snapshot};
use crate::ops::walk_history;
use crate::refs::{current_branch, list_branches, read_branch};
use crate::repo::Repo;

/// fsck report
#[derive(Debug, Default)]
pub struct FsckReport {
    /// objects checked
    pub objects_checked: usize,
    /// commits reached from branches
    pub commits_checked: usize,
    /// integrity problems found
    pub problems: Vec<Problem>,
    /// objects not reachable from any branch or the index
    pub dangling_objects: Vec<Hash>,
    /// files left in `<repo>/tmp` by interrupted writes
    pub stale_temp_files: Vec<PathBuf>,
}

impl FsckReport {
    pub fn is_ok(&self) -> bool {
        self.problems.is_empty()
    }
}

/// a single integrity problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Problem {
    /// stored bytes no longer hash to the file name
    HashMismatch { hash: Hash, actual: Hash },
    /// an object referenced from `referenced_by` is missing
    Missing { hash: Hash, referenced_by: String },
    /// an object exists but does not decode as the expected kind
    Malformed { hash: Hash, message: String },
    /// a branch's parent chain revisits a commit
    Cycle { branch: String, hash: Hash },
    /// HEAD does not name an existing branch
    BadHead(String),
    /// a branch ref cannot be read
    BadRef { branch: String, message: String },
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Problem::HashMismatch { hash, actual } => {
                write!(f, "corrupt object {}: content hashes to {}", hash, actual)
            }
            Problem::Missing {
                hash,
                referenced_by,
            } => write!(f, "missing object {} (referenced by {})", hash, referenced_by),
            Problem::Malformed { hash, message } => {
                write!(f, "malformed object {}: {}", hash, message)
            }
            Problem::Cycle { branch, hash } => {
                write!(f, "branch {} has cyclic history at {}", branch, hash)
            }
            Problem::BadHead(message) => write!(f, "bad HEAD: {}", message),
            Problem::BadRef { branch, message } => write!(f, "bad ref {}: {}", branch, message),
        }
    }
}

/// verify repository integrity
///
/// re-hashes every stored object, walks every branch to its root and checks
/// that each commit's snapshot and every staged index entry resolve.
pub fn fsck(repo: &Repo) -> Result<FsckReport> {
    let mut report = FsckReport::default();
    let mut reachable = HashSet::new();
    let mut visited_commits = HashSet::new();

    if let Err(e) = current_branch(repo) {
        report.problems.push(Problem::BadHead(e.to_string()));
    }

    for branch in list_branches(repo)? {
        let tip = match read_branch(repo, &branch) {
            Ok(tip) => tip,
            Err(e) => {
                report.problems.push(Problem::BadRef {
                    branch,
                    message: e.to_string(),
                });
                continue;
            }
        };

        let mut referenced_by = format!("branch {}", branch);
        for entry in walk_history(repo, tip) {
            match entry {
                Ok(entry) => {
                    reachable.insert(entry.hash);
                    if !visited_commits.insert(entry.hash) {
                        // shared history already checked via another branch
                        break;
                    }
                    report.commits_checked += 1;
                    check_snapshot(
                        repo,
                        &entry.commit.snapshot,
                        &entry.hash,
                        &mut reachable,
                        &mut report,
                    );
                    referenced_by = format!("commit {}", entry.hash);
                }
                Err(e) => {
                    record_walk_error(e, &branch, &referenced_by, &mut report)?;
                    break;
                }
            }
        }
    }

    for (path, hash) in StagingIndex::load(repo)?.iter() {
        reachable.insert(*hash);
        if !object_exists(repo, hash) {
            report.problems.push(Problem::Missing {
                hash: *hash,
                referenced_by: format!("index entry {}", path),
            });
        }
    }

    for hash in list_objects(repo)? {
        report.objects_checked += 1;

        let path = object_path(repo, &hash);
        let bytes = std::fs::read(&path).with_path(&path)?;
        let actual = compute_hash(&bytes);
        if actual != hash {
            report.problems.push(Problem::HashMismatch { hash, actual });
        }

        if !reachable.contains(&hash) {
            report.dangling_objects.push(hash);
        }
    }

    report.stale_temp_files = stale_temp_files(repo)?;

    if report.is_ok() {
        debug!(objects = report.objects_checked, "fsck clean");
    } else {
        warn!(problems = report.problems.len(), "fsck found problems");
    }
    Ok(report)
}

/// leftovers of atomic writes that never reached their rename
///
/// writers hold the repository lock for the whole write, so while the lock
/// can be taken every file in tmp is stale. if another writer holds it no
/// files are reported.
fn stale_temp_files(repo: &Repo) -> Result<Vec<PathBuf>> {
    let Some(_lock) = repo.try_lock()? else {
        return Ok(Vec::new());
    };

    let tmp = repo.tmp_path();
    let entries = match std::fs::read_dir(&tmp) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::Io { path: tmp, source: e }),
    };

    let mut stale = Vec::new();
    for entry in entries {
        stale.push(entry.with_path(&tmp)?.path());
    }
    stale.sort();

    if !stale.is_empty() {
        warn!(count = stale.len(), "stale temp files");
    }
    Ok(stale)
}

fn check_snapshot(
    repo: &Repo,
    snapshot: &Hash,
    commit: &Hash,
    reachable: &mut HashSet<Hash>,
    report: &mut FsckReport,
) {
    reachable.insert(*snapshot);

    match read_snapshot(repo, snapshot) {
        Ok(snap) => {
            for (path, blob) in &snap.entries {
                reachable.insert(*blob);
                if !object_exists(repo, blob) {
                    report.problems.push(Problem::Missing {
                        hash: *blob,
                        referenced_by: format!("snapshot {} entry {}", snapshot, path),
                    });
                }
            }
        }
        Err(Error::ObjectNotFound(_)) => report.problems.push(Problem::Missing {
            hash: *snapshot,
            referenced_by: format!("commit {}", commit),
        }),
        // hash mismatches are reported by the object scan
        Err(Error::CorruptObject(_)) => {}
        Err(e) => report.problems.push(Problem::Malformed {
            hash: *snapshot,
            message: e.to_string(),
        }),
    }
}

fn record_walk_error(
    err: Error,
    branch: &str,
    referenced_by: &str,
    report: &mut FsckReport,
) -> Result<()> {
    match err {
        Error::ObjectNotFound(hash) => report.problems.push(Problem::Missing {
            hash,
            referenced_by: referenced_by.to_string(),
        }),
        Error::CorruptObject(_) => {}
        Error::CorruptCommit { hash, reason } => report.problems.push(Problem::Malformed {
            hash,
            message: reason,
        }),
        Error::CyclicHistory(hash) => report.problems.push(Problem::Cycle {
            branch: branch.to_string(),
            hash,
        }),
        other => return Err(other),
    }
    Ok(())
}
