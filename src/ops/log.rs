use std::collections::HashSet;

use chrono::DateTime;

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::object::read_commit;
use crate::refs::current_commit;
use crate::repo::Repo;
use crate::types::Commit;

/// commit with its hash for log output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub hash: Hash,
    pub commit: Commit,
}

/// anything commits can be loaded from
pub trait CommitSource {
    fn load_commit(&self, hash: &Hash) -> Result<Commit>;
}

impl CommitSource for Repo {
    fn load_commit(&self, hash: &Hash) -> Result<Commit> {
        read_commit(self, hash)
    }
}

/// lazy walk from a commit to the root along parent links
///
/// yields newest first. the walk ends after the first commit without a
/// parent. a load failure or a revisited hash is yielded once as an error and
/// ends the walk.
pub struct History<'a, S: CommitSource + ?Sized> {
    source: &'a S,
    next: Option<Hash>,
    seen: HashSet<Hash>,
}

/// start a history walk at `start` (an empty walk for None)
pub fn walk_history<S: CommitSource + ?Sized>(source: &S, start: Option<Hash>) -> History<'_, S> {
    History {
        source,
        next: start,
        seen: HashSet::new(),
    }
}

impl<S: CommitSource + ?Sized> Iterator for History<'_, S> {
    type Item = Result<LogEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        let hash = self.next.take()?;

        if !self.seen.insert(hash) {
            return Some(Err(Error::CyclicHistory(hash)));
        }

        match self.source.load_commit(&hash) {
            Ok(commit) => {
                self.next = commit.parent;
                Some(Ok(LogEntry { hash, commit }))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

impl<S: CommitSource + ?Sized> std::iter::FusedIterator for History<'_, S> {}

/// commit history of the current branch, newest first
///
/// empty when the branch has no commits yet.
pub fn log(repo: &Repo, max_count: Option<usize>) -> Result<Vec<LogEntry>> {
    let head = current_commit(repo)?;
    walk_history(repo, head)
        .take(max_count.unwrap_or(usize::MAX))
        .collect()
}

/// format a log entry for display
impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "commit {}", self.hash)?;
        writeln!(f, "Date:   {}", format_timestamp(self.commit.timestamp))?;

        writeln!(f)?;
        for line in self.commit.message.lines() {
            writeln!(f, "    {}", line)?;
        }

        Ok(())
    }
}

/// ctime-style UTC rendering of a unix timestamp
fn format_timestamp(timestamp: i64) -> String {
    match DateTime::from_timestamp(timestamp, 0) {
        Some(dt) => dt.format("%a %b %e %H:%M:%S %Y +0000").to_string(),
        None => format!("@{}", timestamp),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{add, commit_with_timestamp};
    use std::collections::HashMap;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    impl CommitSource for HashMap<Hash, Commit> {
        fn load_commit(&self, hash: &Hash) -> Result<Commit> {
            self.get(hash).cloned().ok_or(Error::ObjectNotFound(*hash))
        }
    }

    fn test_repo() -> (tempfile::TempDir, Repo) {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();
        (dir, repo)
    }

    fn commit_file(dir: &Path, repo: &Repo, name: &str, content: &str, ts: i64) -> Hash {
        fs::write(dir.join(name), content).unwrap();
        add(repo, Path::new(name)).unwrap();
        commit_with_timestamp(repo, &format!("commit {}", name), ts).unwrap()
    }

    fn hash(n: u8) -> Hash {
        Hash::from_bytes([n; 20])
    }

    #[test]
    fn test_log_empty_branch() {
        let (_dir, repo) = test_repo();

        assert!(log(&repo, None).unwrap().is_empty());
    }

    #[test]
    fn test_log_single_commit() {
        let (dir, repo) = test_repo();
        let c1 = commit_file(dir.path(), &repo, "a.txt", "hello", 1);

        let entries = log(&repo, None).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].hash, c1);
        assert!(entries[0].commit.is_root());
    }

    #[test]
    fn test_log_newest_first() {
        let (dir, repo) = test_repo();
        let c1 = commit_file(dir.path(), &repo, "a.txt", "1", 1);
        let c2 = commit_file(dir.path(), &repo, "b.txt", "2", 2);
        let c3 = commit_file(dir.path(), &repo, "c.txt", "3", 3);

        let hashes: Vec<_> = log(&repo, None).unwrap().into_iter().map(|e| e.hash).collect();

        assert_eq!(hashes, vec![c3, c2, c1]);
    }

    #[test]
    fn test_log_follows_parents_not_timestamps() {
        let (dir, repo) = test_repo();
        // clock went backwards between commits
        let c1 = commit_file(dir.path(), &repo, "a.txt", "1", 500);
        let c2 = commit_file(dir.path(), &repo, "b.txt", "2", 100);

        let hashes: Vec<_> = log(&repo, None).unwrap().into_iter().map(|e| e.hash).collect();

        assert_eq!(hashes, vec![c2, c1]);
    }

    #[test]
    fn test_log_max_count() {
        let (dir, repo) = test_repo();
        for i in 0..5 {
            commit_file(dir.path(), &repo, "file.txt", &format!("v{}", i), i);
        }

        assert_eq!(log(&repo, Some(2)).unwrap().len(), 2);
        assert_eq!(log(&repo, None).unwrap().len(), 5);
    }

    #[test]
    fn test_walk_terminates_at_root() {
        let (dir, repo) = test_repo();
        let c1 = commit_file(dir.path(), &repo, "a.txt", "1", 1);
        let c2 = commit_file(dir.path(), &repo, "b.txt", "2", 2);

        let mut walk = walk_history(&repo, Some(c2));
        assert_eq!(walk.next().unwrap().unwrap().hash, c2);
        assert_eq!(walk.next().unwrap().unwrap().hash, c1);
        assert!(walk.next().is_none());
        assert!(walk.next().is_none());
    }

    #[test]
    fn test_walk_from_middle() {
        let (dir, repo) = test_repo();
        let c1 = commit_file(dir.path(), &repo, "a.txt", "1", 1);
        commit_file(dir.path(), &repo, "b.txt", "2", 2);

        let entries: Vec<_> = walk_history(&repo, Some(c1)).collect::<Result<_>>().unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_walk_detects_cycle() {
        let mut commits = HashMap::new();
        commits.insert(hash(1), Commit::with_timestamp(Hash::ZERO, Some(hash(2)), "a", 0));
        commits.insert(hash(2), Commit::with_timestamp(Hash::ZERO, Some(hash(3)), "b", 0));
        commits.insert(hash(3), Commit::with_timestamp(Hash::ZERO, Some(hash(1)), "c", 0));

        let results: Vec<_> = walk_history(&commits, Some(hash(1))).collect();

        assert_eq!(results.len(), 4);
        assert!(results[..3].iter().all(|r| r.is_ok()));
        assert!(matches!(results[3], Err(Error::CyclicHistory(h)) if h == hash(1)));
    }

    #[test]
    fn test_walk_self_parent() {
        let mut commits = HashMap::new();
        commits.insert(hash(7), Commit::with_timestamp(Hash::ZERO, Some(hash(7)), "loop", 0));

        let result: Result<Vec<_>> = walk_history(&commits, Some(hash(7))).collect();
        assert!(matches!(result, Err(Error::CyclicHistory(_))));
    }

    #[test]
    fn test_walk_missing_parent() {
        let mut commits = HashMap::new();
        commits.insert(hash(1), Commit::with_timestamp(Hash::ZERO, Some(hash(9)), "a", 0));

        let results: Vec<_> = walk_history(&commits, Some(hash(1))).collect();
        assert_eq!(results.len(), 2);
        assert!(matches!(results[1], Err(Error::ObjectNotFound(h)) if h == hash(9)));
    }

    #[test]
    fn test_log_entry_display() {
        let entry = LogEntry {
            hash: hash(0xab),
            commit: Commit::with_timestamp(Hash::ZERO, None, "subject\n\nbody", 0),
        };

        let display = entry.to_string();

        assert!(display.starts_with(&format!("commit {}\n", hash(0xab))));
        assert!(display.contains("Date:   Thu Jan  1 00:00:00 1970 +0000"));
        assert!(display.contains("    subject\n"));
        assert!(display.contains("    body\n"));
    }
}
