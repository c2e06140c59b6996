use tracing::info;

use crate::error::Result;
use crate::hash::Hash;
use crate::refs::{create_branch, current_branch, current_commit, read_branch};
use crate::repo::Repo;

/// a branch and where it points
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchInfo {
    pub name: String,
    pub commit: Option<Hash>,
    pub is_current: bool,
}

/// create a branch at the current commit
///
/// returns the commit the new branch points at (None if the current branch
/// has no commits yet). HEAD is not moved.
pub fn branch(repo: &Repo, name: &str) -> Result<Option<Hash>> {
    let _lock = repo.lock()?;

    let from = current_commit(repo)?;
    create_branch(repo, name, from)?;

    info!(branch = name, from = ?from, "branch created");
    Ok(from)
}

/// all branches with their targets, sorted by name
pub fn list_branches(repo: &Repo) -> Result<Vec<BranchInfo>> {
    let current = current_branch(repo)?;

    crate::refs::list_branches(repo)?
        .into_iter()
        .map(|name| {
            let commit = read_branch(repo, &name)?;
            let is_current = name == current;
            Ok(BranchInfo {
                name,
                commit,
                is_current,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::ops::{add, commit};
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn test_repo() -> (tempfile::TempDir, Repo) {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();
        (dir, repo)
    }

    #[test]
    fn test_branch_before_first_commit() {
        let (_dir, repo) = test_repo();

        assert_eq!(branch(&repo, "early").unwrap(), None);
        assert_eq!(read_branch(&repo, "early").unwrap(), None);
    }

    #[test]
    fn test_branch_points_at_current_commit() {
        let (dir, repo) = test_repo();
        fs::write(dir.path().join("a.txt"), "hello").unwrap();
        add(&repo, Path::new("a.txt")).unwrap();
        let c1 = commit(&repo, "first").unwrap();

        assert_eq!(branch(&repo, "feature").unwrap(), Some(c1));
        assert_eq!(read_branch(&repo, "feature").unwrap(), Some(c1));
        assert_eq!(current_branch(&repo).unwrap(), "main");
    }

    #[test]
    fn test_branch_duplicate() {
        let (_dir, repo) = test_repo();

        branch(&repo, "feature").unwrap();
        assert!(matches!(branch(&repo, "feature"), Err(Error::BranchExists(_))));
    }

    #[test]
    fn test_branch_invalid_name() {
        let (_dir, repo) = test_repo();

        assert!(matches!(branch(&repo, "../escape"), Err(Error::InvalidBranchName(_))));
    }

    #[test]
    fn test_list_branches_marks_current() {
        let (dir, repo) = test_repo();
        fs::write(dir.path().join("a.txt"), "hello").unwrap();
        add(&repo, Path::new("a.txt")).unwrap();
        let c1 = commit(&repo, "first").unwrap();
        branch(&repo, "zeta").unwrap();
        branch(&repo, "alpha").unwrap();

        let branches = list_branches(&repo).unwrap();

        let names: Vec<_> = branches.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "main", "zeta"]);
        assert!(branches.iter().all(|b| b.commit == Some(c1)));
        assert_eq!(
            branches.iter().filter(|b| b.is_current).map(|b| b.name.as_str()).collect::<Vec<_>>(),
            vec!["main"]
        );
    }

    #[test]
    fn test_init_add_commit_log_branch() {
        let (dir, repo) = test_repo();

        fs::write(dir.path().join("a.txt"), "hello").unwrap();
        add(&repo, Path::new("a.txt")).unwrap();
        let c1 = commit(&repo, "first").unwrap();
        assert_eq!(crate::object::read_commit(&repo, &c1).unwrap().parent, None);

        fs::write(dir.path().join("b.txt"), "world").unwrap();
        add(&repo, Path::new("b.txt")).unwrap();
        let c2 = commit(&repo, "second").unwrap();
        assert_eq!(crate::object::read_commit(&repo, &c2).unwrap().parent, Some(c1));

        let hashes: Vec<_> = crate::ops::log(&repo, None)
            .unwrap()
            .into_iter()
            .map(|e| e.hash)
            .collect();
        assert_eq!(hashes, vec![c2, c1]);

        assert_eq!(branch(&repo, "feature").unwrap(), Some(c2));
        assert_eq!(read_branch(&repo, "feature").unwrap(), Some(c2));

        // later commits on main leave the new branch where it was
        fs::write(dir.path().join("c.txt"), "again").unwrap();
        add(&repo, Path::new("c.txt")).unwrap();
        let c3 = commit(&repo, "third").unwrap();

        assert_eq!(current_commit(&repo).unwrap(), Some(c3));
        assert_eq!(read_branch(&repo, "feature").unwrap(), Some(c2));
    }
}
