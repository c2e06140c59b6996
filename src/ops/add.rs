use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::info;

use crate::error::{Error, IoResultExt, Result};
use crate::hash::Hash;
use crate::ignore::IgnoreRules;
use crate::index::StagingIndex;
use crate::object::write_object;
use crate::repo::{Repo, REPO_DIR};

/// stage a single file
///
/// `path` is absolute or relative to the work tree. the file's raw bytes are
/// stored as a blob and the index entry for its work-tree-relative path is
/// set to the blob hash.
pub fn add(repo: &Repo, path: &Path) -> Result<Hash> {
    let full = resolve(repo, path)?;
    let key = relative_key(repo.work_dir(), &full)?;

    let rules = IgnoreRules::load(&repo.work_dir().join(&repo.config().ignore_file))?;
    if rules.is_ignored(&key) {
        return Err(Error::IgnoredPath(key));
    }

    let content = fs::read(&full).with_path(&full)?;

    let _lock = repo.lock()?;
    let hash = write_object(repo, &content)?;
    let mut index = StagingIndex::load(repo)?;
    if index.get(&key) == Some(&hash) {
        info!(path = %key, %hash, "already staged");
        return Ok(hash);
    }
    index.set(repo, key.clone(), hash)?;
    index.save(repo)?;

    info!(path = %key, %hash, "staged");
    Ok(hash)
}

/// absolute path of `path` with its directory part canonicalized
///
/// the final component is kept as given so a symlinked file is staged under
/// its own name.
fn resolve(repo: &Repo, path: &Path) -> Result<PathBuf> {
    let full = repo.work_dir().join(path);

    match (full.parent(), full.file_name()) {
        (Some(parent), Some(name)) => {
            let parent = fs::canonicalize(parent).with_path(parent)?;
            Ok(parent.join(name))
        }
        _ => Ok(full),
    }
}

/// index key for `full`: its path below `work_dir`, `/`-separated
///
/// rejects paths that leave the work tree or point into the repository
/// directory, and names that are not valid UTF-8.
pub fn relative_key(work_dir: &Path, full: &Path) -> Result<String> {
    let outside = || Error::PathOutsideRepo(full.to_path_buf());
    let rel = full.strip_prefix(work_dir).map_err(|_| outside())?;

    let mut parts: Vec<String> = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(part) => {
                let part = part
                    .to_str()
                    .ok_or_else(|| Error::NonUtf8Path(full.to_path_buf()))?;
                parts.push(part.to_string());
            }
            Component::CurDir => {}
            Component::ParentDir => {
                parts.pop().ok_or_else(outside)?;
            }
            Component::RootDir | Component::Prefix(_) => return Err(outside()),
        }
    }

    match parts.first() {
        None => Err(outside()),
        Some(first) if first == REPO_DIR => Err(outside()),
        Some(_) => Ok(parts.join("/")),
    }
}
