use std::fs::{self, File};
use std::path::{Path, PathBuf};

use nix::fcntl::{Flock, FlockArg};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{not_found_or_io, Error, IoResultExt, Result};
use crate::fs::atomic_write;

/// name of the repository directory inside the work tree
pub const REPO_DIR: &str = ".minigit";

/// a minigit repository: a work tree plus its `.minigit` directory
///
/// all persisted state (HEAD, index, refs, objects) lives on disk; this
/// handle only carries the paths and the loaded configuration.
#[derive(Debug)]
pub struct Repo {
    work_dir: PathBuf,
    path: PathBuf,
    config: Config,
}

impl Repo {
    /// initialize a new repository in `work_dir` with default configuration
    pub fn init(work_dir: &Path) -> Result<Self> {
        Self::init_with_config(work_dir, Config::default())
    }

    /// initialize a new repository in `work_dir`
    ///
    /// creates the object and ref directories, an empty index, an empty ref
    /// for the default branch and HEAD pointing at it. the work tree is
    /// created if missing and stored canonicalized.
    pub fn init_with_config(work_dir: &Path, config: Config) -> Result<Self> {
        crate::refs::validate_branch_name(&config.default_branch)?;

        fs::create_dir_all(work_dir).with_path(work_dir)?;
        let work_dir = fs::canonicalize(work_dir).with_path(work_dir)?;
        let path = work_dir.join(REPO_DIR);
        if path.exists() {
            return Err(Error::RepoExists(path));
        }

        // create directory structure
        fs::create_dir_all(path.join("objects")).with_path(&path)?;
        fs::create_dir_all(path.join("refs/heads")).with_path(&path)?;
        fs::create_dir_all(path.join("tmp")).with_path(&path)?;

        let repo = Self {
            work_dir,
            path,
            config,
        };

        atomic_write(
            &repo.tmp_path(),
            &repo.config_path(),
            repo.config.to_toml()?.as_bytes(),
        )?;
        crate::index::StagingIndex::default().save(&repo)?;
        crate::refs::create_branch(&repo, &repo.config.default_branch, None)?;
        crate::refs::set_head(&repo, &repo.config.default_branch)?;

        info!(path = %repo.path.display(), branch = %repo.config.default_branch, "initialized repository");
        Ok(repo)
    }

    /// open an existing repository rooted at `work_dir`
    pub fn open(work_dir: &Path) -> Result<Self> {
        let work_dir = fs::canonicalize(work_dir)
            .map_err(|e| not_found_or_io(e, work_dir, || Error::NoRepo(work_dir.to_path_buf())))?;
        let path = work_dir.join(REPO_DIR);
        if !path.join("HEAD").is_file() || !path.join("objects").is_dir() {
            return Err(Error::NoRepo(work_dir));
        }

        let config_path = path.join("config.toml");
        let config = if config_path.exists() {
            Config::load(&config_path)?
        } else {
            Config::default()
        };

        debug!(path = %path.display(), "opened repository");
        Ok(Self {
            work_dir,
            path,
            config,
        })
    }

    /// work tree root
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// repository (`.minigit`) path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// repository configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// path to config.toml
    pub fn config_path(&self) -> PathBuf {
        self.path.join("config.toml")
    }

    /// path to HEAD
    pub fn head_path(&self) -> PathBuf {
        self.path.join("HEAD")
    }

    /// path to the staging index
    pub fn index_path(&self) -> PathBuf {
        self.path.join("index")
    }

    /// path to objects directory
    pub fn objects_path(&self) -> PathBuf {
        self.path.join("objects")
    }

    /// path to branch refs directory
    pub fn refs_path(&self) -> PathBuf {
        self.path.join("refs/heads")
    }

    /// path to tmp directory (for atomic writes)
    pub fn tmp_path(&self) -> PathBuf {
        self.path.join("tmp")
    }

    /// path to lock file
    pub fn lock_path(&self) -> PathBuf {
        self.path.join(".lock")
    }

    /// acquire exclusive lock on repository
    /// returns a guard that releases the lock on drop
    pub fn lock(&self) -> Result<RepoLock> {
        self.try_lock()?.ok_or(Error::LockContention)
    }

    /// try to acquire exclusive lock, returning None if already locked
    pub fn try_lock(&self) -> Result<Option<RepoLock>> {
        let lock_path = self.lock_path();
        let file = File::create(&lock_path).with_path(&lock_path)?;

        match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
            Ok(flock) => Ok(Some(RepoLock { _flock: flock })),
            Err((_, nix::errno::Errno::EWOULDBLOCK)) => Ok(None),
            Err(_) => Err(Error::LockContention),
        }
    }
}

/// guard that holds repository lock until dropped
pub struct RepoLock {
    _flock: Flock<File>,
}
