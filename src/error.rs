use std::path::PathBuf;

use crate::Hash;

/// error type for minigit operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("not a minigit repository: {0}")]
    NoRepo(PathBuf),

    #[error("repository already exists at {0}")]
    RepoExists(PathBuf),

    #[error("object not found: {0}")]
    ObjectNotFound(Hash),

    #[error("corrupt object: hash mismatch for {0}")]
    CorruptObject(Hash),

    #[error("corrupt commit {hash}: {reason}")]
    CorruptCommit { hash: Hash, reason: String },

    #[error("corrupt snapshot {hash}: {reason}")]
    CorruptSnapshot { hash: Hash, reason: String },

    #[error("corrupt index: {0}")]
    CorruptIndex(String),

    #[error("nothing to commit: staging index is empty")]
    EmptyIndex,

    #[error("branch already exists: {0}")]
    BranchExists(String),

    #[error("corrupt ref {branch}: {reason}")]
    CorruptRef { branch: String, reason: String },

    #[error("branch not found: {0}")]
    BranchNotFound(String),

    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("HEAD does not name an existing branch: {0}")]
    DetachedHead(String),

    #[error("cyclic history: commit {0} reached twice")]
    CyclicHistory(Hash),

    #[error("commit {commit} does not extend branch {branch} (expected parent {expected}, found {found})")]
    NotFastForward {
        branch: String,
        commit: Hash,
        expected: String,
        found: String,
    },

    #[error("lock contention on repository")]
    LockContention,

    #[error("path is outside the work tree: {0}")]
    PathOutsideRepo(PathBuf),

    #[error("path is not valid UTF-8: {0:?}")]
    NonUtf8Path(PathBuf),

    #[error("path is ignored: {0}")]
    IgnoredPath(String),

    #[error("invalid ignore pattern {pattern:?}: {message}")]
    InvalidIgnorePattern { pattern: String, message: String },

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cbor serialization error: {0}")]
    CborEncode(#[from] ciborium::ser::Error<std::io::Error>),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("config serialization error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("invalid hash hex: {0}")]
    InvalidHashHex(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// helper to wrap io errors with path context
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.into(),
            source,
        })
    }
}

/// map a read error, turning NotFound into the given error
pub(crate) fn not_found_or_io(
    err: std::io::Error,
    path: impl Into<PathBuf>,
    not_found: impl FnOnce() -> Error,
) -> Error {
    if err.kind() == std::io::ErrorKind::NotFound {
        not_found()
    } else {
        Error::Io {
            path: path.into(),
            source: err,
        }
    }
}
