//! minigit - minimal content-addressed version control
//!
//! tracks snapshots of files in a work tree, modelled on git's object model
//! but reduced to its core.
//!
//! # Core concepts
//!
//! - **Object**: immutable bytes stored under the SHA-1 of their content
//! - **Snapshot**: a sorted `path -> blob hash` mapping (CBOR)
//! - **Commit**: a snapshot plus parent, message and timestamp (CBOR)
//! - **Index**: the mutable staging area the next snapshot is frozen from
//! - **Branch**: a named, mutable pointer to a commit; HEAD names one branch
//!
//! # Hash format
//!
//! object hash = SHA1(stored bytes), rendered as 40 lowercase hex digits.
//! blobs are stored verbatim, so a blob's hash is the SHA-1 of the file.
//!
//! # Example usage
//!
//! ```no_run
//! use minigit::{ops, Repo};
//! use std::path::Path;
//!
//! let repo = Repo::init(Path::new("/path/to/work")).unwrap();
//!
//! ops::add(&repo, Path::new("a.txt")).unwrap();
//! let hash = ops::commit(&repo, "first").unwrap();
//!
//! for entry in ops::log(&repo, None).unwrap() {
//!     println!("{}", entry);
//! }
//! # let _ = hash;
//! ```

mod config;
mod error;
mod hash;
mod ignore;
mod index;
mod object;
mod refs;
mod repo;

pub mod fs;
pub mod ops;
pub mod types;

pub use config::Config;
pub use error::{Error, IoResultExt, Result};
pub use hash::{compute_hash, Hash};
pub use ignore::IgnoreRules;
pub use index::StagingIndex;
pub use object::{
    create_commit, list_objects, object_exists, object_path, read_commit, read_object,
    read_snapshot, write_commit, write_object, write_snapshot,
};
pub use refs::{
    advance_branch, branch_exists, create_branch, current_branch, current_commit, read_branch,
    set_head, validate_branch_name,
};
pub use repo::{Repo, RepoLock, REPO_DIR};
pub use types::{Commit, Snapshot};
