//! high-level operations on minigit repositories

mod add;
mod branch;
mod commit;
mod fsck;
mod log;

pub use add::{add, relative_key};
pub use branch::{branch, list_branches, BranchInfo};
pub use commit::{commit, commit_with_timestamp};
pub use fsck::{fsck, FsckReport, Problem};
pub use log::{log, walk_history, CommitSource, History, LogEntry};
