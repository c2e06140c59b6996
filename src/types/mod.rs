mod commit;
mod snapshot;

pub(crate) use commit::now;
pub use commit::Commit;
pub use snapshot::Snapshot;
