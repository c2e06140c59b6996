//! filesystem helpers

mod write;

pub use write::{atomic_write, fsync_dir};
