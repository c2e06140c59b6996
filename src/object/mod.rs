//! content-addressed object storage
//!
//! every object (blob, snapshot, commit) is a single file `objects/<hex>`
//! whose name is the SHA-1 of its exact bytes. objects are write-once.

pub mod commit;
pub mod snapshot;
pub mod store;

pub use commit::{create_commit, read_commit, write_commit};
pub use snapshot::{read_snapshot, write_snapshot};
pub use store::{list_objects, object_exists, object_path, read_object, write_object};
