use serde::{Deserialize, Serialize};

use crate::hash::Hash;

/// an immutable history node pointing to a snapshot and at most one parent
///
/// field order is fixed by the struct definition, so encoding the same values
/// always produces the same bytes and therefore the same commit hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// snapshot object hash
    pub snapshot: Hash,
    /// parent commit (None for the first commit on a branch)
    pub parent: Option<Hash>,
    /// commit message
    pub message: String,
    /// unix timestamp (seconds since epoch)
    pub timestamp: i64,
}

impl Commit {
    /// create a new commit stamped with the current time
    pub fn new(snapshot: Hash, parent: Option<Hash>, message: impl Into<String>) -> Self {
        Self::with_timestamp(snapshot, parent, message, now())
    }

    /// create a new commit with explicit timestamp
    pub fn with_timestamp(
        snapshot: Hash,
        parent: Option<Hash>,
        message: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            snapshot,
            parent,
            message: message.into(),
            timestamp,
        }
    }

    /// is this an initial commit (no parent)
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// canonical encoded form
    pub fn encode(&self) -> crate::Result<Vec<u8>> {
        let mut bytes = Vec::new();
        ciborium::into_writer(self, &mut bytes)?;
        Ok(bytes)
    }
}

/// current unix time in seconds
pub(crate) fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
