use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::hash::Hash;

/// a flat mapping of work-tree path to blob hash
///
/// this is the frozen form of the staging index. it is deliberately not a
/// tree of trees: every path is a full `/`-separated key. entries are kept in
/// a BTreeMap so serialization is ordered by path and the same mapping
/// always encodes to the same bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub entries: BTreeMap<String, Hash>,
}

impl Snapshot {
    /// create a snapshot from entries
    pub fn new(entries: BTreeMap<String, Hash>) -> Self {
        Self { entries }
    }

    /// look up a path
    pub fn get(&self, path: &str) -> Option<&Hash> {
        self.entries.get(path)
    }

    /// number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// is snapshot empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// canonical encoded form
    pub fn encode(&self) -> crate::Result<Vec<u8>> {
        let mut bytes = Vec::new();
        ciborium::into_writer(self, &mut bytes)?;
        Ok(bytes)
    }
}
