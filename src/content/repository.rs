//! Content repository for forumbridge.
//!
//! The repository is the external owner of forum, topic and reply records.
//! The adapter only reads from it, through [`ContentRepository`].

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use super::types::{ContentRecord, PostStatus};
use crate::{BridgeError, Result};

/// Read access to stored forum records.
///
/// Lookups are synchronous and treated as reliable; a missing record is
/// `None`, never an error.
pub trait ContentRepository {
    /// Get a record by ID, whatever its type.
    fn find(&self, id: i64) -> Option<ContentRecord>;

    /// Get the ID of a record by native type and slug.
    fn find_by_slug(&self, native_type: &str, slug: &str) -> Option<i64>;

    /// Return the subset of `ids` that are records of exactly `native_type`
    /// in `status`.
    ///
    /// Type matching is case-sensitive. Each matching ID is returned once.
    fn filter_ids(&self, native_type: &str, status: PostStatus, ids: &[i64]) -> Vec<i64>;
}

#[derive(Debug, Deserialize)]
struct RecordFile {
    #[serde(default)]
    records: Vec<ContentRecord>,
}

/// In-memory record store.
#[derive(Debug, Clone, Default)]
pub struct MemoryContentStore {
    records: BTreeMap<i64, ContentRecord>,
}

impl MemoryContentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load records from a TOML fixture file (`[[records]]` tables).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse records from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        let file: RecordFile = toml::from_str(s)
            .map_err(|e| BridgeError::Fixture(format!("record parse error: {e}")))?;

        let mut store = Self::new();
        for record in file.records {
            if record.id <= 0 {
                return Err(BridgeError::Fixture(format!(
                    "record id must be positive: {}",
                    record.id
                )));
            }
            if store.records.contains_key(&record.id) {
                return Err(BridgeError::Fixture(format!(
                    "duplicate record id: {}",
                    record.id
                )));
            }
            store.insert(record);
        }
        debug!("Loaded {} content records", store.len());
        Ok(store)
    }

    /// Insert or replace a record.
    pub fn insert(&mut self, record: ContentRecord) {
        self.records.insert(record.id, record);
    }

    /// Builder-style insert.
    pub fn with(mut self, record: ContentRecord) -> Self {
        self.insert(record);
        self
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ContentRepository for MemoryContentStore {
    fn find(&self, id: i64) -> Option<ContentRecord> {
        self.records.get(&id).cloned()
    }

    fn find_by_slug(&self, native_type: &str, slug: &str) -> Option<i64> {
        self.records
            .values()
            .find(|r| r.native_type == native_type && r.slug == slug)
            .map(|r| r.id)
    }

    fn filter_ids(&self, native_type: &str, status: PostStatus, ids: &[i64]) -> Vec<i64> {
        let mut seen = HashSet::new();
        ids.iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .filter(|id| {
                self.records
                    .get(id)
                    .is_some_and(|r| r.native_type == native_type && r.status == status)
            })
            .collect()
    }
}
