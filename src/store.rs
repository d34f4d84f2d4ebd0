//! In-memory record store.
//!
//! Records are loaded once from a JSON array at start-up, validated, and
//! indexed by id. The store is never mutated afterwards and is shared
//! read-only behind an `Arc`.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// A single demo document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Record {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            text: String::new(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Ordered records plus an id → position index.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<Record>,
    index: HashMap<String, usize>,
}

impl RecordStore {
    /// Load a JSON array of records from `path`.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let records: Vec<Record> = {
            let file = File::open(path).map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            serde_json::from_reader(BufReader::new(file)).map_err(|source| LoadError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        };

        let store = Self::from_records(records)?;
        tracing::info!(
            path = %path.display(),
            records = store.len(),
            "record store loaded"
        );
        Ok(store)
    }

    /// Validate and index an already-deserialized record list.
    ///
    /// Ids must be non-empty and unique; a repeated id is a load error
    /// rather than a silent overwrite.
    pub fn from_records(records: Vec<Record>) -> Result<Self, LoadError> {
        let mut index = HashMap::with_capacity(records.len());

        for (position, record) in records.iter().enumerate() {
            if record.id.is_empty() {
                return Err(LoadError::EmptyId { index: position });
            }
            if let Some(&first) = index.get(record.id.as_str()) {
                return Err(LoadError::DuplicateId {
                    id: record.id.clone(),
                    first,
                    duplicate: position,
                });
            }
            index.insert(record.id.clone(), position);
        }

        Ok(Self { records, index })
    }

    /// All records, in source order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.index.get(id).map(|&position| &self.records[position])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
