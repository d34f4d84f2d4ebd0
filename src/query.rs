//! Keyword search and id lookup over a [`RecordStore`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::NotFoundError;
use crate::store::{Record, RecordStore};

/// Result of a `search` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    pub ids: Vec<String>,
}

/// Read-only query surface shared by every transport.
#[derive(Debug)]
pub struct QueryService {
    store: Arc<RecordStore>,
    /// Lowercased search text, one per record, aligned with `store.records()`.
    haystacks: Vec<String>,
}

impl QueryService {
    pub fn new(store: Arc<RecordStore>) -> Self {
        let haystacks = store.records().iter().map(haystack).collect();
        Self { store, haystacks }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Ids of records whose title, text or metadata values contain any
    /// query token, in store order.
    ///
    /// Matching is case-insensitive substring containment. A query with
    /// no tokens matches nothing.
    pub fn search(&self, query: &str) -> SearchResults {
        let tokens = tokenize_query(query);
        if tokens.is_empty() {
            return SearchResults::default();
        }

        let ids = self
            .store
            .records()
            .iter()
            .zip(&self.haystacks)
            .filter(|(_, hay)| tokens.iter().any(|t| hay.contains(t.as_str())))
            .map(|(record, _)| record.id.clone())
            .collect();

        SearchResults { ids }
    }

    pub fn fetch(&self, id: &str) -> Result<&Record, NotFoundError> {
        self.store.get(id).ok_or_else(|| NotFoundError { id: id.to_string() })
    }
}

/// Split on whitespace and lowercase. Duplicates and order are kept.
pub fn tokenize_query(query: &str) -> Vec<String> {
    query.split_whitespace().map(str::to_lowercase).collect()
}

fn haystack(record: &Record) -> String {
    let metadata = record
        .metadata
        .values()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");
    [record.title.as_str(), record.text.as_str(), metadata.as_str()]
        .join(" ")
        .to_lowercase()
}
