//! In-process document store.
//!
//! Single-threaded by construction (`RefCell`), matching the one-owner
//! access model of the note layer.

use crate::store::{DocumentStore, Metadata, StoreResult, StoredDocument};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;

/// Map-backed store, mainly for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    entries: RefCell<BTreeMap<String, StoredDocument>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Returns stored ids in ascending order.
    pub fn ids(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn get(&self, id: &str) -> StoreResult<Option<StoredDocument>> {
        Ok(self.entries.borrow().get(id).cloned())
    }

    fn upsert(&self, id: &str, document: &Value, metadata: &Metadata) -> StoreResult<()> {
        self.entries.borrow_mut().insert(
            id.to_string(),
            StoredDocument {
                id: id.to_string(),
                document: document.clone(),
                metadata: metadata.clone(),
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryDocumentStore;
    use crate::store::{DocumentStore, Metadata};
    use serde_json::json;

    #[test]
    fn upsert_replaces_existing_entry() {
        let store = MemoryDocumentStore::new();
        store.upsert("a", &json!({"v": 1}), &Metadata::new()).unwrap();
        store.upsert("a", &json!({"v": 2}), &Metadata::new()).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.ids(), vec!["a".to_string()]);
        let stored = store.get("a").unwrap().unwrap();
        assert_eq!(stored.document, json!({"v": 2}));
    }

    #[test]
    fn get_many_skips_missing_and_keeps_request_order() {
        let store = MemoryDocumentStore::new();
        store.upsert("a", &json!(1), &Metadata::new()).unwrap();
        store.upsert("b", &json!(2), &Metadata::new()).unwrap();

        let found = store
            .get_many(&["b".to_string(), "zz".to_string(), "a".to_string()])
            .unwrap();
        let ids: Vec<_> = found.iter().map(|doc| doc.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }
}
