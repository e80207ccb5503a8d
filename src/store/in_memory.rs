use std::collections::HashMap;

use crate::template::PrefabAsset;

use super::{encode_document, normalize_path, parse_document, StoreError, TemplateStore};

/// Template store that keeps serialized documents in memory.
///
/// Documents are kept in their encoded form, so a load always produces a
/// fresh tree and malformed documents behave like they would on disk.
#[derive(Debug, Default, Clone)]
pub struct InMemoryTemplateStore {
    documents: HashMap<String, Vec<u8>>,
}

impl InMemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores raw document contents at `path` without validating them.
    pub fn insert_raw(&mut self, path: &str, contents: impl Into<Vec<u8>>) {
        self.documents.insert(normalize_path(path), contents.into());
    }

    pub fn remove(&mut self, path: &str) -> bool {
        self.documents.remove(&normalize_path(path)).is_some()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.documents.contains_key(&normalize_path(path))
    }
}

impl TemplateStore for InMemoryTemplateStore {
    fn load(&self, path: &str) -> Result<Option<PrefabAsset>, StoreError> {
        let path = normalize_path(path);

        match self.documents.get(&path) {
            Some(contents) => parse_document(&path, contents).map(Some),
            None => Ok(None),
        }
    }

    fn save(&mut self, path: &str, asset: &PrefabAsset) -> Result<(), StoreError> {
        let path = normalize_path(path);
        let encoded = encode_document(&path, asset)?;
        self.documents.insert(path, encoded);

        Ok(())
    }
}
