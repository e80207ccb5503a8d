//! A cache of template documents in front of a [`TemplateStore`].

use std::collections::{HashMap, HashSet};

use crate::{
    registry::ComponentRegistry,
    store::{normalize_path, StoreError, TemplateStore},
    template::PrefabAsset,
    variant::resolve_variant,
};

/// Loads template documents through a store and keeps them around.
///
/// Cached documents are never handed out directly: every read returns a deep
/// copy that the caller is free to mutate. The cache is keyed by normalized
/// path and has no eviction of its own; embedders call [`invalidate`] or
/// [`clear`] when documents change behind its back.
///
/// [`invalidate`]: PrefabLibrary::invalidate
/// [`clear`]: PrefabLibrary::clear
#[derive(Debug)]
pub struct PrefabLibrary<S> {
    store: S,
    cache: HashMap<String, PrefabAsset>,
}

impl<S: TemplateStore> PrefabLibrary<S> {
    pub fn new(store: S) -> Self {
        PrefabLibrary {
            store,
            cache: HashMap::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Gives direct access to the underlying store. Changes made through it
    /// are not seen by the cache until the affected paths are invalidated.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Loads the document at `path` as it is stored, without resolving
    /// variants.
    ///
    /// Missing and malformed documents both yield `None`; the latter is
    /// logged. Duplicate or missing stable ids are fixed up on load.
    pub fn load(&mut self, path: &str) -> Option<PrefabAsset> {
        let path = normalize_path(path);

        if let Some(cached) = self.cache.get(&path) {
            return Some(cached.clone());
        }

        match self.store.load(&path) {
            Ok(Some(mut asset)) => {
                let regenerated = asset.root.ensure_unique_ids();
                if regenerated > 0 {
                    log::debug!("Assigned {} stable id(s) while loading {}", regenerated, path);
                }

                self.cache.insert(path, asset.clone());
                Some(asset)
            }
            Ok(None) => {
                log::debug!("No template document at {}", path);
                None
            }
            Err(err) => {
                log::warn!("Could not load template document {}: {}", path, err);
                None
            }
        }
    }

    /// Loads the document at `path` and resolves its variant chain into a
    /// complete template. Returns `None` if any document of the chain is
    /// missing or malformed, or if the chain loops back on itself.
    pub fn resolve(&mut self, path: &str, registry: &ComponentRegistry) -> Option<PrefabAsset> {
        let mut visited = HashSet::new();
        resolve_variant(self, path, registry, &mut visited)
    }

    /// Writes a document through to the store and drops any cached copy.
    pub fn save(&mut self, path: &str, asset: &PrefabAsset) -> Result<(), StoreError> {
        let path = normalize_path(path);

        self.store.save(&path, asset)?;
        self.cache.remove(&path);

        Ok(())
    }

    /// Drops the cached copy of `path`. Returns whether there was one.
    pub fn invalidate(&mut self, path: &str) -> bool {
        self.cache.remove(&normalize_path(path)).is_some()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}
