//! Resolution of variant chains.
//!
//! A variant document only stores the patch it applies on top of its parent
//! template, which may itself be a variant. Resolving walks up the chain to
//! the first document that isn't a variant and applies every patch on the
//! way back down.

use std::collections::HashSet;

use crate::{
    library::PrefabLibrary,
    registry::ComponentRegistry,
    store::{normalize_path, TemplateStore},
    template::{apply_overrides, PrefabAsset},
};

/// Resolves the document at `path` into a complete template.
///
/// `visited` holds the normalized paths of the variants currently being
/// resolved further down the call stack. Reaching one of them again means the
/// chain is cyclic, in which case the whole resolution fails.
///
/// The result keeps the name, parent path and patch of the document at
/// `path`, with `root` replaced by the merged tree.
pub fn resolve_variant<S: TemplateStore>(
    library: &mut PrefabLibrary<S>,
    path: &str,
    registry: &ComponentRegistry,
    visited: &mut HashSet<String>,
) -> Option<PrefabAsset> {
    let path = normalize_path(path);
    let asset = library.load(&path)?;

    let parent_path = match &asset.source_prefab_path {
        Some(parent_path) => normalize_path(parent_path),
        None => return Some(asset),
    };

    if !visited.insert(path.clone()) {
        log::warn!("Variant chain of {} loops back on itself, refusing to resolve it", path);
        return None;
    }

    log::trace!("Resolving variant {} of {}", path, parent_path);

    let parent = match resolve_variant(library, &parent_path, registry, visited) {
        Some(parent) => parent,
        None => {
            log::warn!("Could not resolve {}, parent template of {}", parent_path, path);
            return None;
        }
    };

    let mut root = parent.root;
    apply_overrides(&mut root, &asset.variant_overrides, registry);

    Some(PrefabAsset { root, ..asset })
}
