//! Turning templates into live entities.
//!
//! Every instantiation gets its own set of identities. Ids inside a template
//! are only unique within that template, so they are swapped for freshly
//! generated ones, and any property value that refers to a node of the
//! template by id is rewritten to point at that node's new identity.

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

use crate::{
    registry::ComponentRegistry,
    runtime::RuntimeGraph,
    stable_id::StableId,
    template::{apply_overrides, OverridePatch, TemplateNode},
};

#[derive(Debug, Error)]
pub enum InstantiateError {
    #[error("the identity requested for the root entity is empty")]
    EmptyRootId,
}

/// The outcome of one instantiation.
#[derive(Debug, Clone)]
pub struct InstantiatedPrefab<E> {
    /// The live root entity.
    pub root: E,

    /// The runtime identity given to the root.
    pub root_id: StableId,

    /// Template-scoped id of every node to its runtime identity.
    pub ids: HashMap<StableId, StableId>,
}

impl<E> InstantiatedPrefab<E> {
    pub fn runtime_id(&self, template_id: &str) -> Option<&StableId> {
        self.ids.get(template_id)
    }

    /// Maps a tree read back from the runtime into template-scoped ids, so
    /// that it can be diffed against the template it was created from.
    ///
    /// References inside property values are mapped back as well. Nodes that
    /// were created after instantiation keep their runtime identity.
    pub fn to_template_ids(&self, tree: &TemplateNode) -> TemplateNode {
        let inverse: HashMap<&str, &StableId> = self
            .ids
            .iter()
            .map(|(template_id, runtime_id)| (runtime_id.as_str(), template_id))
            .collect();

        let mut tree = tree.clone();
        remap_tree(&mut tree, &|id| inverse.get(id).map(|&template_id| template_id.clone()));
        tree
    }
}

pub struct Instantiator<'a> {
    registry: &'a ComponentRegistry,
}

impl<'a> Instantiator<'a> {
    pub fn new(registry: &'a ComponentRegistry) -> Self {
        Instantiator { registry }
    }

    pub fn registry(&self) -> &'a ComponentRegistry {
        self.registry
    }

    /// Creates a live copy of `template` in `runtime`.
    ///
    /// `overrides` are applied to a copy of the template first. The root is
    /// given `forced_root_id` if there is one, so that an instance can come
    /// back under the identity a scene recorded for it, and is parented to
    /// `parent` if there is one.
    pub fn instantiate<R: RuntimeGraph>(
        &self,
        runtime: &mut R,
        template: &TemplateNode,
        overrides: Option<&OverridePatch>,
        forced_root_id: Option<StableId>,
        parent: Option<R::Entity>,
    ) -> Result<InstantiatedPrefab<R::Entity>, InstantiateError> {
        if forced_root_id.as_ref().map_or(false, StableId::is_none) {
            return Err(InstantiateError::EmptyRootId);
        }

        let mut root = template.clone();

        if let Some(overrides) = overrides {
            apply_overrides(&mut root, overrides, self.registry);
        }

        root.ensure_unique_ids();

        let mut ids: HashMap<StableId, StableId> = root
            .descendants()
            .map(|node| (node.stable_id.clone(), StableId::generate()))
            .collect();

        if let Some(forced_root_id) = forced_root_id {
            ids.insert(root.stable_id.clone(), forced_root_id);
        }

        remap_tree(&mut root, &|id| ids.get(id).cloned());

        let entity = self.materialize(runtime, &root, parent);

        log::debug!(
            "Instantiated {} entities under root {}",
            ids.len(),
            root.stable_id
        );

        Ok(InstantiatedPrefab {
            root: entity,
            root_id: root.stable_id,
            ids,
        })
    }

    fn materialize<R: RuntimeGraph>(
        &self,
        runtime: &mut R,
        node: &TemplateNode,
        parent: Option<R::Entity>,
    ) -> R::Entity {
        let entity = runtime.create_entity(&node.stable_id, &node.name, node.active);

        for component in &node.components {
            runtime.attach_component(entity, self.registry.materialize(component));
        }

        if let Some(parent) = parent {
            runtime.set_parent(entity, parent);
        }

        for child in &node.children {
            self.materialize(runtime, child, Some(entity));
        }

        entity
    }
}

/// Rewrites the id of every node in the tree, and every string inside a
/// property value, for which `lookup` returns a replacement.
fn remap_tree(node: &mut TemplateNode, lookup: &dyn Fn(&str) -> Option<StableId>) {
    if let Some(new_id) = lookup(node.stable_id.as_str()) {
        node.stable_id = new_id;
    }

    for component in &mut node.components {
        for value in component.properties.values_mut() {
            remap_value(value, lookup);
        }
    }

    for child in &mut node.children {
        remap_tree(child, lookup);
    }
}

fn remap_value(value: &mut Value, lookup: &dyn Fn(&str) -> Option<StableId>) {
    match value {
        Value::String(text) => {
            if let Some(new_id) = lookup(text) {
                *text = new_id.to_string();
            }
        }
        Value::Array(items) => {
            for item in items {
                remap_value(item, lookup);
            }
        }
        Value::Object(fields) => {
            for field in fields.values_mut() {
                remap_value(field, lookup);
            }
        }
        _ => {}
    }
}
