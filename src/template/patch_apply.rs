//! Defines the algorithm for applying override patches.

use serde_json::Value;

use crate::registry::ComponentRegistry;

use super::{
    patch::{OverridePatch, PropertyOverride},
    NodeIndex, TemplateNode, EDITOR_ONLY_PROPERTY, ENABLED_PROPERTY, ENTITY_ACTIVE, ENTITY_NAME,
};

/// Applies `patch` onto the tree rooted at `root`, in place.
///
/// Changes are applied in a fixed order: child removals, child additions,
/// component removals, component additions and finally property overrides.
/// Entries that point at nodes or components that don't exist are skipped.
pub fn apply_overrides(root: &mut TemplateNode, patch: &OverridePatch, registry: &ComponentRegistry) {
    let root_id = root.stable_id.clone();

    for removed_id in &patch.removed_children {
        if *removed_id == root_id {
            log::warn!("Ignoring removal of root node {}", removed_id);
            continue;
        }

        if root.remove_descendant(removed_id.as_str()).is_none() {
            log::debug!("Removed child {} was not found, skipping", removed_id);
        }
    }

    let index = NodeIndex::build(root);

    for addition in &patch.added_children {
        let parent_id = addition.parent_node_id.as_str();

        // Additions may be nested under nodes added earlier in this loop,
        // which the index doesn't know about yet.
        let parent = if index.contains(parent_id) {
            index.get_mut(root, parent_id)
        } else {
            root.find_mut(parent_id)
        };

        match parent {
            Some(parent) => parent.children.push(addition.child.clone()),
            None => log::warn!(
                "Parent {} of added child {} was not found, skipping",
                parent_id,
                addition.child.stable_id
            ),
        }
    }

    // The shape of the tree is fixed from here on.
    let index = NodeIndex::build(root);

    for removal in &patch.removed_components {
        let node = match index.get_mut(root, removal.node_id.as_str()) {
            Some(node) => node,
            None => {
                log::warn!(
                    "Node {} of removed component {} was not found, skipping",
                    removal.node_id,
                    removal.component_type
                );
                continue;
            }
        };

        // Pairing is first-in first-out, so unpaired template components are
        // always the last ones of their type.
        match node
            .components
            .iter()
            .rposition(|component| component.component_type == removal.component_type)
        {
            Some(position) => {
                node.components.remove(position);
            }
            None => log::debug!(
                "Node {} has no {} component to remove, skipping",
                removal.node_id,
                removal.component_type
            ),
        }
    }

    for addition in &patch.added_components {
        match index.get_mut(root, addition.node_id.as_str()) {
            Some(node) => {
                let mut component = addition.component.clone();

                // Root placement belongs to the scene placing the instance.
                if node.stable_id == root_id {
                    component.strip_placement(registry);
                }

                node.components.push(component);
            }
            None => log::warn!(
                "Node {} of added component {} was not found, skipping",
                addition.node_id,
                addition.component.component_type
            ),
        }
    }

    for entry in &patch.property_overrides {
        match index.get_mut(root, entry.node_id.as_str()) {
            Some(node) => {
                let is_root = node.stable_id == root_id;
                apply_property_override(node, is_root, entry, registry);
            }
            None => log::warn!(
                "Node {} of override {}.{} was not found, skipping",
                entry.node_id,
                entry.component_type,
                entry.property_name
            ),
        }
    }

    log::debug!("Applied {} override(s) onto {}", patch.len(), root_id);
}

fn apply_property_override(
    node: &mut TemplateNode,
    is_root: bool,
    entry: &PropertyOverride,
    registry: &ComponentRegistry,
) {
    if entry.is_entity_override() {
        match (entry.property_name.as_str(), &entry.value) {
            // The root's name belongs to the scene placing the instance.
            (ENTITY_NAME, _) if is_root => {}
            (ENTITY_NAME, Some(Value::String(name))) => node.name = name.clone(),
            (ENTITY_ACTIVE, Some(Value::Bool(active))) => node.active = *active,
            (name, value) => log::warn!(
                "Invalid entity override {} = {:?} on {}, skipping",
                name,
                value,
                node.stable_id
            ),
        }

        return;
    }

    let node_id = node.stable_id.clone();
    let component = match node.component_of_type_mut(&entry.component_type, entry.component_index) {
        Some(component) => component,
        None => {
            log::warn!(
                "Node {} has no {} component #{}, skipping override of {}",
                node_id,
                entry.component_type,
                entry.component_index,
                entry.property_name
            );
            return;
        }
    };

    match (entry.property_name.as_str(), &entry.value) {
        (ENABLED_PROPERTY, Some(Value::Bool(enabled))) => component.enabled = *enabled,
        (EDITOR_ONLY_PROPERTY, Some(Value::Bool(editor_only))) => component.editor_only = *editor_only,
        (ENABLED_PROPERTY | EDITOR_ONLY_PROPERTY, value) => log::warn!(
            "Invalid value {:?} for flag {}.{} on {}, skipping",
            value,
            entry.component_type,
            entry.property_name,
            node_id
        ),
        (name, _) if is_root && registry.is_placement(&entry.component_type, name) => {
            log::trace!("Ignoring placement override {}.{} on root", entry.component_type, name);
        }
        (name, Some(value)) => {
            component.properties.insert(name.to_owned(), value.clone());
        }
        (name, None) => {
            component.properties.remove(name);
        }
    }
}
