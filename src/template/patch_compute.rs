//! Defines the algorithm for computing a minimal override patch given a
//! source template and a locally modified instance of it.

use std::collections::{BTreeSet, HashMap};

use serde_json::Value;

use crate::{multimap::MultiQueue, registry::ComponentRegistry, value_eq::value_eq};

use super::{
    patch::{AddedChild, AddedComponent, OverridePatch, PropertyOverride, RemovedComponent},
    ComponentTemplate, TemplateNode, EDITOR_ONLY_PROPERTY, ENABLED_PROPERTY,
};

/// Computes the patch that turns `source` into `instance`.
///
/// The two roots are always paired, whatever their ids. Every other node is
/// paired by stable id. Ids recorded in the patch are the ids of `source`.
pub fn compute_overrides(
    source: &TemplateNode,
    instance: &TemplateNode,
    registry: &ComponentRegistry,
) -> OverridePatch {
    let mut patch = OverridePatch::new();
    compute_overrides_internal(source, instance, true, registry, &mut patch);

    log::debug!(
        "Computed {} override(s) between {} and {}",
        patch.len(),
        source.stable_id,
        instance.stable_id
    );

    patch
}

fn compute_overrides_internal(
    source: &TemplateNode,
    instance: &TemplateNode,
    is_root: bool,
    registry: &ComponentRegistry,
    patch: &mut OverridePatch,
) {
    compute_entity_overrides(source, instance, is_root, patch);
    compute_component_overrides(source, instance, is_root, registry, patch);
    compute_children_overrides(source, instance, registry, patch);
}

fn compute_entity_overrides(
    source: &TemplateNode,
    instance: &TemplateNode,
    is_root: bool,
    patch: &mut OverridePatch,
) {
    // The root's name belongs to the scene placing the instance.
    if !is_root && source.name != instance.name {
        patch
            .property_overrides
            .push(PropertyOverride::entity_name(source.stable_id.clone(), &instance.name));
    }

    if source.active != instance.active {
        patch
            .property_overrides
            .push(PropertyOverride::entity_active(source.stable_id.clone(), instance.active));
    }
}

fn compute_component_overrides(
    source: &TemplateNode,
    instance: &TemplateNode,
    is_root: bool,
    registry: &ComponentRegistry,
    patch: &mut OverridePatch,
) {
    let mut unpaired_source = MultiQueue::new();
    for (index, component) in source.components.iter().enumerate() {
        unpaired_source.push_back(component.component_type.as_str(), index);
    }

    let mut paired = vec![false; source.components.len()];
    let mut pairs_per_type: HashMap<&str, usize> = HashMap::new();

    for instance_component in &instance.components {
        let component_type = instance_component.component_type.as_str();

        match unpaired_source.pop_front(component_type) {
            Some(source_index) => {
                paired[source_index] = true;

                let ordinal = pairs_per_type.entry(component_type).or_insert(0);
                compute_property_overrides(
                    source,
                    &source.components[source_index],
                    instance_component,
                    *ordinal,
                    is_root,
                    registry,
                    patch,
                );
                *ordinal += 1;
            }
            None => {
                log::trace!(
                    "Component {} added on {}",
                    component_type,
                    source.stable_id
                );
                let mut component = instance_component.clone();
                if is_root {
                    component.strip_placement(registry);
                }

                patch.added_components.push(AddedComponent {
                    node_id: source.stable_id.clone(),
                    component,
                });
            }
        }
    }

    for (source_component, _) in source
        .components
        .iter()
        .zip(&paired)
        .filter(|&(_, &was_paired)| !was_paired)
    {
        log::trace!(
            "Component {} removed from {}",
            source_component.component_type,
            source.stable_id
        );
        patch.removed_components.push(RemovedComponent {
            node_id: source.stable_id.clone(),
            component_type: source_component.component_type.clone(),
        });
    }
}

fn compute_property_overrides(
    node: &TemplateNode,
    source: &ComponentTemplate,
    instance: &ComponentTemplate,
    component_index: usize,
    is_root: bool,
    registry: &ComponentRegistry,
    patch: &mut OverridePatch,
) {
    let component_type = source.component_type.as_str();
    let mut push = |property_name: &str, value: Option<Value>| {
        patch.property_overrides.push(PropertyOverride {
            node_id: node.stable_id.clone(),
            component_type: component_type.to_owned(),
            component_index,
            property_name: property_name.to_owned(),
            value,
        });
    };

    if source.enabled != instance.enabled {
        push(ENABLED_PROPERTY, Some(instance.enabled.into()));
    }

    if source.editor_only != instance.editor_only {
        push(EDITOR_ONLY_PROPERTY, Some(instance.editor_only.into()));
    }

    let names: BTreeSet<&String> = source
        .properties
        .keys()
        .chain(instance.properties.keys())
        .collect();

    for name in names {
        if is_root && registry.is_placement(component_type, name) {
            continue;
        }

        match (source.properties.get(name), instance.properties.get(name)) {
            (Some(source_value), Some(instance_value)) => {
                if !value_eq(source_value, instance_value) {
                    push(name.as_str(), Some(instance_value.clone()));
                }
            }
            (Some(source_value), None) => {
                // Absent means "whatever the type defaults to", so a source
                // value equal to the default isn't a real change.
                if !registry.is_default(component_type, name, source_value) {
                    push(name.as_str(), None);
                }
            }
            (None, Some(instance_value)) => {
                if !registry.is_default(component_type, name, instance_value) {
                    push(name.as_str(), Some(instance_value.clone()));
                }
            }
            (None, None) => {}
        }
    }
}

fn compute_children_overrides(
    source: &TemplateNode,
    instance: &TemplateNode,
    registry: &ComponentRegistry,
    patch: &mut OverridePatch,
) {
    let mut unpaired_source = MultiQueue::new();
    for (index, child) in source.children.iter().enumerate() {
        unpaired_source.push_back(child.stable_id.as_str(), index);
    }

    let mut paired = vec![false; source.children.len()];

    for instance_child in &instance.children {
        let matching_source = if instance_child.stable_id.is_none() {
            None
        } else {
            unpaired_source.pop_front(instance_child.stable_id.as_str())
        };

        match matching_source {
            Some(source_index) => {
                paired[source_index] = true;
                compute_overrides_internal(
                    &source.children[source_index],
                    instance_child,
                    false,
                    registry,
                    patch,
                );
            }
            None => {
                let mut child = instance_child.clone();
                child.ensure_ids();

                log::trace!("Child {} added under {}", child.stable_id, source.stable_id);
                patch.added_children.push(AddedChild {
                    parent_node_id: source.stable_id.clone(),
                    child,
                });
            }
        }
    }

    for (source_child, _) in source
        .children
        .iter()
        .zip(&paired)
        .filter(|&(_, &was_paired)| !was_paired)
    {
        log::trace!("Child {} removed from {}", source_child.stable_id, source.stable_id);
        patch.removed_children.push(source_child.stable_id.clone());
    }
}
