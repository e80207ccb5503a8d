//! Defines the data structures used for describing override patches.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::stable_id::StableId;

use super::{ComponentTemplate, TemplateNode};

/// Pseudo component type carrying entity-level overrides.
pub const ENTITY_COMPONENT: &str = "__entity";

/// Property of [`ENTITY_COMPONENT`] holding the node's name.
pub const ENTITY_NAME: &str = "__name";

/// Property of [`ENTITY_COMPONENT`] holding the node's active flag.
pub const ENTITY_ACTIVE: &str = "__active";

/// Override name addressing a component's `enabled` flag.
pub const ENABLED_PROPERTY: &str = "enabled";

/// Override name addressing a component's `editorOnly` flag.
pub const EDITOR_ONLY_PROPERTY: &str = "editorOnly";

/// The difference between a template and one modified copy of it.
///
/// All node ids refer to nodes of the template the patch was computed
/// against.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverridePatch {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub property_overrides: Vec<PropertyOverride>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub added_components: Vec<AddedComponent>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed_components: Vec<RemovedComponent>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub added_children: Vec<AddedChild>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed_children: Vec<StableId>,
}

impl OverridePatch {
    pub fn new() -> Self {
        OverridePatch {
            property_overrides: Vec::new(),
            added_components: Vec::new(),
            removed_components: Vec::new(),
            added_children: Vec::new(),
            removed_children: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of entries across all kinds of changes.
    pub fn len(&self) -> usize {
        self.property_overrides.len()
            + self.added_components.len()
            + self.removed_components.len()
            + self.added_children.len()
            + self.removed_children.len()
    }

    /// Composes `other` on top of this patch, so that applying the result
    /// matches applying this patch and then `other`.
    ///
    /// `other` must have been computed against the tree this patch produces.
    /// Removals in `other` that undo an addition of this patch cancel that
    /// addition instead of being carried over, since applying a patch runs
    /// every removal before any addition.
    pub fn merge(&mut self, other: OverridePatch) {
        let OverridePatch {
            property_overrides,
            added_components,
            removed_components,
            added_children,
            removed_children,
        } = other;

        for removed_id in removed_children {
            if !self.cancel_added_child(&removed_id) {
                self.removed_children.push(removed_id);
            }
        }

        for removal in removed_components {
            // Additions are appended, so they are the last of their type and
            // the first thing a later removal of that type hits.
            let added = self.added_components.iter().rposition(|addition| {
                addition.node_id == removal.node_id
                    && addition.component.component_type == removal.component_type
            });

            match added {
                Some(position) => {
                    self.added_components.remove(position);
                }
                None => self.removed_components.push(removal),
            }
        }

        self.property_overrides.extend(property_overrides);
        self.added_components.extend(added_components);
        self.added_children.extend(added_children);
    }

    /// Takes the node `id` out of the subtrees added by this patch, dropping
    /// every entry that targeted it or its descendants. Returns `false` if
    /// this patch didn't add the node.
    fn cancel_added_child(&mut self, id: &StableId) -> bool {
        let removed = match self
            .added_children
            .iter()
            .position(|addition| addition.child.stable_id == *id)
        {
            Some(position) => self.added_children.remove(position).child,
            None => {
                let nested = self
                    .added_children
                    .iter_mut()
                    .find_map(|addition| addition.child.remove_descendant(id.as_str()));

                match nested {
                    Some(node) => node,
                    None => return false,
                }
            }
        };

        let mut gone: HashSet<StableId> = removed
            .descendants()
            .map(|node| node.stable_id.clone())
            .collect();

        // Additions nested under the removed subtree go with it.
        loop {
            let (orphans, kept): (Vec<AddedChild>, Vec<AddedChild>) = self
                .added_children
                .drain(..)
                .partition(|addition| gone.contains(&addition.parent_node_id));
            self.added_children = kept;

            if orphans.is_empty() {
                break;
            }

            for orphan in &orphans {
                gone.extend(orphan.child.descendants().map(|node| node.stable_id.clone()));
            }
        }

        self.property_overrides
            .retain(|entry| !gone.contains(&entry.node_id));
        self.added_components
            .retain(|addition| !gone.contains(&addition.node_id));
        self.removed_components
            .retain(|removal| !gone.contains(&removal.node_id));

        true
    }
}

/// A patch indicating that a property (or a flag, or an entity attribute)
/// changed on one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyOverride {
    pub node_id: StableId,
    pub component_type: String,

    /// Which component of `component_type` on the node this targets, when
    /// the node carries more than one of them.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub component_index: usize,

    pub property_name: String,

    /// The new value. `None` means the property exists in the template but
    /// was removed in the instance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl PropertyOverride {
    pub fn entity_name(node_id: StableId, name: &str) -> Self {
        Self {
            node_id,
            component_type: ENTITY_COMPONENT.to_owned(),
            component_index: 0,
            property_name: ENTITY_NAME.to_owned(),
            value: Some(Value::String(name.to_owned())),
        }
    }

    pub fn entity_active(node_id: StableId, active: bool) -> Self {
        Self {
            node_id,
            component_type: ENTITY_COMPONENT.to_owned(),
            component_index: 0,
            property_name: ENTITY_ACTIVE.to_owned(),
            value: Some(Value::Bool(active)),
        }
    }

    pub fn is_entity_override(&self) -> bool {
        self.component_type == ENTITY_COMPONENT
    }
}

fn is_zero(value: &usize) -> bool {
    *value == 0
}

/// A patch containing a component that was added to an existing node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddedComponent {
    pub node_id: StableId,
    pub component: ComponentTemplate,
}

/// A patch indicating that a component present in the template is gone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedComponent {
    pub node_id: StableId,
    pub component_type: String,
}

/// A patch containing a subtree that was authored on the instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddedChild {
    pub parent_node_id: StableId,
    pub child: TemplateNode,
}
