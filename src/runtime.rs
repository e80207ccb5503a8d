//! The live entity graph that templates are instantiated into.
//!
//! The instantiator only talks to the [`RuntimeGraph`] trait. An embedding
//! application implements it on top of its own entity storage;
//! [`InMemoryRuntime`] is a small standalone implementation.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    stable_id::StableId,
    template::{ComponentTemplate, TemplateNode},
};

/// A component ready to be attached to a live entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeComponent {
    #[serde(rename = "type")]
    pub component_type: String,
    pub enabled: bool,
    pub editor_only: bool,
    pub properties: BTreeMap<String, Value>,

    /// Whether the component type was known to the registry. Unknown
    /// components carry their template data verbatim.
    pub known: bool,
}

/// Operations the instantiator needs from the live entity graph.
///
/// Identities handed to the graph are already remapped, so they are unique
/// across every instantiation.
pub trait RuntimeGraph {
    type Entity: Copy;

    fn create_entity(&mut self, id: &StableId, name: &str, active: bool) -> Self::Entity;
    fn attach_component(&mut self, entity: Self::Entity, component: RuntimeComponent);
    fn set_parent(&mut self, child: Self::Entity, parent: Self::Entity);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityHandle(usize);

#[derive(Debug, Clone)]
pub struct RuntimeEntity {
    pub id: StableId,
    pub name: String,
    pub active: bool,
    pub components: Vec<RuntimeComponent>,
    pub parent: Option<EntityHandle>,
    pub children: Vec<EntityHandle>,
}

/// An entity graph held entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryRuntime {
    entities: Vec<RuntimeEntity>,
    by_id: HashMap<StableId, EntityHandle>,
}

impl InMemoryRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entity(&self, handle: EntityHandle) -> Option<&RuntimeEntity> {
        self.entities.get(handle.0)
    }

    /// Finds a live entity by its identity.
    pub fn lookup(&self, id: &str) -> Option<EntityHandle> {
        self.by_id.get(id).copied()
    }

    pub fn children(&self, handle: EntityHandle) -> &[EntityHandle] {
        self.entity(handle)
            .map(|entity| entity.children.as_slice())
            .unwrap_or(&[])
    }

    /// The entity and all of its descendants, in pre-order.
    pub fn descendants(&self, handle: EntityHandle) -> Vec<EntityHandle> {
        let mut found = Vec::new();
        let mut stack = vec![handle];

        while let Some(current) = stack.pop() {
            if self.entity(current).is_none() {
                continue;
            }

            found.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }

        found
    }

    /// Reads a live subtree back into template form, using the runtime
    /// identities as stable ids.
    pub fn extract(&self, handle: EntityHandle) -> Option<TemplateNode> {
        let entity = self.entity(handle)?;

        let components = entity
            .components
            .iter()
            .map(|component| ComponentTemplate {
                component_type: component.component_type.clone(),
                enabled: component.enabled,
                editor_only: component.editor_only,
                properties: component.properties.clone(),
            })
            .collect();

        let children = entity
            .children
            .iter()
            .filter_map(|&child| self.extract(child))
            .collect();

        Some(TemplateNode {
            stable_id: entity.id.clone(),
            name: entity.name.clone(),
            active: entity.active,
            components,
            children,
        })
    }
}

impl RuntimeGraph for InMemoryRuntime {
    type Entity = EntityHandle;

    fn create_entity(&mut self, id: &StableId, name: &str, active: bool) -> EntityHandle {
        let handle = EntityHandle(self.entities.len());

        self.entities.push(RuntimeEntity {
            id: id.clone(),
            name: name.to_owned(),
            active,
            components: Vec::new(),
            parent: None,
            children: Vec::new(),
        });

        if let Some(previous) = self.by_id.insert(id.clone(), handle) {
            log::warn!(
                "Entity identity {} was already in use by {:?}, lookups now resolve to {:?}",
                id,
                previous,
                handle
            );
        }

        handle
    }

    fn attach_component(&mut self, entity: EntityHandle, component: RuntimeComponent) {
        match self.entities.get_mut(entity.0) {
            Some(target) => target.components.push(component),
            None => log::warn!("Cannot attach component to missing entity {:?}", entity),
        }
    }

    fn set_parent(&mut self, child: EntityHandle, parent: EntityHandle) {
        if self.entity(child).is_none() || self.entity(parent).is_none() {
            log::warn!("Cannot parent {:?} to {:?}: entity missing", child, parent);
            return;
        }

        if let Some(old_parent) = self.entities[child.0].parent.take() {
            self.entities[old_parent.0]
                .children
                .retain(|&existing| existing != child);
        }

        self.entities[child.0].parent = Some(parent);
        self.entities[parent.0].children.push(child);
    }
}
