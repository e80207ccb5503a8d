//! Defines the structure of a template tree.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{registry::ComponentRegistry, stable_id::StableId, value_eq::value_eq};

use super::OverridePatch;

/// One entity in a template tree.
///
/// Nodes own their children; there is no sharing between trees. Cloning a
/// node deep-clones the whole subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateNode {
    /// Identity of the node within its template document. Used to pair
    /// nodes between a template and an instance, and between the documents
    /// of a variant chain.
    #[serde(default)]
    pub stable_id: StableId,

    #[serde(default)]
    pub name: String,

    #[serde(default = "default_true")]
    pub active: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ComponentTemplate>,

    /// Order is kept, but is not significant when diffing.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TemplateNode>,
}

impl TemplateNode {
    pub fn new(stable_id: impl Into<StableId>) -> Self {
        Self {
            stable_id: stable_id.into(),
            name: String::new(),
            active: true,
            components: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn name(self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self
        }
    }

    pub fn active(self, active: bool) -> Self {
        Self { active, ..self }
    }

    pub fn component(mut self, component: ComponentTemplate) -> Self {
        self.components.push(component);
        self
    }

    pub fn child(mut self, child: TemplateNode) -> Self {
        self.children.push(child);
        self
    }

    /// Assigns fresh ids to this node and any descendant that is missing one.
    pub fn ensure_ids(&mut self) {
        if self.stable_id.is_none() {
            self.stable_id = StableId::generate();
        }

        for child in &mut self.children {
            child.ensure_ids();
        }
    }

    /// Makes every id in the tree present and unique.
    ///
    /// Nodes are visited in pre-order; the first node to claim an id keeps
    /// it. Returns the number of ids that had to be generated.
    pub fn ensure_unique_ids(&mut self) -> usize {
        let mut seen = HashSet::new();
        ensure_unique_ids_internal(self, &mut seen)
    }

    pub fn find(&self, id: &str) -> Option<&TemplateNode> {
        if self.stable_id.as_str() == id {
            return Some(self);
        }

        self.children.iter().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut TemplateNode> {
        if self.stable_id.as_str() == id {
            return Some(self);
        }

        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    /// Detaches the descendant with the given id, returning it with its
    /// subtree. The node itself is never removed.
    pub fn remove_descendant(&mut self, id: &str) -> Option<TemplateNode> {
        if let Some(position) = self
            .children
            .iter()
            .position(|child| child.stable_id.as_str() == id)
        {
            return Some(self.children.remove(position));
        }

        self.children
            .iter_mut()
            .find_map(|child| child.remove_descendant(id))
    }

    /// Iterates over this node and all of its descendants in pre-order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Returns the `index`th component of the given type on this node.
    pub fn component_of_type(&self, component_type: &str, index: usize) -> Option<&ComponentTemplate> {
        self.components
            .iter()
            .filter(|component| component.component_type == component_type)
            .nth(index)
    }

    pub fn component_of_type_mut(
        &mut self,
        component_type: &str,
        index: usize,
    ) -> Option<&mut ComponentTemplate> {
        self.components
            .iter_mut()
            .filter(|component| component.component_type == component_type)
            .nth(index)
    }

    /// Compares two trees the way the override patch sees them.
    ///
    /// Children are paired by id regardless of sibling order, components are
    /// compared in order within each type, and the root's name, id and
    /// placement are ignored.
    pub fn structurally_matches(&self, other: &TemplateNode, registry: &ComponentRegistry) -> bool {
        nodes_match(self, other, true, registry)
    }
}

fn default_true() -> bool {
    true
}

fn ensure_unique_ids_internal(node: &mut TemplateNode, seen: &mut HashSet<StableId>) -> usize {
    let mut generated = 0;

    if node.stable_id.is_none() {
        node.stable_id = StableId::generate();
        generated += 1;
    } else if seen.contains(&node.stable_id) {
        let fresh = StableId::generate();
        log::warn!(
            "Duplicate stable id {} on node {:?}, regenerated as {}",
            node.stable_id,
            node.name,
            fresh
        );
        node.stable_id = fresh;
        generated += 1;
    }

    seen.insert(node.stable_id.clone());

    for child in &mut node.children {
        generated += ensure_unique_ids_internal(child, seen);
    }

    generated
}

pub struct Descendants<'a> {
    stack: Vec<&'a TemplateNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a TemplateNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

fn nodes_match(a: &TemplateNode, b: &TemplateNode, is_root: bool, registry: &ComponentRegistry) -> bool {
    if !is_root && (a.stable_id != b.stable_id || a.name != b.name) {
        return false;
    }

    if a.active != b.active || a.components.len() != b.components.len() {
        return false;
    }

    let mut types: Vec<&str> = a
        .components
        .iter()
        .map(|component| component.component_type.as_str())
        .collect();
    types.sort_unstable();
    types.dedup();

    for component_type in types {
        let a_group: Vec<_> = a
            .components
            .iter()
            .filter(|component| component.component_type == component_type)
            .collect();
        let b_group: Vec<_> = b
            .components
            .iter()
            .filter(|component| component.component_type == component_type)
            .collect();

        if a_group.len() != b_group.len() {
            return false;
        }

        for (a_component, b_component) in a_group.into_iter().zip(b_group) {
            if !components_match(a_component, b_component, is_root, registry) {
                return false;
            }
        }
    }

    if a.children.len() != b.children.len() {
        return false;
    }

    let mut a_children: Vec<&TemplateNode> = a.children.iter().collect();
    let mut b_children: Vec<&TemplateNode> = b.children.iter().collect();
    a_children.sort_by(|x, y| x.stable_id.cmp(&y.stable_id));
    b_children.sort_by(|x, y| x.stable_id.cmp(&y.stable_id));

    a_children
        .into_iter()
        .zip(b_children)
        .all(|(a_child, b_child)| nodes_match(a_child, b_child, false, registry))
}

fn components_match(
    a: &ComponentTemplate,
    b: &ComponentTemplate,
    is_root: bool,
    registry: &ComponentRegistry,
) -> bool {
    if a.enabled != b.enabled || a.editor_only != b.editor_only {
        return false;
    }

    let component_type = a.component_type.as_str();
    let names: BTreeSet<&String> = a.properties.keys().chain(b.properties.keys()).collect();

    names.into_iter().all(|name| {
        if is_root && registry.is_placement(component_type, name) {
            return true;
        }

        // A missing property takes the type's default.
        match (a.properties.get(name), b.properties.get(name)) {
            (Some(a_value), Some(b_value)) => value_eq(a_value, b_value),
            (Some(value), None) | (None, Some(value)) => {
                registry.is_default(component_type, name, value)
            }
            (None, None) => true,
        }
    })
}

/// One component attached to a node.
///
/// The type is only a tag here; what it means is up to the component
/// registry and the runtime the template is instantiated into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentTemplate {
    #[serde(rename = "type")]
    pub component_type: String,

    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub editor_only: bool,

    /// All other properties of the component, weakly-typed. The names
    /// `enabled` and `editorOnly` are reserved for the two flags above.
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

impl ComponentTemplate {
    pub fn new(component_type: impl Into<String>) -> Self {
        Self {
            component_type: component_type.into(),
            enabled: true,
            editor_only: false,
            properties: BTreeMap::new(),
        }
    }

    pub fn property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn enabled(self, enabled: bool) -> Self {
        Self { enabled, ..self }
    }

    pub fn editor_only(self, editor_only: bool) -> Self {
        Self {
            editor_only,
            ..self
        }
    }

    /// Drops the properties the registry treats as placement for this
    /// component's type.
    pub fn strip_placement(&mut self, registry: &ComponentRegistry) {
        let placement = registry.placement_properties(&self.component_type);
        self.properties.retain(|name, _| !placement.contains(name));
    }
}

/// A template document as stored on disk.
///
/// When `source_prefab_path` is set this document is a variant: `root` is not
/// the real content, which is the resolved parent template patched by
/// `variant_overrides`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrefabAsset {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_prefab_path: Option<String>,

    pub root: TemplateNode,

    #[serde(default, skip_serializing_if = "OverridePatch::is_empty")]
    pub variant_overrides: OverridePatch,
}

impl PrefabAsset {
    pub fn new(name: impl Into<String>, root: TemplateNode) -> Self {
        Self {
            name: name.into(),
            source_prefab_path: None,
            root,
            variant_overrides: OverridePatch::default(),
        }
    }

    /// Creates a variant document of the template at `source_prefab_path`.
    pub fn variant(
        name: impl Into<String>,
        source_prefab_path: impl Into<String>,
        root: TemplateNode,
        variant_overrides: OverridePatch,
    ) -> Self {
        Self {
            name: name.into(),
            source_prefab_path: Some(source_prefab_path.into()),
            root,
            variant_overrides,
        }
    }

    pub fn is_variant(&self) -> bool {
        self.source_prefab_path.is_some()
    }
}
