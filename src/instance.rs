//! What a scene records about one placed prefab.

use serde::{Deserialize, Serialize};

use crate::{
    instantiate::{InstantiateError, InstantiatedPrefab, Instantiator},
    library::PrefabLibrary,
    registry::ComponentRegistry,
    runtime::RuntimeGraph,
    stable_id::StableId,
    store::TemplateStore,
    template::{compute_overrides, OverridePatch, TemplateNode},
};

/// A placed instance of a prefab, stored as a reference to the prefab plus
/// the changes made to this one copy of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrefabInstanceData {
    pub prefab_path: String,

    /// Runtime identity of the instance's root entity. Reused when the scene
    /// is loaded again, so references to the instance keep working.
    pub root_id: StableId,

    #[serde(default, skip_serializing_if = "OverridePatch::is_empty")]
    pub overrides: OverridePatch,
}

impl PrefabInstanceData {
    pub fn new(prefab_path: impl Into<String>, root_id: StableId) -> Self {
        PrefabInstanceData {
            prefab_path: prefab_path.into(),
            root_id,
            overrides: OverridePatch::new(),
        }
    }

    /// Recomputes the overrides of this instance from its current state.
    ///
    /// `modified` must use template-scoped ids, see
    /// [`InstantiatedPrefab::to_template_ids`]. Returns `false` and leaves the
    /// overrides alone if the prefab can't be resolved.
    pub fn refresh<S: TemplateStore>(
        &mut self,
        library: &mut PrefabLibrary<S>,
        modified: &TemplateNode,
        registry: &ComponentRegistry,
    ) -> bool {
        let template = match library.resolve(&self.prefab_path, registry) {
            Some(template) => template,
            None => {
                log::warn!(
                    "Prefab {} of instance {} could not be resolved, keeping its overrides",
                    self.prefab_path,
                    self.root_id
                );
                return false;
            }
        };

        self.overrides = compute_overrides(&template.root, modified, registry);
        true
    }

    /// Brings the instance back to life under its recorded root identity.
    ///
    /// Returns `Ok(None)` if the prefab can't be resolved; a scene treats
    /// that as nothing to instantiate.
    pub fn instantiate<S: TemplateStore, R: RuntimeGraph>(
        &self,
        library: &mut PrefabLibrary<S>,
        instantiator: &Instantiator<'_>,
        runtime: &mut R,
        parent: Option<R::Entity>,
    ) -> Result<Option<InstantiatedPrefab<R::Entity>>, InstantiateError> {
        let template = match library.resolve(&self.prefab_path, instantiator.registry()) {
            Some(template) => template,
            None => {
                log::warn!(
                    "Prefab {} of instance {} could not be resolved, skipping it",
                    self.prefab_path,
                    self.root_id
                );
                return Ok(None);
            }
        };

        instantiator
            .instantiate(
                runtime,
                &template.root,
                Some(&self.overrides),
                Some(self.root_id.clone()),
                parent,
            )
            .map(Some)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use serde_json::json;

    use crate::{
        runtime::InMemoryRuntime,
        store::InMemoryTemplateStore,
        template::{ComponentTemplate, PrefabAsset},
    };

    fn library() -> PrefabLibrary<InMemoryTemplateStore> {
        let mut store = InMemoryTemplateStore::new();
        store
            .save(
                "Lamp.json",
                &PrefabAsset::new(
                    "Lamp",
                    TemplateNode::new("lamp")
                        .name("Lamp")
                        .child(
                            TemplateNode::new("bulb")
                                .name("Bulb")
                                .component(ComponentTemplate::new("Light").property("range", json!(5))),
                        ),
                ),
            )
            .unwrap();

        PrefabLibrary::new(store)
    }

    #[test]
    fn edit_refresh_and_reload() {
        let registry = ComponentRegistry::new();
        let instantiator = Instantiator::new(&registry);
        let mut library = library();

        // Place the lamp in a scene and edit it there.
        let mut scene = InMemoryRuntime::new();
        let mut record = PrefabInstanceData::new("Lamp.json", StableId::generate());
        let placed = record
            .instantiate(&mut library, &instantiator, &mut scene, None)
            .unwrap()
            .unwrap();

        let mut edited = placed.to_template_ids(&scene.extract(placed.root).unwrap());
        edited.children[0].components[0]
            .properties
            .insert("range".to_owned(), json!(12));

        assert!(record.refresh(&mut library, &edited, &registry));
        assert_eq!(record.overrides.property_overrides.len(), 1);

        // The record survives a save of the scene.
        let saved = serde_json::to_string(&record).unwrap();
        let record: PrefabInstanceData = serde_json::from_str(&saved).unwrap();

        let mut reloaded_scene = InMemoryRuntime::new();
        let reloaded = record
            .instantiate(&mut library, &instantiator, &mut reloaded_scene, None)
            .unwrap()
            .unwrap();

        assert_eq!(reloaded.root_id, record.root_id);

        let bulb = reloaded_scene.children(reloaded.root)[0];
        assert_eq!(
            reloaded_scene.entity(bulb).unwrap().components[0].properties["range"],
            json!(12)
        );
    }

    #[test]
    fn missing_prefab_instantiates_nothing() {
        let _ = env_logger::try_init();

        let registry = ComponentRegistry::new();
        let instantiator = Instantiator::new(&registry);
        let mut library = library();
        let mut scene = InMemoryRuntime::new();

        let mut record = PrefabInstanceData::new("Gone.json", "x".into());
        let result = record
            .instantiate(&mut library, &instantiator, &mut scene, None)
            .unwrap();

        assert!(result.is_none());
        assert!(scene.is_empty());
        assert!(!record.refresh(&mut library, &TemplateNode::new("x"), &registry));
    }
}
