use std::collections::HashSet;

use libprefab::{
    compute_overrides, runtime::EntityHandle, ComponentRegistry, InMemoryRuntime, InMemoryTemplateStore, Instantiator,
    PrefabInstanceData, PrefabLibrary, StableId, TemplateStore,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::prefab_test::fixtures::{heavy_turret, turret};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Gun {
    damage: i32,
    fire_rate: f32,
}

impl Default for Gun {
    fn default() -> Self {
        Gun {
            damage: 5,
            fire_rate: 2.0,
        }
    }
}

fn setup() -> (PrefabLibrary<InMemoryTemplateStore>, ComponentRegistry) {
    let mut store = InMemoryTemplateStore::new();
    store.save("Turret.json", &turret()).unwrap();
    store.save("Heavy.json", &heavy_turret("Turret.json")).unwrap();

    let mut registry = ComponentRegistry::new();
    registry.register::<Gun>("Gun").unwrap();

    (PrefabLibrary::new(store), registry)
}

fn all_ids(runtime: &InMemoryRuntime, root: EntityHandle) -> HashSet<StableId> {
    runtime
        .descendants(root)
        .into_iter()
        .map(|handle| runtime.entity(handle).unwrap().id.clone())
        .collect()
}

#[test]
fn instantiations_never_share_identities() {
    let _ = env_logger::try_init();

    let (mut library, registry) = setup();
    let template = library.resolve("Heavy.json", &registry).unwrap();

    let instantiator = Instantiator::new(&registry);
    let mut runtime = InMemoryRuntime::new();

    let first = instantiator
        .instantiate(&mut runtime, &template.root, None, None, None)
        .unwrap();
    let second = instantiator
        .instantiate(&mut runtime, &template.root, None, None, None)
        .unwrap();

    let first_ids = all_ids(&runtime, first.root);
    let second_ids = all_ids(&runtime, second.root);

    assert_eq!(first_ids.len(), 3);
    assert_eq!(second_ids.len(), 3);
    assert!(first_ids.is_disjoint(&second_ids));

    for template_node in template.root.descendants() {
        assert!(!first_ids.contains(&template_node.stable_id));
    }
}

#[test]
fn internal_references_point_at_own_copy() {
    let (mut library, registry) = setup();
    let template = library.resolve("Turret.json", &registry).unwrap();

    let instantiator = Instantiator::new(&registry);
    let mut runtime = InMemoryRuntime::new();

    for _ in 0..2 {
        let instance = instantiator
            .instantiate(&mut runtime, &template.root, None, None, None)
            .unwrap();

        let root = runtime.entity(instance.root).unwrap();
        let aim = root
            .components
            .iter()
            .find(|component| component.component_type == "Aim")
            .unwrap();

        let pivot = aim.properties["pivot"].as_str().unwrap();
        let pivot_entity = runtime.lookup(pivot).unwrap();

        assert_eq!(runtime.entity(pivot_entity).unwrap().name, "Barrel");
        assert_eq!(runtime.entity(pivot_entity).unwrap().parent, Some(instance.root));
    }
}

#[test]
fn known_components_are_typed() {
    let (mut library, registry) = setup();
    let template = library.resolve("Heavy.json", &registry).unwrap();

    let instantiator = Instantiator::new(&registry);
    let mut runtime = InMemoryRuntime::new();
    let instance = instantiator
        .instantiate(&mut runtime, &template.root, None, None, None)
        .unwrap();

    let barrel = runtime.children(instance.root)[0];
    let gun = &runtime.entity(barrel).unwrap().components[0];

    assert!(gun.known);
    assert_eq!(gun.properties["damage"], json!(25));
    assert_eq!(gun.properties["fireRate"], json!(2.0));
}

#[test]
fn scene_round_trip_keeps_local_edits() {
    let (mut library, registry) = setup();
    let instantiator = Instantiator::new(&registry);

    let mut scene = InMemoryRuntime::new();
    let mut record = PrefabInstanceData::new("Heavy.json", "turret-in-scene".into());
    let placed = record
        .instantiate(&mut library, &instantiator, &mut scene, None)
        .unwrap()
        .unwrap();

    // Edit the live copy: remove the scope and spell out a default value.
    let mut edited = placed.to_template_ids(&scene.extract(placed.root).unwrap());
    edited.children[0].children.clear();
    edited.children[0].components[0]
        .properties
        .insert("fireRate".to_owned(), json!(2));

    assert!(record.refresh(&mut library, &edited, &registry));
    assert_eq!(record.overrides.removed_children, vec![StableId::from("scope")]);
    assert!(record.overrides.property_overrides.is_empty());

    let mut reloaded = InMemoryRuntime::new();
    let instance = record
        .instantiate(&mut library, &instantiator, &mut reloaded, None)
        .unwrap()
        .unwrap();

    assert_eq!(reloaded.lookup("turret-in-scene"), Some(instance.root));
    assert_eq!(reloaded.len(), 2);

    let template = library.resolve("Heavy.json", &registry).unwrap();
    let mapped = instance.to_template_ids(&reloaded.extract(instance.root).unwrap());
    let patch = compute_overrides(&template.root, &mapped, &registry);
    assert_eq!(patch, record.overrides);
}
