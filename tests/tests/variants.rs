use libprefab::{
    apply_overrides, ComponentRegistry, FsTemplateStore, OverridePatch, PrefabAsset,
    PrefabLibrary, TemplateNode, TemplateStore,
};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

use crate::prefab_test::fixtures::{golden_turret, heavy_turret, turret};

#[test]
fn variant_resolves_to_patched_base() {
    let _ = env_logger::try_init();

    let dir = tempdir().unwrap();
    let mut store = FsTemplateStore::new(dir.path());
    store.save("Turrets/Turret.json", &turret()).unwrap();
    store
        .save("Turrets/Heavy.json", &heavy_turret("Turrets/Turret.json"))
        .unwrap();

    let registry = ComponentRegistry::new();
    let mut library = PrefabLibrary::new(store);

    let resolved = library.resolve("Turrets/Heavy.json", &registry).unwrap();

    let mut expected = turret().root;
    apply_overrides(&mut expected, &heavy_turret("").variant_overrides, &registry);

    assert_eq!(resolved.name, "Heavy Turret");
    assert_eq!(resolved.root, expected);
    assert_eq!(resolved.root.children[0].children[0].name, "Scope");
}

#[test]
fn chains_compose_in_order() {
    let dir = tempdir().unwrap();
    let mut store = FsTemplateStore::new(dir.path());
    store.save("Turret.json", &turret()).unwrap();
    store.save("Heavy.json", &heavy_turret("./Turret.json")).unwrap();
    store.save("Golden.json", &golden_turret("Heavy.json")).unwrap();

    let registry = ComponentRegistry::new();
    let mut library = PrefabLibrary::new(store);

    let resolved = library.resolve("Golden.json", &registry).unwrap();

    let mut expected = turret().root;
    apply_overrides(&mut expected, &heavy_turret("").variant_overrides, &registry);
    apply_overrides(&mut expected, &golden_turret("").variant_overrides, &registry);

    assert_eq!(resolved.root, expected);
    assert_eq!(resolved.root.children[0].name, "Golden Barrel");
    assert_eq!(
        resolved.root.children[0].components[0].properties["damage"],
        serde_json::json!(25)
    );

    // Resolving never changes what is cached for the documents of the chain.
    let heavy = library.load("Heavy.json").unwrap();
    assert_eq!(heavy.root, TemplateNode::new("heavy"));
}

#[test]
fn cyclic_chains_fail_to_resolve() {
    let _ = env_logger::try_init();

    let dir = tempdir().unwrap();
    let mut store = FsTemplateStore::new(dir.path());

    let a = PrefabAsset::variant("A", "B.json", TemplateNode::new("a"), OverridePatch::new());
    let b = PrefabAsset::variant("B", "sub/../A.json", TemplateNode::new("b"), OverridePatch::new());
    store.save("A.json", &a).unwrap();
    store.save("B.json", &b).unwrap();

    let registry = ComponentRegistry::new();
    let mut library = PrefabLibrary::new(store);

    assert!(library.resolve("A.json", &registry).is_none());
    assert!(library.resolve("B.json", &registry).is_none());
}

#[test]
fn malformed_documents_resolve_to_nothing() {
    let _ = env_logger::try_init();

    let dir = tempdir().unwrap();
    fs_err::write(dir.path().join("Broken.json"), "{ not json").unwrap();

    let mut store = FsTemplateStore::new(dir.path());
    store.save("Child.json", &heavy_turret("Broken.json")).unwrap();

    let registry = ComponentRegistry::new();
    let mut library = PrefabLibrary::new(store);

    assert!(library.load("Broken.json").is_none());
    assert!(library.resolve("Child.json", &registry).is_none());
}
