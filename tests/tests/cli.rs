use libprefab::{OverridePatch, PrefabAsset, TemplateNode};
use serde_json::{json, Value};
use tempfile::tempdir;

use crate::prefab_test::{
    fixtures::{heavy_turret, turret},
    io_util::{run_prefab, run_prefab_failing, write_json},
};

#[test]
fn diff_then_apply() {
    let _ = env_logger::try_init();

    let dir = tempdir().unwrap();

    let source = turret();
    let mut modified = source.clone();
    modified.root.children[0].name = "Long Barrel".to_owned();
    modified.root.children[0].components[0]
        .properties
        .insert("damage".to_owned(), json!(12));

    write_json(dir.path(), "source.json", &source);
    write_json(dir.path(), "modified.json", &modified);

    run_prefab(
        dir.path(),
        &["diff", "source.json", "modified.json", "--output", "patch.json"],
    );

    let patch: OverridePatch =
        serde_json::from_slice(&fs_err::read(dir.path().join("patch.json")).unwrap()).unwrap();
    assert_eq!(patch.property_overrides.len(), 2);

    let output = run_prefab(dir.path(), &["apply", "source.json", "patch.json"]);
    let applied: PrefabAsset = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(applied, modified);
}

#[test]
fn resolve_variant_chain() {
    let dir = tempdir().unwrap();

    write_json(dir.path(), "prefabs/Turret.json", &turret());
    write_json(
        dir.path(),
        "prefabs/Heavy.json",
        &heavy_turret("prefabs/Turret.json"),
    );

    let output = run_prefab(dir.path(), &["resolve", "prefabs/Heavy.json"]);
    let resolved: PrefabAsset = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(resolved.name, "Heavy Turret");
    assert_eq!(resolved.root.stable_id.as_str(), "turret");
    assert_eq!(resolved.root.children[0].children[0].name, "Scope");
}

#[test]
fn resolve_reports_cycles() {
    let dir = tempdir().unwrap();

    write_json(
        dir.path(),
        "A.json",
        &PrefabAsset::variant("A", "B.json", TemplateNode::new("a"), OverridePatch::new()),
    );
    write_json(
        dir.path(),
        "B.json",
        &PrefabAsset::variant("B", "A.json", TemplateNode::new("b"), OverridePatch::new()),
    );

    let output = run_prefab_failing(dir.path(), &["resolve", "A.json"]);
    assert!(output.stdout.is_empty());
}

#[test]
fn instantiate_with_root_id() {
    let dir = tempdir().unwrap();
    write_json(dir.path(), "Turret.json", &turret());

    let output = run_prefab(
        dir.path(),
        &["instantiate", "Turret.json", "--root-id", "placed-turret"],
    );
    let tree: TemplateNode = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(tree.stable_id.as_str(), "placed-turret");

    let barrel_id = tree.children[0].stable_id.as_str();
    assert_ne!(barrel_id, "barrel");
    assert_eq!(
        tree.components[1].properties["pivot"],
        Value::String(barrel_id.to_owned())
    );
}
