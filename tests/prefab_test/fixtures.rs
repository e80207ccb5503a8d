use libprefab::{
    template::{AddedChild, ComponentTemplate, OverridePatch, PropertyOverride},
    PrefabAsset, TemplateNode,
};
use serde_json::json;

/// A base template with an internal reference from the root to a child.
pub fn turret() -> PrefabAsset {
    PrefabAsset::new(
        "Turret",
        TemplateNode::new("turret")
            .name("Turret")
            .component(ComponentTemplate::new("Transform").property("position", json!([0, 0, 0])))
            .component(
                ComponentTemplate::new("Aim")
                    .property("pivot", json!("barrel"))
                    .property("speed", json!(1.5)),
            )
            .child(
                TemplateNode::new("barrel")
                    .name("Barrel")
                    .component(ComponentTemplate::new("Gun").property("damage", json!(10))),
            ),
    )
}

/// A variant of [`turret`] stored at `parent`, adding a scope and making the
/// gun stronger.
pub fn heavy_turret(parent: &str) -> PrefabAsset {
    let patch = OverridePatch {
        property_overrides: vec![PropertyOverride {
            node_id: "barrel".into(),
            component_type: "Gun".to_owned(),
            component_index: 0,
            property_name: "damage".to_owned(),
            value: Some(json!(25)),
        }],
        added_children: vec![AddedChild {
            parent_node_id: "barrel".into(),
            child: TemplateNode::new("scope").name("Scope"),
        }],
        ..OverridePatch::new()
    };

    PrefabAsset::variant("Heavy Turret", parent, TemplateNode::new("heavy"), patch)
}

/// A variant of [`heavy_turret`] stored at `parent`, renaming the barrel.
pub fn golden_turret(parent: &str) -> PrefabAsset {
    let patch = OverridePatch {
        property_overrides: vec![PropertyOverride::entity_name("barrel".into(), "Golden Barrel")],
        ..OverridePatch::new()
    };

    PrefabAsset::variant("Golden Turret", parent, TemplateNode::new("golden"), patch)
}
