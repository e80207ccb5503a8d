
use serde::{Deserialize, Serialize};

use crate::registry::ComponentRegistry;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Collider {
    radius: f32,
    is_trigger: bool,
}

impl Default for Collider {
    fn default() -> Self {
        Collider {
            radius: 0.5,
            is_trigger: false,
        }
    }
}

fn test_registry() -> ComponentRegistry {
    let mut registry = ComponentRegistry::new();
    registry.register::<Collider>("Collider").unwrap();
    registry
}
