//! Knowledge about concrete component types: their default property values,
//! how to set a single property in a type-checked way, and which properties
//! describe placement rather than content.
//!
//! Component types are registered once at startup. The diff engine asks the
//! registry for defaults, the merge engine for placement rules and the
//! instantiator for typed property assignment.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{runtime::RuntimeComponent, template::ComponentTemplate, value_eq::value_eq};

/// Component type whose properties are placement by default.
pub const TRANSFORM_COMPONENT: &str = "Transform";

/// Properties of [`TRANSFORM_COMPONENT`] that are placement by default.
pub const PLACEMENT_PROPERTIES: &[&str] = &["position", "rotation", "scale"];

type PropertySetter =
    Box<dyn Fn(&mut BTreeMap<String, Value>, &str, &Value) -> Result<(), AccessError> + Send + Sync>;

struct ComponentDescriptor {
    /// Property values of a default-constructed instance of the type.
    defaults: BTreeMap<String, Value>,

    /// Typed assignment. Types registered only through a defaults table
    /// accept any value.
    setter: Option<PropertySetter>,
}

/// Registry of component types known to the embedding application.
pub struct ComponentRegistry {
    components: HashMap<String, ComponentDescriptor>,
    placement: HashMap<String, Vec<String>>,
}

impl ComponentRegistry {
    /// Creates a registry with no component types and the default placement
    /// rule for [`TRANSFORM_COMPONENT`].
    pub fn new() -> Self {
        let mut placement = HashMap::new();
        placement.insert(
            TRANSFORM_COMPONENT.to_owned(),
            PLACEMENT_PROPERTIES.iter().map(|name| name.to_string()).collect(),
        );

        ComponentRegistry {
            components: HashMap::new(),
            placement,
        }
    }

    /// Registers a concrete component type under `type_tag`.
    ///
    /// `T::default()` is constructed once here; its serialized fields become
    /// the type's default-value table.
    pub fn register<T>(&mut self, type_tag: impl Into<String>) -> Result<(), AccessError>
    where
        T: Serialize + DeserializeOwned + Default + 'static,
    {
        let type_tag = type_tag.into();
        let defaults = match serde_json::to_value(T::default())? {
            Value::Object(map) => map.into_iter().collect(),
            _ => return Err(AccessError::not_an_object(&type_tag)),
        };

        let tag = type_tag.clone();
        let setter: PropertySetter = Box::new(
            move |fields: &mut BTreeMap<String, Value>, name: &str, value: &Value| {
                if !fields.contains_key(name) {
                    return Err(AccessError::unknown_property(&tag, name));
                }

                let mut candidate: Map<String, Value> = fields
                    .iter()
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect();
                candidate.insert(name.to_owned(), value.clone());

                let typed: T = serde_json::from_value(Value::Object(candidate))
                    .map_err(|source| AccessError::invalid_value(source, &tag, name))?;

                match serde_json::to_value(typed)? {
                    Value::Object(map) => {
                        *fields = map.into_iter().collect();
                        Ok(())
                    }
                    _ => Err(AccessError::not_an_object(&tag)),
                }
            },
        );

        log::trace!("Registered component type {}", type_tag);
        self.components.insert(
            type_tag,
            ComponentDescriptor {
                defaults,
                setter: Some(setter),
            },
        );

        Ok(())
    }

    /// Registers a component type that is only known through its default
    /// values, without a concrete Rust type behind it.
    pub fn register_defaults(&mut self, type_tag: impl Into<String>, defaults: BTreeMap<String, Value>) {
        self.components.insert(
            type_tag.into(),
            ComponentDescriptor {
                defaults,
                setter: None,
            },
        );
    }

    /// Replaces the placement properties of `type_tag`. An empty list means
    /// the type carries no placement.
    pub fn set_placement(&mut self, type_tag: impl Into<String>, properties: Vec<String>) {
        let type_tag = type_tag.into();

        if properties.is_empty() {
            self.placement.remove(&type_tag);
        } else {
            self.placement.insert(type_tag, properties);
        }
    }

    pub fn is_known(&self, type_tag: &str) -> bool {
        self.components.contains_key(type_tag)
    }

    /// The value `property` has on a default-constructed `type_tag`, if the
    /// type is known and has such a property.
    pub fn default_value(&self, type_tag: &str, property: &str) -> Option<&Value> {
        self.components.get(type_tag)?.defaults.get(property)
    }

    /// Whether `value` is what a default-constructed `type_tag` holds for
    /// `property`. Unknown types and properties have no defaults.
    pub fn is_default(&self, type_tag: &str, property: &str, value: &Value) -> bool {
        match self.default_value(type_tag, property) {
            Some(default) => value_eq(default, value),
            None => false,
        }
    }

    /// Properties of `type_tag` that describe where an instance is placed
    /// rather than what it contains.
    pub fn placement_properties(&self, type_tag: &str) -> &[String] {
        self.placement
            .get(type_tag)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_placement(&self, type_tag: &str, property: &str) -> bool {
        self.placement_properties(type_tag)
            .iter()
            .any(|name| name == property)
    }

    /// Sets one property on the field set of a `type_tag` component, checked
    /// against the concrete type when one was registered.
    pub fn set_property(
        &self,
        type_tag: &str,
        fields: &mut BTreeMap<String, Value>,
        property: &str,
        value: &Value,
    ) -> Result<(), AccessError> {
        let descriptor = self
            .components
            .get(type_tag)
            .ok_or_else(|| AccessError::unknown_type(type_tag))?;

        match &descriptor.setter {
            Some(setter) => setter(fields, property, value),
            None => {
                fields.insert(property.to_owned(), value.clone());
                Ok(())
            }
        }
    }

    /// Turns template data into the property set handed to the runtime.
    ///
    /// Known types start from their defaults and take each template property
    /// through the typed setter; properties that can't be set are skipped.
    /// Unknown types keep their raw data untouched so it survives a re-save.
    pub fn materialize(&self, component: &ComponentTemplate) -> RuntimeComponent {
        let type_tag = component.component_type.as_str();

        let (properties, known) = match self.components.get(type_tag) {
            Some(descriptor) => {
                let mut fields = descriptor.defaults.clone();

                for (name, value) in &component.properties {
                    if let Err(err) = self.set_property(type_tag, &mut fields, name, value) {
                        log::warn!("Skipping property {}.{}: {}", type_tag, name, err);
                    }
                }

                (fields, true)
            }
            None => {
                log::warn!(
                    "Unknown component type {}, keeping its data without interpreting it",
                    type_tag
                );
                (component.properties.clone(), false)
            }
        };

        RuntimeComponent {
            component_type: component.component_type.clone(),
            enabled: component.enabled,
            editor_only: component.editor_only,
            properties,
            known,
        }
    }

    /// Builds a registry from a configuration document.
    pub fn from_config(config: RegistryConfig) -> Self {
        let mut registry = ComponentRegistry::new();

        for (type_tag, defaults) in config.component_defaults {
            registry.register_defaults(type_tag, defaults);
        }

        for (type_tag, properties) in config.placement {
            registry.set_placement(type_tag, properties);
        }

        registry
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        let mut types: Vec<&str> = self.components.keys().map(String::as_str).collect();
        types.sort_unstable();

        formatter
            .debug_struct("ComponentRegistry")
            .field("components", &types)
            .field("placement", &self.placement)
            .finish()
    }
}

/// Serialized form of a registry, for embedders that describe their
/// component types in data instead of code.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistryConfig {
    /// Default property values per component type.
    pub component_defaults: BTreeMap<String, BTreeMap<String, Value>>,

    /// Placement properties per component type, replacing the built-in rule
    /// for that type.
    pub placement: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("component type {component_type} is not registered")]
    UnknownType { component_type: String },

    #[error("component type {component_type} has no property named {property}")]
    UnknownProperty {
        component_type: String,
        property: String,
    },

    #[error("invalid value for {component_type}.{property}")]
    InvalidValue {
        source: serde_json::Error,
        component_type: String,
        property: String,
    },

    #[error("default value of component type {component_type} is not an object")]
    NotAnObject { component_type: String },

    #[error(transparent)]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl AccessError {
    pub(crate) fn unknown_type(component_type: &str) -> Self {
        Self::UnknownType {
            component_type: component_type.to_owned(),
        }
    }

    pub(crate) fn unknown_property(component_type: &str, property: &str) -> Self {
        Self::UnknownProperty {
            component_type: component_type.to_owned(),
            property: property.to_owned(),
        }
    }

    pub(crate) fn invalid_value(source: serde_json::Error, component_type: &str, property: &str) -> Self {
        Self::InvalidValue {
            source,
            component_type: component_type.to_owned(),
            property: property.to_owned(),
        }
    }

    pub(crate) fn not_an_object(component_type: &str) -> Self {
        Self::NotAnObject {
            component_type: component_type.to_owned(),
        }
    }
}
