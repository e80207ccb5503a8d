//! Instancing, diffing and merging of prefab entity trees.
//!
//! A prefab is a tree of entities described by a template document. Each
//! placed copy of a prefab is stored as an [`OverridePatch`] against its
//! template instead of as a full copy, so that later changes to the template
//! show up in every instance.
//!
//! [`OverridePatch`]: template::OverridePatch

pub mod cli;
pub mod instance;
pub mod instantiate;
pub mod library;
pub mod registry;
pub mod runtime;
pub mod stable_id;
pub mod store;
pub mod template;
pub mod variant;

mod multimap;
mod value_eq;

pub use crate::{
    instance::PrefabInstanceData,
    instantiate::{InstantiateError, InstantiatedPrefab, Instantiator},
    library::PrefabLibrary,
    registry::{AccessError, ComponentRegistry, RegistryConfig},
    runtime::{InMemoryRuntime, RuntimeGraph},
    stable_id::StableId,
    store::{FsTemplateStore, InMemoryTemplateStore, StoreError, TemplateStore},
    template::{apply_overrides, compute_overrides, OverridePatch, PrefabAsset, TemplateNode},
    value_eq::value_eq,
};
