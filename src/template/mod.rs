//! This module defines the prefab template subsystem.
//!
//! A template is a plain tree of nodes, each carrying typed components. Every
//! instance of a template is described by the template plus an override patch
//! instead of a full copy of the tree. This module provides the tree types, a
//! method to compute the minimal patch between a template and a modified copy
//! of it, and a method that applies those patches.
//!
//! Computing a patch and applying it are inverses of each other: applying the
//! patch computed between a source and an instance onto a fresh clone of the
//! source reproduces the instance. Two parts of the root are never part of a
//! patch: its name and its placement, which belong to the scene that places
//! the instance rather than to the template.

mod index;
mod node;
mod patch;
mod patch_apply;
mod patch_compute;

#[cfg(test)]
mod tests;

pub use index::NodeIndex;
pub use node::{ComponentTemplate, PrefabAsset, TemplateNode};
pub use patch::*;
pub use patch_apply::apply_overrides;
pub use patch_compute::compute_overrides;
