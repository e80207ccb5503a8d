//! Loading and saving of template documents.
//!
//! Documents are addressed by slash-separated paths relative to some root,
//! like `Enemies/Turret.prefab.json`. Every path is normalized before use, so
//! `./Enemies\Turret.prefab.json` names the same document.

mod error;
mod fs;
mod in_memory;

pub use error::StoreError;
pub use fs::FsTemplateStore;
pub use in_memory::InMemoryTemplateStore;

use crate::template::PrefabAsset;

/// Somewhere template documents live.
///
/// Stores must keep stable ids and node order intact across a save and a
/// later load.
pub trait TemplateStore {
    /// Reads the document at `path`, returning `Ok(None)` if there is none.
    fn load(&self, path: &str) -> Result<Option<PrefabAsset>, StoreError>;

    fn save(&mut self, path: &str, asset: &PrefabAsset) -> Result<(), StoreError>;
}

/// Puts a template path into canonical form: forward slashes only, no empty
/// or `.` segments, and `..` segments collapsed where possible.
pub fn normalize_path(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let absolute = unified.starts_with('/');

    let mut segments: Vec<&str> = Vec::new();

    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                // There's nothing above the root of an absolute path.
                _ if absolute => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");

    if absolute {
        format!("/{}", joined)
    } else {
        joined
    }
}

fn parse_document(path: &str, contents: &[u8]) -> Result<PrefabAsset, StoreError> {
    serde_json::from_slice(contents).map_err(|source| StoreError::malformed_document(source, path))
}

fn encode_document(path: &str, asset: &PrefabAsset) -> Result<Vec<u8>, StoreError> {
    let mut encoded =
        serde_json::to_vec_pretty(asset).map_err(|source| StoreError::serialize(source, path))?;
    encoded.push(b'\n');

    Ok(encoded)
}
