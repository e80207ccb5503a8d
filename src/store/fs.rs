use std::{
    io,
    path::{Path, PathBuf},
};

use crate::template::PrefabAsset;

use super::{encode_document, normalize_path, parse_document, StoreError, TemplateStore};

/// Template store backed by JSON files below a root directory.
#[derive(Debug, Clone)]
pub struct FsTemplateStore {
    root: PathBuf,
}

impl FsTemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_path(&self, path: &str) -> Result<(String, PathBuf), StoreError> {
        let normalized = normalize_path(path);

        if normalized.starts_with('/') || normalized == ".." || normalized.starts_with("../") {
            return Err(StoreError::outside_root(normalized, &self.root));
        }

        let file_path = self.root.join(&normalized);
        Ok((normalized, file_path))
    }
}

impl TemplateStore for FsTemplateStore {
    fn load(&self, path: &str) -> Result<Option<PrefabAsset>, StoreError> {
        let (path, file_path) = self.file_path(path)?;

        let contents = match fs_err::read(&file_path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        log::trace!("Loaded template document {}", file_path.display());
        parse_document(&path, &contents).map(Some)
    }

    fn save(&mut self, path: &str, asset: &PrefabAsset) -> Result<(), StoreError> {
        let (path, file_path) = self.file_path(path)?;
        let encoded = encode_document(&path, asset)?;

        if let Some(parent) = file_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        fs_err::write(&file_path, encoded)?;
        log::trace!("Saved template document {}", file_path.display());

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use serde_json::json;
    use tempfile::tempdir;

    use crate::template::{ComponentTemplate, TemplateNode};

    #[test]
    fn save_then_load() {
        let dir = tempdir().unwrap();
        let mut store = FsTemplateStore::new(dir.path());

        let asset = PrefabAsset::new(
            "Turret",
            TemplateNode::new("root")
                .component(ComponentTemplate::new("Collider").property("radius", json!(1.5)))
                .child(TemplateNode::new("barrel").name("Barrel")),
        );

        store.save("Enemies/Turret.json", &asset).unwrap();
        assert!(dir.path().join("Enemies").join("Turret.json").is_file());

        let loaded = store.load("Enemies\\Turret.json").unwrap();
        assert_eq!(loaded, Some(asset));
    }

    #[test]
    fn missing_file_is_none() {
        let dir = tempdir().unwrap();
        let store = FsTemplateStore::new(dir.path());

        assert_eq!(store.load("Nothing.json").unwrap(), None);
    }

    #[test]
    fn rejects_paths_outside_root() {
        let dir = tempdir().unwrap();
        let store = FsTemplateStore::new(dir.path());

        let err = store.load("../Turret.json").unwrap_err();
        assert!(matches!(err, StoreError::OutsideRoot { .. }));
    }
}
