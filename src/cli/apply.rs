use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use crate::{
    registry::ComponentRegistry,
    template::{apply_overrides, OverridePatch},
};

use super::{read_document, write_json};

/// Applies an override patch to a template and prints the resulting document.
#[derive(Debug, Parser)]
pub struct ApplyCommand {
    /// Path to the template document.
    pub template: PathBuf,

    /// Path to the patch, as written by `prefab diff`.
    pub patch: PathBuf,

    /// Where to write the patched document. Omit this to use stdout instead.
    #[clap(long, short)]
    pub output: Option<PathBuf>,
}

impl ApplyCommand {
    pub fn run(self, registry: &ComponentRegistry) -> anyhow::Result<()> {
        let mut document = read_document(&self.template)?;

        let contents = fs_err::read(&self.patch)?;
        let patch: OverridePatch = serde_json::from_slice(&contents)
            .with_context(|| format!("malformed patch {}", self.patch.display()))?;

        apply_overrides(&mut document.root, &patch, registry);

        write_json(self.output.as_deref(), &document)
    }
}
