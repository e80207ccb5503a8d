use std::path::PathBuf;

use clap::Parser;

use crate::{registry::ComponentRegistry, template::compute_overrides};

use super::{read_document, write_json};

/// Computes the override patch between a template and a modified copy of it.
#[derive(Debug, Parser)]
pub struct DiffCommand {
    /// Path to the template document.
    pub source: PathBuf,

    /// Path to the modified document.
    pub instance: PathBuf,

    /// Where to write the patch. Omit this to use stdout instead.
    #[clap(long, short)]
    pub output: Option<PathBuf>,
}

impl DiffCommand {
    pub fn run(self, registry: &ComponentRegistry) -> anyhow::Result<()> {
        let source = read_document(&self.source)?;
        let instance = read_document(&self.instance)?;

        let patch = compute_overrides(&source.root, &instance.root, registry);
        log::info!("Found {} override(s)", patch.len());

        write_json(self.output.as_deref(), &patch)
    }
}
