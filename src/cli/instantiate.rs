use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;

use crate::{
    instantiate::Instantiator,
    library::PrefabLibrary,
    registry::ComponentRegistry,
    runtime::InMemoryRuntime,
    stable_id::StableId,
    store::FsTemplateStore,
    template::OverridePatch,
};

use super::write_json;

/// Instantiates a template and prints the resulting entity tree.
///
/// The printed tree carries the identities the instance was given, which
/// makes it easy to check how references inside the template were remapped.
#[derive(Debug, Parser)]
pub struct InstantiateCommand {
    /// Path of the document, relative to the template root.
    pub path: String,

    /// Directory that template paths are relative to. Defaults to the
    /// current directory.
    #[clap(long, default_value = ".")]
    pub root: PathBuf,

    /// Per-instance overrides to apply, as written by `prefab diff`.
    #[clap(long)]
    pub overrides: Option<PathBuf>,

    /// Identity to give the root entity instead of a fresh one.
    #[clap(long)]
    pub root_id: Option<String>,

    /// Where to write the entity tree. Omit this to use stdout instead.
    #[clap(long, short)]
    pub output: Option<PathBuf>,
}

impl InstantiateCommand {
    pub fn run(self, registry: &ComponentRegistry) -> anyhow::Result<()> {
        let mut library = PrefabLibrary::new(FsTemplateStore::new(&self.root));

        let template = match library.resolve(&self.path, registry) {
            Some(template) => template,
            None => bail!("could not resolve {}", self.path),
        };

        let overrides = match &self.overrides {
            Some(path) => {
                let contents = fs_err::read(path)?;
                let patch: OverridePatch = serde_json::from_slice(&contents)
                    .with_context(|| format!("malformed patch {}", path.display()))?;
                Some(patch)
            }
            None => None,
        };

        let mut runtime = InMemoryRuntime::new();
        let instantiator = Instantiator::new(registry);
        let instance = instantiator.instantiate(
            &mut runtime,
            &template.root,
            overrides.as_ref(),
            self.root_id.map(StableId::from),
            None,
        )?;

        let tree = runtime
            .extract(instance.root)
            .context("instantiated root entity is missing from the runtime")?;

        write_json(self.output.as_deref(), &tree)
    }
}
