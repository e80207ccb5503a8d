use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;

use crate::{library::PrefabLibrary, registry::ComponentRegistry, store::FsTemplateStore};

use super::write_json;

/// Resolves a variant chain into one complete template document.
#[derive(Debug, Parser)]
pub struct ResolveCommand {
    /// Path of the document, relative to the template root.
    pub path: String,

    /// Directory that template paths are relative to. Defaults to the
    /// current directory.
    #[clap(long, default_value = ".")]
    pub root: PathBuf,

    /// Where to write the resolved document. Omit this to use stdout instead.
    #[clap(long, short)]
    pub output: Option<PathBuf>,
}

impl ResolveCommand {
    pub fn run(self, registry: &ComponentRegistry) -> anyhow::Result<()> {
        let mut library = PrefabLibrary::new(FsTemplateStore::new(&self.root));

        let resolved = match library.resolve(&self.path, registry) {
            Some(resolved) => resolved,
            None => bail!(
                "could not resolve {}; it is missing, malformed or part of a cyclic variant chain",
                self.path
            ),
        };

        write_json(self.output.as_deref(), &resolved)
    }
}
