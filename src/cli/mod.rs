//! Defines the prefab CLI through clap types.

mod apply;
mod diff;
mod instantiate;
mod resolve;

use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use thiserror::Error;

use crate::{
    registry::{ComponentRegistry, RegistryConfig},
    template::PrefabAsset,
};

pub use self::apply::ApplyCommand;
pub use self::diff::DiffCommand;
pub use self::instantiate::InstantiateCommand;
pub use self::resolve::ResolveCommand;

/// Command line options that the prefab tool accepts, defined using the clap
/// crate.
#[derive(Debug, Parser)]
#[clap(name = "prefab", version, about)]
pub struct Options {
    #[clap(flatten)]
    pub global: GlobalOptions,

    /// Subcommand to run in this invocation.
    #[clap(subcommand)]
    pub subcommand: Subcommand,
}

impl Options {
    pub fn run(self) -> anyhow::Result<()> {
        let registry = self.global.load_registry()?;

        match self.subcommand {
            Subcommand::Diff(subcommand) => subcommand.run(&registry),
            Subcommand::Apply(subcommand) => subcommand.run(&registry),
            Subcommand::Resolve(subcommand) => subcommand.run(&registry),
            Subcommand::Instantiate(subcommand) => subcommand.run(&registry),
        }
    }
}

#[derive(Debug, Parser)]
pub struct GlobalOptions {
    /// Sets verbosity level. Can be specified multiple times.
    #[clap(long("verbose"), short, global(true), parse(from_occurrences))]
    pub verbosity: u8,

    /// Set color behavior. Valid values are auto, always, and never.
    #[clap(long("color"), global(true), default_value("auto"))]
    pub color: ColorChoice,

    /// JSON file describing component defaults and placement properties.
    #[clap(long("registry"), global(true))]
    pub registry: Option<PathBuf>,
}

impl GlobalOptions {
    pub fn load_registry(&self) -> anyhow::Result<ComponentRegistry> {
        let path = match &self.registry {
            Some(path) => path,
            None => return Ok(ComponentRegistry::new()),
        };

        let contents = fs_err::read(path)?;
        let config: RegistryConfig = serde_json::from_slice(&contents)
            .with_context(|| format!("malformed registry file {}", path.display()))?;

        let registry = ComponentRegistry::from_config(config);
        log::debug!("Loaded {:?}", registry);

        Ok(registry)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl FromStr for ColorChoice {
    type Err = ColorChoiceParseError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        match source {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            _ => Err(ColorChoiceParseError {
                attempted: source.to_owned(),
            }),
        }
    }
}

impl From<ColorChoice> for env_logger::WriteStyle {
    fn from(value: ColorChoice) -> Self {
        match value {
            ColorChoice::Auto => env_logger::WriteStyle::Auto,
            ColorChoice::Always => env_logger::WriteStyle::Always,
            ColorChoice::Never => env_logger::WriteStyle::Never,
        }
    }
}

#[derive(Debug, Error)]
#[error("Invalid color choice '{attempted}'. Valid values are: auto, always, never")]
pub struct ColorChoiceParseError {
    attempted: String,
}

#[derive(Debug, Parser)]
pub enum Subcommand {
    Diff(DiffCommand),
    Apply(ApplyCommand),
    Resolve(ResolveCommand),
    Instantiate(InstantiateCommand),
}

/// Reads a template document from a file, outside of any store.
pub(super) fn read_document(path: &Path) -> anyhow::Result<PrefabAsset> {
    let contents = fs_err::read(path)?;
    let mut asset: PrefabAsset = serde_json::from_slice(&contents)
        .with_context(|| format!("malformed template document {}", path.display()))?;

    asset.root.ensure_unique_ids();
    Ok(asset)
}

/// Writes `value` as pretty JSON to `output`, or to stdout if there's no
/// output path.
pub(super) fn write_json<T: Serialize>(output: Option<&Path>, value: &T) -> anyhow::Result<()> {
    let mut encoded = serde_json::to_vec_pretty(value)?;
    encoded.push(b'\n');

    match output {
        Some(path) => {
            fs_err::write(path, encoded)?;

            let filename = path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or("<invalid utf-8>");
            log::info!("Wrote {}", filename);
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(&encoded)?;
            handle.flush()?;
        }
    }

    Ok(())
}
