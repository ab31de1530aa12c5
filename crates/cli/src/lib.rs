//! Shared plumbing for the IRIS binaries: catalog, settings and store selection.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use iris_config::{Settings, load_bodies, load_settings};
use iris_mission::MissionSimulator;
use iris_store::FileStore;
use serde::Serialize;
use tracing::debug;

const DEFAULT_SETTINGS: &str = "configs/settings.toml";

#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Settings file (TOML or YAML); defaults to configs/settings.toml when present
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Body catalog: a directory of TOML files or a YAML list
    #[arg(long, default_value = "configs/bodies")]
    pub bodies: PathBuf,

    /// Directory holding mission records (overrides the settings file)
    #[arg(long)]
    pub store: Option<PathBuf>,
}

impl CommonArgs {
    pub fn load_settings(&self) -> Result<Settings> {
        let settings = match &self.settings {
            Some(path) => load_settings(path)
                .with_context(|| format!("loading settings from {}", path.display()))?,
            None if Path::new(DEFAULT_SETTINGS).exists() => load_settings(DEFAULT_SETTINGS)
                .with_context(|| format!("loading settings from {DEFAULT_SETTINGS}"))?,
            None => {
                debug!("no settings file found, using defaults");
                Settings::default()
            }
        };
        Ok(settings.with_env_credentials())
    }

    /// Build a simulator over a file-backed store.
    pub fn simulator(&self) -> Result<MissionSimulator> {
        let settings = self.load_settings()?;
        let catalog = load_bodies(&self.bodies)
            .with_context(|| format!("loading body catalog from {}", self.bodies.display()))?;
        let directory = self
            .store
            .clone()
            .unwrap_or_else(|| settings.store.directory.clone());
        let store = FileStore::open(&directory)
            .with_context(|| format!("opening mission store at {}", directory.display()))?;
        Ok(MissionSimulator::with_catalog(settings, catalog, Arc::new(store)))
    }
}

/// Pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
