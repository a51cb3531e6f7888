//! Loading documents named on the command line.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use rail_fleet::{FieldDocument, FleetConfig};
use rail_motion::Locomotive;
use tracing::debug;

/// A `name=path` argument.
#[derive(Clone, Debug, PartialEq)]
pub struct NamedPath {
    pub name: String,
    pub path: PathBuf,
}

/// clap value parser for `name=path`.
pub fn parse_named_path(arg: &str) -> Result<NamedPath> {
    let Some((name, path)) = arg.split_once('=') else {
        bail!("expected NAME=PATH, got `{arg}`");
    };
    if name.is_empty() || path.is_empty() {
        bail!("expected NAME=PATH, got `{arg}`");
    }
    Ok(NamedPath {
        name: name.to_string(),
        path: PathBuf::from(path),
    })
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

pub fn load_field(path: &Path) -> Result<FieldDocument> {
    FieldDocument::from_json(&read(path)?).with_context(|| format!("Invalid field document {}", path.display()))
}

pub fn load_config(path: Option<&Path>) -> Result<FleetConfig> {
    let Some(path) = path else {
        return Ok(FleetConfig::default());
    };
    serde_json::from_str(&read(path)?).with_context(|| format!("Invalid config {}", path.display()))
}

/// Route CSV text keyed by `<lineid>_<route>`.
pub fn load_routes(routes: &[NamedPath]) -> Result<HashMap<String, String>> {
    routes
        .iter()
        .map(|route| {
            let csv = read(&route.path)?;
            debug!(key = %route.name, bytes = csv.len(), "Loaded route");
            Ok((route.name.clone(), csv))
        })
        .collect()
}

pub fn load_catalog(locomotives: &[NamedPath]) -> Result<HashMap<String, Locomotive>> {
    locomotives
        .iter()
        .map(|locomotive| {
            let definition = Locomotive::from_json(&read(&locomotive.path)?)
                .with_context(|| format!("Invalid locomotive {}", locomotive.path.display()))?;
            Ok((locomotive.name.clone(), definition))
        })
        .collect()
}
