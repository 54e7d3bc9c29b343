//! CLI subcommands.

pub mod config;
pub mod ratios;
pub mod sequences;
pub mod simulate;

use std::path::Path;

use anyhow::Context;
use lamb_config::ModuleConfig;

/// Load `path`, or the built-in defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<ModuleConfig> {
    match path {
        Some(path) => ModuleConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(ModuleConfig::default()),
    }
}
