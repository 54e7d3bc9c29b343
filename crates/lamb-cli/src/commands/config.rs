//! Config validation and dump.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

#[derive(Args)]
pub struct ConfigArgs {
    /// Config file to check (defaults are used when omitted)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the effective config to this file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    let config = super::load_config(args.config.as_deref())?;
    config.validate().context("config is invalid")?;

    print!("{}", config.to_toml()?);

    if let Some(path) = &args.output {
        config
            .save(path)
            .with_context(|| format!("saving config {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote config");
    }

    Ok(())
}
