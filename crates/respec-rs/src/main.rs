//! Command-line front end for checking, merging and diffing ReSpec configs.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info};
use respec_rs::SpecConfig;
use respec_rs::config::LayeredConfig;
use std::path::{Path, PathBuf};

/// Command-line options for the config tool.
#[derive(Parser)]
#[command(name = "respec-config", version)]
#[command(about = "Validate, merge and diff ReSpec configuration records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a config, apply any overrides, and report whether it is valid.
    Check {
        /// Base config (JSON5, or a script assigning respecConfig)
        base: PathBuf,
        /// Override configs applied in order
        overrides: Vec<PathBuf>,
    },
    /// Print the merged, validated config.
    Merge {
        /// Base config
        base: PathBuf,
        /// Override configs applied in order
        #[arg(required = true)]
        overrides: Vec<PathBuf>,
        /// Output form
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Print top-level keys that differ between two configs.
    Diff {
        /// Earlier config
        before: PathBuf,
        /// Later config
        after: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    /// Pretty JSON
    Json,
    /// `var respecConfig = {...};`
    Script,
}

fn main() -> anyhow::Result<()> {
    respec_rs::init_logging();

    let cli = Cli::parse();
    match cli.command {
        Command::Check { base, overrides } => {
            let layered = load(&base, &overrides)?;
            println!("{}", summary(&layered));
        }
        Command::Merge {
            base,
            overrides,
            format,
        } => {
            let layered = load(&base, &overrides)?;
            let rendered = match format {
                OutputFormat::Json => layered.config.to_json_string(),
                OutputFormat::Script => layered.config.to_respec_script(),
            }
            .context("failed to render merged config")?;
            println!("{}", rendered.trim_end());
        }
        Command::Diff { before, after } => {
            let before = load_single(&before)?;
            let after = load_single(&after)?;
            let changes = before.diff(&after).context("failed to compare configs")?;
            if changes.is_empty() {
                println!("no differences");
            }
            for change in changes {
                println!("{change}");
            }
        }
    }
    Ok(())
}

fn load(base: &Path, overrides: &[PathBuf]) -> anyhow::Result<LayeredConfig> {
    info!(
        "loading config (base={}, overrides={})",
        base.display(),
        overrides.len()
    );
    let layered = SpecConfig::load_layered(base, overrides)
        .with_context(|| format!("failed to load config from {}", base.display()))?;
    for layer in &layered.layers {
        if let Some(reason) = &layer.disabled_reason {
            debug!("layer {:?} skipped: {reason}", layer.path);
        }
    }
    Ok(layered)
}

fn load_single(path: &Path) -> anyhow::Result<SpecConfig> {
    SpecConfig::load_from_path(path)
        .with_context(|| format!("failed to load config from {}", path.display()))
}

fn summary(layered: &LayeredConfig) -> String {
    let config = &layered.config;
    format!(
        "ok: group={} status={} xref={} editors={} citations={} layers={}",
        config.group,
        config.spec_status,
        config.xref.len(),
        config.editors.len(),
        config.local_biblio.len(),
        layered.layers.len()
    )
}
