//! Perch CLI
//!
//! Replay scripted AR placement sessions and check session configs.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use perch_session::SessionConfig;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod script;
mod simulate;

use script::Script;

#[derive(Parser)]
#[command(name = "perch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Perch AR placement tools", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scripted session against the scripted XR platform
    Simulate {
        /// Script file (TOML)
        script: PathBuf,

        /// Session config; defaults are used when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse and validate a session config
    Check {
        /// Config file (TOML)
        config: PathBuf,
    },

    /// Print the default session config
    Defaults,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Simulate {
            script,
            config,
            json,
        } => cmd_simulate(&script, config.as_deref(), json),

        Commands::Check { config } => cmd_check(&config),

        Commands::Defaults => cmd_defaults(),
    }
}

fn load_config(path: Option<&Path>) -> Result<SessionConfig> {
    match path {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(SessionConfig::default()),
    }
}

fn cmd_simulate(script_path: &Path, config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let script = Script::load(script_path)?;
    let base_dir = script_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    info!(
        "Simulating {} ({} frames)",
        script_path.display(),
        script.frames.len()
    );

    let summary = simulate::run(&script, config, &base_dir)?;

    if json {
        let out = serde_json::to_string_pretty(&summary).context("Failed to encode summary")?;
        println!("{}", out);
    } else {
        summary.print();
    }

    Ok(())
}

fn cmd_check(path: &Path) -> Result<()> {
    let config = load_config(Some(path))?;

    info!("Config {} is valid", path.display());
    println!("mode:            {}", config.mode);
    println!("reference space: {}", config.reference_space);
    println!("placement:       {:?}", config.placement);
    println!("surface filter:  {:?}", config.surface_filter);
    println!("orientation:     {:?}", config.orientation);
    match &config.template_url {
        Some(url) => println!("template:        {}", url),
        None => println!(
            "template:        placeholder cube ({} units)",
            config.placeholder_size
        ),
    }
    if let Some(entrance) = &config.entrance {
        println!(
            "entrance:        {} -> {} over {}ms ({})",
            entrance.from,
            entrance.to,
            entrance.duration_ms,
            entrance.easing.as_str()
        );
    }

    Ok(())
}

fn cmd_defaults() -> Result<()> {
    let toml = SessionConfig::default()
        .to_toml_string()
        .context("Failed to encode default config")?;
    print!("{}", toml);
    Ok(())
}
