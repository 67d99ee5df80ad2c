use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use barberboss_entitlements::{AccountSnapshot, Capability, Settings, Tier};

mod commands;

use commands::OutputFormat;

#[derive(Parser)]
#[command(name = "barberboss")]
#[command(about = "BarberBoss - plan entitlements and upgrade prompts")]
#[command(version)]
struct Cli {
    /// Plans config file (defaults to $BARBERBOSS_CONFIG or the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every plan with its limits and price
    Plans,
    /// Resolve entitlements for an account
    Check {
        /// Current plan (FREE, PRO, BUSINESS)
        #[arg(short, long)]
        tier: Tier,
        /// Services already in the catalog
        #[arg(short, long, default_value_t = 0, allow_hyphen_values = true)]
        services: i64,
        /// Photos already in the portfolio
        #[arg(short, long, default_value_t = 0, allow_hyphen_values = true)]
        photos: i64,
    },
    /// Find the cheapest plan that unlocks a capability
    Unlock {
        #[arg(short, long)]
        tier: Tier,
        /// e.g. financial-dashboard, ai-reports, more-services
        #[arg(short = 'C', long)]
        capability: Capability,
    },
    /// Load and validate the plans config
    Validate,
    /// Write the built-in plans to the config path
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let path = cli.config.clone().unwrap_or_else(Settings::config_path);
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    let load = || commands::load_resolver(&path);

    let output = match cli.command {
        Command::Plans => commands::render_plans(&load()?, format)?,
        Command::Check {
            tier,
            services,
            photos,
        } => {
            let snapshot = AccountSnapshot::new(tier, services, photos);
            commands::render_check(&load()?, &snapshot, format)?
        }
        Command::Unlock { tier, capability } => {
            commands::render_unlock(&load()?, tier, capability, format)?
        }
        Command::Validate => {
            load()?;
            "ok\n".to_string()
        }
        Command::InitConfig { force } => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            Settings::default()
                .save(&path)
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::info!("Wrote built-in plans to {}", path.display());
            format!("Wrote built-in plans to {}\n", path.display())
        }
    };
    print!("{output}");
    Ok(())
}
