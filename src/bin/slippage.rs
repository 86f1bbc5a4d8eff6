// Liquidation Slippage - CLI
// Single entry point for CEX and AMM slippage reports

use clap::{Parser, Subcommand};
use tracing::{error, info, warn, Level};
use liquidation_slippage::{Config, SlippageError};

// Load command modules from cli directory
#[path = "../cli/amm_commands.rs"]
mod amm_commands;
#[path = "../cli/cex_commands.rs"]
mod cex_commands;

#[derive(Parser)]
#[command(name = "slippage")]
#[command(version = "0.1.0")]
#[command(about = "Estimate the cost of liquidating positions on exchanges and AMMs", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Order book depth replay report
    Cex {
        /// Exchanges to replay (comma-separated), overrides config
        #[arg(short, long, value_delimiter = ',')]
        exchanges: Option<Vec<String>>,

        /// Pairs to replay (comma-separated), overrides config
        #[arg(short, long, value_delimiter = ',')]
        pairs: Option<Vec<String>>,

        /// Day to replay (YYYY-MM-DD), overrides config
        #[arg(short, long)]
        date: Option<String>,

        /// Output directory, overrides config
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Constant-product AMM report
    Amm {
        /// Output directory, overrides config
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Both reports
    All {
        /// Output directory, overrides config
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging first (before full config load so we can see config errors)
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Config::from_file(&cli.config)
            .map(|c| c.log_level())
            .unwrap_or(Level::INFO)
    };
    tracing_subscriber::fmt().with_max_level(log_level).init();

    info!("🚀 Liquidation Slippage v0.1.0");
    info!("📁 Config: {}", cli.config);

    match cli.command {
        // Init doesn't require config (it creates it)
        Commands::Init { force } => {
            init_workspace(force, &cli.config)?;
        }

        Commands::Cex { exchanges, pairs, date, output } => {
            let config = load_config_or_exit(&cli.config);
            cex_commands::run_cex_report(exchanges, pairs, date, output, &config).await?;
        }

        Commands::Amm { output } => {
            let config = load_config_or_exit(&cli.config);
            amm_commands::run_amm_report(output, &config).await?;
        }

        Commands::All { output } => {
            let config = load_config_or_exit(&cli.config);
            cex_commands::run_cex_report(None, None, None, output.clone(), &config).await?;
            amm_commands::run_amm_report(output, &config).await?;
        }
    }

    info!("✅ Done");
    Ok(())
}

/// Load config or exit with helpful error message
fn load_config_or_exit(path: &str) -> Config {
    match Config::load_or_error(path) {
        Ok(config) => config,
        Err(e) => {
            error!("❌ Configuration Error");
            for line in SlippageError::from(e).user_message().lines() {
                error!("{}", line);
            }
            std::process::exit(1);
        }
    }
}

fn init_workspace(force: bool, config_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    use std::fs;

    info!("🔧 Initializing workspace...");

    if std::path::Path::new(config_path).exists() && !force {
        warn!("⚠️  {} already exists, skipping (use --force to overwrite)", config_path);
    } else {
        let default_config = include_str!("../../config.toml.example");
        fs::write(config_path, default_config)?;
        info!("📝 Created {}", config_path);
    }

    fs::create_dir_all("reports")?;

    info!("💡 Next steps:");
    info!("   1. Edit {} with your venues, pairs and pools", config_path);
    info!("   2. Run: slippage cex");
    info!("   3. Run: slippage amm");

    Ok(())
}
