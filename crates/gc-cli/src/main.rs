use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gc_cli::commands::estimate;
use gc_cli::{Cli, Commands, Config};
use gc_watttime::{Client, ClientConfig};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    match &cli.command {
        Some(Commands::Estimate { input, pretty }) => {
            let config =
                Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
            tracing::debug!(?config, "loaded configuration");

            let intervals = estimate::load_intervals(input.as_deref())?;
            let client_config = ClientConfig {
                username: config.username,
                password: config.password,
                token: config.token,
                base_url: config.base_url,
            };

            let runtime =
                tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;
            runtime.block_on(async {
                let client = Client::authenticate(&client_config)
                    .await
                    .context("failed to authenticate with WattTime")?;
                estimate::run(&mut std::io::stdout(), &client, intervals, *pretty).await
            })?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
