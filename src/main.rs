//! tripwatch - Main entry point

use clap::Parser;
use tripwatch::cli::{cmd_monitor, cmd_serve, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tripwatch=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Monitor {
            date,
            data_dir,
            reports_dir,
            reference,
            sample_size,
            seed,
        } => {
            cmd_monitor(&date, data_dir, reports_dir, reference, sample_size, seed)?;
        }
        Commands::Serve {
            host,
            port,
            model,
            log,
        } => {
            cmd_serve(host, port, model, log).await?;
        }
    }

    Ok(())
}
