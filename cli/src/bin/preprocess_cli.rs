use clap::{Parser, Subcommand};
use cli::{load_config, write_default_config};
use color_eyre::eyre::Result;
use preprocessing::{Pipeline, RunSummary};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the preprocessing pipeline using an existing configuration file
    Process {
        /// Path to the JSON or TOML configuration file
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Write a default configuration skeleton for hand editing
    GenerateConfig {
        /// Path to save the generated JSON configuration
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Process { config } => {
            let config = load_config(config)?;
            info!("Configuration: {:?}", config);
            let pipeline = Pipeline::new(config)?;
            match pipeline.run()? {
                RunSummary::Preprocessed { groups, splits } => {
                    info!("Processed {groups} sample groups");
                    for split in &splits {
                        info!(
                            "{}: {} groups, {} samples retained, {} dropped -> {}",
                            split.kind,
                            split.groups,
                            split.retained,
                            split.dropped,
                            split.manifest.display()
                        );
                    }
                }
                RunSummary::Renamed { files } => {
                    info!("Renamed {files} real capture files");
                }
            }
        }
        Commands::GenerateConfig { output } => {
            write_default_config(output)?;
            info!("Configuration skeleton saved to: {}", output.display());
        }
    }

    Ok(())
}
