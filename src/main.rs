use anyhow::Context;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use abstract_mesh::config::{CliArgs, InspectConfig, OutputFormat};
use abstract_mesh::inspect::Inspector;

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let config: InspectConfig = args.into();

    // Init tracing
    let filter = if config.verbose {
        EnvFilter::new("abstract_mesh=debug")
    } else {
        EnvFilter::new("abstract_mesh=info")
    };
    if config.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    // Configure rayon thread pool
    if let Some(threads) = config.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure rayon thread pool")?;
    }

    match Inspector::run(&config) {
        Ok(result) => {
            match config.format {
                OutputFormat::Text => print!("{}", result.summary),
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&result.summary)
                        .context("Failed to serialize summary")?
                ),
            }
            Ok(())
        }
        Err(e) => {
            error!(%e, "Inspection failed");
            Err(anyhow::anyhow!(e)).context("mesh-inspect failed")
        }
    }
}
