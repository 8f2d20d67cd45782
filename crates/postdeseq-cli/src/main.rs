//! postdeseq: post-processing of DESeq2 result tables.
//! Entry point for the command-line binary.

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use postdeseq_cli::{execute, Cli};

fn main() -> anyhow::Result<()> {
    // Initialise structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("postdeseq=info,info")),
        )
        .init();

    let cli = Cli::parse();
    info!("postdeseq {}", env!("CARGO_PKG_VERSION"));

    let config = cli.resolve_config()?;
    let summary = execute(&config)?;

    if summary.failed() > 0 {
        anyhow::bail!(
            "{} of {} tables failed; see {}",
            summary.failed(),
            summary.tables.len(),
            config.output.dir.display()
        );
    }
    Ok(())
}
