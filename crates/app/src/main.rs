//! Command-line entry point: reconcile a folder of feed files and write
//! the report artifacts into a timestamped run folder.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod run;

#[derive(Parser, Debug)]
#[command(name = "trimatch", version, about = "Three-way transaction reconciliation")]
struct Cli {
    /// Folder containing the bank, ledger and gateway feed files.
    input: PathBuf,

    /// Client name used in report headings and the run folder.
    #[arg(long, default_value = "client")]
    client: String,

    /// TOML config file with [recon] and [email] sections.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Root folder for run output. Defaults to ./output, or the config's
    /// output_dir when set.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Email the finished report using the configured SMTP account.
    #[arg(long)]
    email: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let options = run::RunOptions {
        input: cli.input,
        client: cli.client,
        config: cli.config,
        output: cli.output,
        email: cli.email,
    };
    let outcome = run::execute(options).await?;
    println!(
        "Reconciled {} transactions ({:.2}% matched). Report written to {}",
        outcome.summary.total,
        outcome.summary.match_rate_pct,
        outcome.run_dir.display()
    );
    Ok(())
}
