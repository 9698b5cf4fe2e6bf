/// stlview - load STL files and report vertex and face counts
///
/// Files are decoded one after another. A file that fails to load is
/// reported with zero counts and does not stop the remaining files.

use anyhow::{bail, Result};
use clap::Parser;
use std::io::stdout;
use std::path::PathBuf;
use stlview_cli::{log_filter, write_status, LoadOutcome};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stlview")]
#[command(about = "Decode STL files into indexed meshes and report their size")]
#[command(version)]
struct Args {
    /// STL files to load
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Exit with an error if any file fails to load
    #[arg(long)]
    fail_on_error: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(args.verbose, rust_log.as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let mut stdout = stdout();
    let mut failed = 0;
    for path in &args.files {
        let outcome = LoadOutcome::load(path);
        if outcome.is_failure() {
            failed += 1;
        }
        write_status(&mut stdout, &outcome)?;
    }

    if args.fail_on_error && failed > 0 {
        bail!("{} of {} files failed to load", failed, args.files.len());
    }
    Ok(())
}
