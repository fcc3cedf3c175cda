use clap::Parser;
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use linear_advection::initialization;

/// Advect a scalar field on a periodic 1D grid with a first-order upwind scheme.
#[derive(Parser)]
#[command(name = "linear-advection")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "1D periodic linear advection solver", long_about = None)]
struct Cli {
    /// Configuration file (JSON)
    #[arg(short, long, default_value = "inputs/config.json")]
    file: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut params = initialization::initialize_params_by_file(&cli.file)?;
    let mut solver = initialization::initialize_solver(&mut params)?;
    let summary = solver.solve()?;
    info!(
        "program complete: {} iterations, t = {:e}, final output step {}, {} snapshots",
        summary.iterations, summary.final_time, summary.final_step, summary.snapshots
    );
    Ok(())
}
