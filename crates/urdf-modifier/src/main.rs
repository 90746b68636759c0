//! Batch mode: recalculate every link inertia of a URDF

use clap::Parser;
use urdf_modifier::{BatchArgs, logging, run_batch};

fn main() -> anyhow::Result<()> {
    logging::init();

    let args = BatchArgs::parse();
    tracing::debug!("Arguments: {:?}", args);

    run_batch(&args)?;
    Ok(())
}
