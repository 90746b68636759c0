//! Manual mode: print the inertial values of a single mesh

use clap::Parser;
use urdf_modifier::{ManualArgs, logging, run_manual};

fn main() -> anyhow::Result<()> {
    logging::init();

    let args = ManualArgs::parse();
    println!("{}", run_manual(&args)?);
    Ok(())
}
