//! URDF Modifier command-line front end
//!
//! Shared by the `urdf-modifier` (batch) and `urdf-inertia` (manual) binaries.

pub mod cli;
pub mod commands;
pub mod logging;

pub use cli::{BatchArgs, ManualArgs};
pub use commands::{BatchSummary, run_batch, run_manual};
