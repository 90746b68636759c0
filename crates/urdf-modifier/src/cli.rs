//! Command-line arguments

use std::path::PathBuf;

use clap::Parser;
use urdf_modifier_core::{OutputFormat, StlUnit};

/// Recalculate URDF link inertias from their mesh files
#[derive(Parser, Debug, Clone)]
#[command(name = "urdf-modifier", version, about)]
pub struct BatchArgs {
    /// URDF file to process
    pub urdf_file: PathBuf,

    /// Directory holding `<link name>.<ext>` meshes (defaults to the current directory)
    pub mesh_dir: Option<PathBuf>,

    /// RON config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Mesh file extension
    #[arg(long = "mesh-ext", value_name = "EXT")]
    pub mesh_ext: Option<String>,

    /// Length unit of the mesh files
    #[arg(short, long)]
    pub unit: Option<StlUnit>,

    /// Rewrite visual mesh URIs from package:// to file://
    #[arg(long)]
    pub relink_meshes: bool,

    /// Strip `_continuous` from joint names
    #[arg(long)]
    pub remove_continuous: bool,

    /// Replace inertial blocks with `<inertial auto="true"/>` instead of recalculating them
    #[arg(long)]
    pub auto_inertia: bool,

    /// Output path (defaults to the input path with `+out.urdf` appended)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Print the inertial values of a single mesh
#[derive(Parser, Debug, Clone)]
#[command(name = "urdf-inertia", version, about)]
pub struct ManualArgs {
    /// Mesh file (STL or OBJ)
    pub stl_file: PathBuf,

    /// Mass in kilograms
    pub mass: f64,

    /// Output markup
    #[arg(default_value_t = OutputFormat::Urdf)]
    pub format: OutputFormat,

    /// Length unit of the mesh file
    #[arg(short, long, default_value_t = StlUnit::Meters)]
    pub unit: StlUnit,
}
