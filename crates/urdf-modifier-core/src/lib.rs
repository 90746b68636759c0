//! URDF Modifier Core
//!
//! This crate contains the building blocks of the URDF modifier:
//! - Document: byte-preserving URDF/SDF XML tree
//! - Mesh loading: STL and OBJ into an indexed triangle mesh
//! - Measure: mesh clean-up, convex-hull fallback, mass properties
//! - Inertia: tensor scaling and the per-mesh inertial record
//! - Inertial: batch override of link inertial tags
//! - Transform: mesh relinking, joint renaming, auto-inertia markers
//! - Report: manual-mode URDF/SDF output

pub mod config;
pub mod document;
pub mod format;
pub mod inertia;
pub mod inertial;
pub mod measure;
pub mod mesh;
pub mod report;
pub mod stl;
pub mod transform;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::*;
pub use document::*;
pub use inertia::*;
pub use inertial::*;
pub use measure::*;
pub use mesh::*;
pub use report::*;
pub use stl::*;
pub use transform::*;
