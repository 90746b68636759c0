//! Recalculate link inertial tags from their meshes
//!
//! Each top-level link with an `<inertial>` block is matched to
//! `<mesh_dir>/<link name>.<ext>`. The mesh is measured at the link's mass and
//! the block's `origin@xyz` and `inertia@i..` attributes are overwritten.
//! Failures are link-scoped: they are logged, recorded in the report and the
//! run moves on to the next link.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::document::{Element, UrdfDocument};
use crate::format::format_sci;
use crate::inertia::{InertialValues, calc_inertia};
use crate::stl::StlUnit;

/// Digits after the decimal point in written attributes
pub const ATTRIBUTE_PRECISION: usize = 10;

/// Options for [`override_inertias`]
#[derive(Debug, Clone)]
pub struct OverrideOptions {
    /// Mesh file extension, without the dot
    pub mesh_extension: String,
    /// Length unit of the mesh files
    pub mesh_unit: StlUnit,
}

impl Default for OverrideOptions {
    fn default() -> Self {
        Self {
            mesh_extension: "stl".to_string(),
            mesh_unit: StlUnit::Meters,
        }
    }
}

/// What happened to one link
#[derive(Debug, Clone, PartialEq)]
pub enum LinkOutcome {
    /// Inertial attributes were rewritten
    Updated(InertialValues),
    /// No `<inertial>` tag, so no mass to work with
    NoInertial,
    /// `<inertial>` lacks a usable mass, origin or inertia element
    Incomplete { missing: &'static str },
    /// No mesh file at the expected path
    MeshNotFound { path: PathBuf },
    /// Loading or measuring the mesh failed
    Failed { reason: String },
}

impl LinkOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, LinkOutcome::Updated(_))
    }
}

/// Per-link results of a run, in document order
#[derive(Debug, Clone, Default)]
pub struct OverrideReport {
    pub links: Vec<(String, LinkOutcome)>,
}

impl OverrideReport {
    pub fn updated(&self) -> usize {
        self.links.iter().filter(|(_, o)| o.is_updated()).count()
    }

    /// Links skipped before any mesh was loaded
    pub fn skipped(&self) -> usize {
        self.links
            .iter()
            .filter(|(_, o)| {
                matches!(
                    o,
                    LinkOutcome::NoInertial
                        | LinkOutcome::Incomplete { .. }
                        | LinkOutcome::MeshNotFound { .. }
                )
            })
            .count()
    }

    pub fn failed(&self) -> usize {
        self.links
            .iter()
            .filter(|(_, o)| matches!(o, LinkOutcome::Failed { .. }))
            .count()
    }

    pub fn outcome(&self, link: &str) -> Option<&LinkOutcome> {
        self.links
            .iter()
            .find(|(name, _)| name == link)
            .map(|(_, outcome)| outcome)
    }
}

/// Expected mesh path of a link: `<mesh_dir>/<link_name>.<extension>`
pub fn resolve_mesh_path(mesh_dir: &Path, link_name: &str, extension: &str) -> PathBuf {
    mesh_dir.join(format!("{}.{}", link_name, extension))
}

/// Output path for a processed document: the input path with `suffix` appended
pub fn output_path(input: &Path, suffix: &str) -> PathBuf {
    let mut path = OsString::from(input.as_os_str());
    path.push(suffix);
    PathBuf::from(path)
}

/// Recalculate the inertial tags of every top-level link
pub fn override_inertias(
    doc: &mut UrdfDocument,
    mesh_dir: &Path,
    options: &OverrideOptions,
) -> OverrideReport {
    let mut report = OverrideReport::default();

    for link in doc.links_mut() {
        let name = link.attr("name").unwrap_or_default();
        let outcome = override_link(link, &name, mesh_dir, options);
        report.links.push((name, outcome));
    }

    tracing::debug!(
        "Inertia override finished: {} updated, {} skipped, {} failed",
        report.updated(),
        report.skipped(),
        report.failed()
    );
    report
}

fn override_link(
    link: &mut Element,
    name: &str,
    mesh_dir: &Path,
    options: &OverrideOptions,
) -> LinkOutcome {
    let Some(inertial) = link.child_mut("inertial") else {
        tracing::warn!("Skipping link: {}, no inertial tag found", name);
        return LinkOutcome::NoInertial;
    };

    tracing::info!("Calculating inertia of link: {}", name);

    let mass = match read_mass(inertial) {
        Ok(mass) => mass,
        Err(missing) => {
            tracing::warn!("Skipping link: {}, inertial has no usable {}", name, missing);
            return LinkOutcome::Incomplete { missing };
        }
    };
    for required in ["origin", "inertia"] {
        if inertial.child(required).is_none() {
            tracing::warn!("Skipping link: {}, inertial has no {} tag", name, required);
            return LinkOutcome::Incomplete { missing: required };
        }
    }

    let mesh_path = resolve_mesh_path(mesh_dir, name, &options.mesh_extension);
    if !mesh_path.is_file() {
        tracing::error!(
            "Could not find file of {} (expected {})",
            name,
            mesh_path.display()
        );
        return LinkOutcome::MeshNotFound { path: mesh_path };
    }

    let values = match calc_inertia(&mesh_path, mass, options.mesh_unit) {
        Ok(values) => values,
        Err(e) => {
            tracing::error!("Failed to calculate inertia of {}: {}", name, e);
            return LinkOutcome::Failed {
                reason: e.to_string(),
            };
        }
    };

    apply_values(inertial, name, &values);
    LinkOutcome::Updated(values)
}

fn read_mass(inertial: &Element) -> Result<f64, &'static str> {
    inertial
        .child("mass")
        .and_then(|mass| mass.attr("value"))
        .and_then(|value| value.trim().parse::<f64>().ok())
        .ok_or("mass")
}

/// Write the center of mass and inertia entries into an `<inertial>` block
///
/// Existing `origin@rpy` is left as it is.
pub fn apply_values(inertial: &mut Element, link_name: &str, values: &InertialValues) {
    if let Some(origin) = inertial.child_mut("origin") {
        if let Some(rpy) = origin.attr("rpy") {
            let rotated = rpy
                .split_whitespace()
                .any(|v| v.parse::<f64>().map(|v| v != 0.0).unwrap_or(true));
            if rotated {
                tracing::warn!(
                    "Link {} has inertial rpy \"{}\"; the tensor is written in the mesh frame",
                    link_name,
                    rpy
                );
            }
        }

        let [x, y, z] = values.center_of_mass();
        origin.set_attr("xyz", &format_xyz(x, y, z));
    }

    if let Some(inertia) = inertial.child_mut("inertia") {
        let [ixx, ixy, ixz, iyy, iyz, izz] = values.inertia.to_array();
        for (key, value) in [
            ("ixx", ixx),
            ("ixy", ixy),
            ("ixz", ixz),
            ("iyy", iyy),
            ("iyz", iyz),
            ("izz", izz),
        ] {
            inertia.set_attr(key, &format_sci(value, ATTRIBUTE_PRECISION));
        }
    }
}

fn format_xyz(x: f64, y: f64, z: f64) -> String {
    format!(
        "{} {} {}",
        format_sci(x, ATTRIBUTE_PRECISION),
        format_sci(y, ATTRIBUTE_PRECISION),
        format_sci(z, ATTRIBUTE_PRECISION)
    )
}
