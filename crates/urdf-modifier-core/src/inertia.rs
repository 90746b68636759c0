//! Inertia tensor calculations

use std::path::Path;

use glam::DMat3;
use serde::{Deserialize, Serialize};

use crate::measure::{GeometricMeasures, MeasureError, measure_mesh};
use crate::mesh::{MeshError, load_mesh};
use crate::stl::StlUnit;

/// Inertia tensor (symmetric 3x3 matrix)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InertiaMatrix {
    pub ixx: f64,
    pub ixy: f64,
    pub ixz: f64,
    pub iyy: f64,
    pub iyz: f64,
    pub izz: f64,
}

impl InertiaMatrix {
    /// Take the six unique entries of a tensor
    ///
    /// `ixy` is read from row 1/column 0, `ixz` from row 2/column 0 and `iyz`
    /// from row 1/column 2.
    pub fn from_tensor(tensor: &DMat3) -> Self {
        Self {
            ixx: tensor.col(0).x,
            ixy: tensor.col(0).y,
            ixz: tensor.col(0).z,
            iyy: tensor.col(1).y,
            iyz: tensor.col(2).y,
            izz: tensor.col(2).z,
        }
    }

    /// Multiply every entry by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            ixx: self.ixx * factor,
            ixy: self.ixy * factor,
            ixz: self.ixz * factor,
            iyy: self.iyy * factor,
            iyz: self.iyz * factor,
            izz: self.izz * factor,
        }
    }

    /// Create an inertia matrix for a solid box
    pub fn box_inertia(mass: f64, width: f64, height: f64, depth: f64) -> Self {
        let w2 = width * width;
        let h2 = height * height;
        let d2 = depth * depth;
        let k = mass / 12.0;
        Self {
            ixx: k * (h2 + d2),
            ixy: 0.0,
            ixz: 0.0,
            iyy: k * (w2 + d2),
            iyz: 0.0,
            izz: k * (w2 + h2),
        }
    }

    /// Check if the inertia matrix is physically valid
    pub fn is_valid(&self) -> bool {
        // Diagonal elements must be positive
        if self.ixx <= 0.0 || self.iyy <= 0.0 || self.izz <= 0.0 {
            return false;
        }

        // Triangle inequality, with slack for rounding on thin parts
        let ixx = self.ixx;
        let iyy = self.iyy;
        let izz = self.izz;
        let slack = 1e-9 * (ixx + iyy + izz);

        ixx <= iyy + izz + slack && iyy <= ixx + izz + slack && izz <= ixx + iyy + slack
    }

    /// Get as array [ixx, ixy, ixz, iyy, iyz, izz]
    pub fn to_array(&self) -> [f64; 6] {
        [self.ixx, self.ixy, self.ixz, self.iyy, self.iyz, self.izz]
    }
}

/// Inertial values of one mesh at a target mass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InertialValues {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub inertia: InertiaMatrix,
    pub mass: f64,
    pub volume: f64,
    /// Whether the convex hull stood in for the mesh
    #[serde(default)]
    pub convex_hull: bool,
}

impl InertialValues {
    /// Keys reported for a link, in output order (mass and volume excluded)
    pub const KEYS: [&'static str; 9] = ["x", "y", "z", "ixx", "ixy", "ixz", "iyy", "iyz", "izz"];

    /// Rescale unit-density measures to `mass`
    pub fn from_measures(measures: &GeometricMeasures, mass: f64) -> Self {
        let com = measures.center_of_mass;
        let inertia =
            InertiaMatrix::from_tensor(&measures.inertia_tensor).scaled(mass / measures.volume);
        Self {
            x: com.x,
            y: com.y,
            z: com.z,
            inertia,
            mass,
            volume: measures.volume,
            convex_hull: measures.used_convex_hull,
        }
    }

    pub fn center_of_mass(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// The nine keyed values in [`Self::KEYS`] order
    pub fn entries(&self) -> [(&'static str, f64); 9] {
        let [ixx, ixy, ixz, iyy, iyz, izz] = self.inertia.to_array();
        let values = [self.x, self.y, self.z, ixx, ixy, ixz, iyy, iyz, izz];
        let mut entries = [("", 0.0); 9];
        for (slot, (key, value)) in entries
            .iter_mut()
            .zip(Self::KEYS.iter().zip(values))
        {
            *slot = (*key, value);
        }
        entries
    }
}

/// Load a mesh and compute its inertial values at `mass` kilograms
pub fn calc_inertia(
    mesh_path: impl AsRef<Path>,
    mass: f64,
    unit: StlUnit,
) -> Result<InertialValues, InertiaError> {
    let mesh_path = mesh_path.as_ref();
    if !mass.is_finite() || mass <= 0.0 {
        return Err(InertiaError::InvalidMass(mass));
    }

    let mesh = load_mesh(mesh_path, unit)?;
    let measures = measure_mesh(&mesh)?;
    if measures.used_convex_hull {
        tracing::info!("{} is not watertight, measured its convex hull", mesh_path.display());
    }

    let values = InertialValues::from_measures(&measures, mass);
    if !values.inertia.is_valid() {
        tracing::warn!(
            "Inertia computed for {} is not physically valid: {:?}",
            mesh_path.display(),
            values.inertia
        );
    }

    Ok(values)
}

/// Inertia calculation errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum InertiaError {
    #[error("Invalid mass: {0} (must be a positive number of kg)")]
    InvalidMass(f64),
    #[error(transparent)]
    Mesh(#[from] MeshError),
    #[error(transparent)]
    Measure(#[from] MeasureError),
}
