//! STL file loading

use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::mesh::TriangleMesh;

/// Mesh length unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StlUnit {
    /// Meters (no scaling, Onshape exports use this)
    #[default]
    Meters,
    /// Millimeters (scale by 0.001)
    Millimeters,
    /// Centimeters (scale by 0.01)
    Centimeters,
    /// Inches (scale by 0.0254)
    Inches,
}

impl StlUnit {
    pub fn scale_factor(&self) -> f64 {
        match self {
            StlUnit::Meters => 1.0,
            StlUnit::Millimeters => 0.001,
            StlUnit::Centimeters => 0.01,
            StlUnit::Inches => 0.0254,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StlUnit::Meters => "meters",
            StlUnit::Millimeters => "millimeters",
            StlUnit::Centimeters => "centimeters",
            StlUnit::Inches => "inches",
        }
    }

    pub fn abbreviation(&self) -> &'static str {
        match self {
            StlUnit::Meters => "m",
            StlUnit::Millimeters => "mm",
            StlUnit::Centimeters => "cm",
            StlUnit::Inches => "in",
        }
    }

    pub const ALL: &'static [StlUnit] = &[
        StlUnit::Meters,
        StlUnit::Millimeters,
        StlUnit::Centimeters,
        StlUnit::Inches,
    ];
}

impl std::fmt::Display for StlUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for StlUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        StlUnit::ALL
            .iter()
            .copied()
            .find(|unit| unit.name() == lower || unit.abbreviation() == lower)
            .ok_or_else(|| format!("unknown unit '{}' (expected m, mm, cm or in)", s))
    }
}

/// Load an STL file (no scaling)
pub fn load_stl(path: impl AsRef<Path>) -> Result<TriangleMesh, StlError> {
    load_stl_with_unit(path, StlUnit::Meters)
}

/// Load an STL file with specified unit
pub fn load_stl_with_unit(path: impl AsRef<Path>, unit: StlUnit) -> Result<TriangleMesh, StlError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| StlError::Io(e.to_string()))?;
    let mut reader = BufReader::new(file);

    // stl_io already merges bit-identical vertices while indexing
    let mesh = stl_io::read_stl(&mut reader).map_err(|e| StlError::Parse(e.to_string()))?;

    let scale = unit.scale_factor();
    let vertices = mesh
        .vertices
        .iter()
        .map(|v| {
            [
                f64::from(v[0]) * scale,
                f64::from(v[1]) * scale,
                f64::from(v[2]) * scale,
            ]
        })
        .collect();
    let faces = mesh
        .faces
        .iter()
        .map(|face| {
            [
                face.vertices[0] as u32,
                face.vertices[1] as u32,
                face.vertices[2] as u32,
            ]
        })
        .collect();

    Ok(TriangleMesh { vertices, faces })
}

/// Save a mesh as a binary STL file
pub fn save_stl(mesh: &TriangleMesh, path: impl AsRef<Path>) -> Result<(), StlError> {
    let path = path.as_ref();

    let mut triangles = Vec::with_capacity(mesh.faces.len());
    for face in &mesh.faces {
        let [v0, v1, v2] = mesh.triangle(face);
        let normal = triangle_normal(v0, v1, v2);

        triangles.push(stl_io::Triangle {
            normal: stl_io::Normal::new(to_f32(normal)),
            vertices: [
                stl_io::Vertex::new(to_f32(v0)),
                stl_io::Vertex::new(to_f32(v1)),
                stl_io::Vertex::new(to_f32(v2)),
            ],
        });
    }

    let mut file = std::fs::File::create(path).map_err(|e| StlError::Io(e.to_string()))?;
    stl_io::write_stl(&mut file, triangles.iter()).map_err(|e| StlError::Write(e.to_string()))?;

    Ok(())
}

fn triangle_normal(v0: [f64; 3], v1: [f64; 3], v2: [f64; 3]) -> [f64; 3] {
    let e1 = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
    let e2 = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];
    let cross = [
        e1[1] * e2[2] - e1[2] * e2[1],
        e1[2] * e2[0] - e1[0] * e2[2],
        e1[0] * e2[1] - e1[1] * e2[0],
    ];
    let len = (cross[0] * cross[0] + cross[1] * cross[1] + cross[2] * cross[2]).sqrt();
    if len > 0.0 {
        [cross[0] / len, cross[1] / len, cross[2] / len]
    } else {
        [0.0, 0.0, 1.0]
    }
}

fn to_f32(v: [f64; 3]) -> [f32; 3] {
    [v[0] as f32, v[1] as f32, v[2] as f32]
}

/// STL-related errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum StlError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Write error: {0}")]
    Write(String),
}
