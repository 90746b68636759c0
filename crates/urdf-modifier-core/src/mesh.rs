//! Mesh file loading (STL, OBJ formats)

use std::path::Path;

use crate::stl::StlUnit;

/// Indexed triangle mesh in meters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    pub vertices: Vec<[f64; 3]>,
    pub faces: Vec<[u32; 3]>,
}

impl TriangleMesh {
    pub fn new(vertices: Vec<[f64; 3]>, faces: Vec<[u32; 3]>) -> Self {
        Self { vertices, faces }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Corner positions of a face
    pub fn triangle(&self, face: &[u32; 3]) -> [[f64; 3]; 3] {
        [
            self.vertices[face[0] as usize],
            self.vertices[face[1] as usize],
            self.vertices[face[2] as usize],
        ]
    }

    /// Check that every face references an existing vertex
    pub fn indices_in_bounds(&self) -> bool {
        let count = self.vertices.len();
        self.faces
            .iter()
            .all(|face| face.iter().all(|&i| (i as usize) < count))
    }
}

/// Load an OBJ file with specified unit
pub fn load_obj_with_unit(path: impl AsRef<Path>, unit: StlUnit) -> Result<TriangleMesh, MeshError> {
    let path = path.as_ref();

    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|e| MeshError::Parse(e.to_string()))?;

    if models.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    let scale = unit.scale_factor();

    // Combine all models into one mesh
    let mut mesh = TriangleMesh::default();
    for model in &models {
        let vertex_offset = mesh.vertices.len() as u32;

        for chunk in model.mesh.positions.chunks(3) {
            if chunk.len() == 3 {
                mesh.vertices.push([
                    f64::from(chunk[0]) * scale,
                    f64::from(chunk[1]) * scale,
                    f64::from(chunk[2]) * scale,
                ]);
            }
        }

        for tri in model.mesh.indices.chunks(3) {
            if tri.len() == 3 {
                mesh.faces.push([
                    vertex_offset + tri[0],
                    vertex_offset + tri[1],
                    vertex_offset + tri[2],
                ]);
            }
        }
    }

    Ok(mesh)
}

/// Detect mesh format from file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    Stl,
    Obj,
    Unknown,
}

impl MeshFormat {
    /// Detect format from file path
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .as_deref()
        {
            Some("stl") => MeshFormat::Stl,
            Some("obj") => MeshFormat::Obj,
            _ => MeshFormat::Unknown,
        }
    }
}

/// Load any supported mesh format
pub fn load_mesh(path: impl AsRef<Path>, unit: StlUnit) -> Result<TriangleMesh, MeshError> {
    let path = path.as_ref();

    let mesh = match MeshFormat::from_path(path) {
        MeshFormat::Stl => crate::stl::load_stl_with_unit(path, unit).map_err(|e| match e {
            crate::stl::StlError::Io(msg) => MeshError::Io(msg),
            other => MeshError::Parse(other.to_string()),
        })?,
        MeshFormat::Obj => load_obj_with_unit(path, unit)?,
        MeshFormat::Unknown => {
            return Err(MeshError::UnsupportedFormat(
                path.extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("unknown")
                    .to_string(),
            ));
        }
    };

    if mesh.is_empty() {
        return Err(MeshError::EmptyMesh);
    }
    if !mesh.indices_in_bounds() {
        return Err(MeshError::Parse(format!(
            "face index out of bounds in {}",
            path.display()
        )));
    }

    Ok(mesh)
}

/// Mesh-related errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum MeshError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Empty mesh: no geometry found")]
    EmptyMesh,
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{unit_cube, write_stl};

    #[test]
    fn test_format_detection() {
        assert_eq!(MeshFormat::from_path(Path::new("a/b/link.STL")), MeshFormat::Stl);
        assert_eq!(MeshFormat::from_path(Path::new("link.obj")), MeshFormat::Obj);
        assert_eq!(MeshFormat::from_path(Path::new("link.dae")), MeshFormat::Unknown);
        assert_eq!(MeshFormat::from_path(Path::new("link")), MeshFormat::Unknown);
    }

    #[test]
    fn test_load_mesh_unsupported() {
        let result = load_mesh("robot/link.dae", StlUnit::Meters);
        assert!(matches!(result, Err(MeshError::UnsupportedFormat(ext)) if ext == "dae"));
    }

    #[test]
    fn test_load_mesh_stl() {
        let temp = tempfile::tempdir().unwrap();
        let path = write_stl(temp.path(), "base", &unit_cube(2.0));

        let mesh = load_mesh(&path, StlUnit::Meters).unwrap();
        assert_eq!(mesh.faces.len(), 12);
        assert!(mesh.indices_in_bounds());
    }

    #[test]
    fn test_load_obj_tetrahedron() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("tet.obj");
        std::fs::write(
            &path,
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 0 0 1\nf 1 3 2\nf 1 2 4\nf 1 4 3\nf 2 3 4\n",
        )
        .unwrap();

        let mesh = load_mesh(&path, StlUnit::Meters).unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.faces.len(), 4);
    }

    #[test]
    fn test_load_missing_stl_is_io_error() {
        let result = load_mesh("/nonexistent/link.stl", StlUnit::Meters);
        assert!(matches!(result, Err(MeshError::Io(_))));
    }
}
