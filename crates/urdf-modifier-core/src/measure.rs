//! Geometric measures of triangle meshes
//!
//! Clean-up and convex hulls are delegated to parry. Mass properties are
//! integrated over the cleaned triangles with the signed tetrahedron method
//! (Mirtich 1996), at unit density and about the center of mass.

use glam::{DMat3, DVec3};
use parry3d_f64::math::Point;
use parry3d_f64::shape::{TriMesh, TriMeshFlags};
use parry3d_f64::transformation::try_convex_hull;

use crate::mesh::TriangleMesh;

/// Volumes below this are treated as degenerate (m^3)
const MIN_VOLUME: f64 = 1e-15;

/// Mass properties at unit density
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassProperties {
    /// Enclosed volume (always positive)
    pub volume: f64,
    pub center_of_mass: DVec3,
    /// Inertia tensor about the center of mass, unit density
    pub inertia_tensor: DMat3,
}

/// Result of measuring a mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometricMeasures {
    pub volume: f64,
    pub center_of_mass: DVec3,
    pub inertia_tensor: DMat3,
    /// Whether the convex hull had to stand in for a non-watertight mesh
    pub used_convex_hull: bool,
}

/// Remove duplicate vertices, duplicate and degenerate faces, and faces that
/// would make an edge non-manifold
///
/// The returned parry mesh carries its half-edge topology.
pub fn clean_mesh(mesh: &TriangleMesh) -> Result<TriMesh, MeasureError> {
    if mesh.is_empty() {
        return Err(MeasureError::EmptyMesh);
    }
    if !mesh.indices_in_bounds() {
        return Err(MeasureError::Topology(
            "face references a missing vertex".to_string(),
        ));
    }

    let vertices: Vec<Point<f64>> = mesh
        .vertices
        .iter()
        .map(|v| Point::new(v[0], v[1], v[2]))
        .collect();

    let flags = TriMeshFlags::MERGE_DUPLICATE_VERTICES
        | TriMeshFlags::DELETE_DUPLICATE_TRIANGLES
        | TriMeshFlags::DELETE_DEGENERATE_TRIANGLES
        | TriMeshFlags::HALF_EDGE_TOPOLOGY
        | TriMeshFlags::DELETE_BAD_TOPOLOGY_TRIANGLES;

    let mut trimesh = TriMesh::new(vertices, mesh.faces.clone());
    trimesh
        .set_flags(flags)
        .map_err(|e| MeasureError::Topology(format!("{:?}", e)))?;

    if trimesh.indices().is_empty() {
        return Err(MeasureError::EmptyMesh);
    }
    Ok(trimesh)
}

/// A cleaned mesh is watertight when every half-edge has a twin
pub fn is_watertight(trimesh: &TriMesh) -> bool {
    trimesh.topology().is_some_and(|topology| {
        !topology.half_edges.is_empty()
            && topology.half_edges.iter().all(|he| he.twin != u32::MAX)
    })
}

fn to_triangle_mesh(trimesh: &TriMesh) -> TriangleMesh {
    TriangleMesh::new(
        trimesh.vertices().iter().map(|p| [p.x, p.y, p.z]).collect(),
        trimesh.indices().to_vec(),
    )
}

/// Convex hull of the mesh vertices
pub fn convex_hull(mesh: &TriangleMesh) -> Result<TriangleMesh, MeasureError> {
    if mesh.vertices.len() < 4 {
        return Err(MeasureError::ConvexHull(format!(
            "need at least 4 points, got {}",
            mesh.vertices.len()
        )));
    }

    let points: Vec<Point<f64>> = mesh
        .vertices
        .iter()
        .map(|v| Point::new(v[0], v[1], v[2]))
        .collect();

    let (hull_points, hull_faces) =
        try_convex_hull(&points).map_err(|e| MeasureError::ConvexHull(format!("{:?}", e)))?;

    Ok(TriangleMesh::new(
        hull_points.iter().map(|p| [p.x, p.y, p.z]).collect(),
        hull_faces,
    ))
}

/// Integrate volume, center of mass and inertia tensor of a closed mesh
///
/// Inward-facing meshes produce a negative signed volume; all integrals are
/// flipped so the result is the same as for the outward-facing mesh.
pub fn mass_properties(mesh: &TriangleMesh) -> Result<MassProperties, MeasureError> {
    if mesh.is_empty() {
        return Err(MeasureError::EmptyMesh);
    }

    let mut volume = 0.0;
    let mut first_moment = DVec3::ZERO;

    // Second moments: ∫x², ∫y², ∫z², ∫xy, ∫xz, ∫yz
    let mut xx = 0.0;
    let mut yy = 0.0;
    let mut zz = 0.0;
    let mut xy = 0.0;
    let mut xz = 0.0;
    let mut yz = 0.0;

    for face in &mesh.faces {
        let [a, b, c] = mesh.triangle(face).map(DVec3::from_array);

        // Tetrahedron (origin, a, b, c)
        let det = a.cross(b).dot(c);
        volume += det / 6.0;
        first_moment += det / 24.0 * (a + b + c);

        let f60 = det / 60.0;
        let f120 = det / 120.0;

        xx += f60 * (a.x * a.x + b.x * b.x + c.x * c.x + a.x * b.x + a.x * c.x + b.x * c.x);
        yy += f60 * (a.y * a.y + b.y * b.y + c.y * c.y + a.y * b.y + a.y * c.y + b.y * c.y);
        zz += f60 * (a.z * a.z + b.z * b.z + c.z * c.z + a.z * b.z + a.z * c.z + b.z * c.z);

        xy += f120 * product_sum(a.x, a.y, b.x, b.y, c.x, c.y);
        xz += f120 * product_sum(a.x, a.z, b.x, b.z, c.x, c.z);
        yz += f120 * product_sum(a.y, a.z, b.y, b.z, c.y, c.z);
    }

    if volume < 0.0 {
        volume = -volume;
        first_moment = -first_moment;
        xx = -xx;
        yy = -yy;
        zz = -zz;
        xy = -xy;
        xz = -xz;
        yz = -yz;
    }

    if volume < MIN_VOLUME {
        return Err(MeasureError::DegenerateVolume(volume));
    }

    let com = first_moment / volume;

    let i_origin = DMat3::from_cols(
        DVec3::new(yy + zz, -xy, -xz),
        DVec3::new(-xy, xx + zz, -yz),
        DVec3::new(-xz, -yz, xx + yy),
    );

    // Parallel axis theorem: I_com = I_origin - V * (|d|² I - d dᵀ)
    let outer = DMat3::from_cols(com * com.x, com * com.y, com * com.z);
    let shift = (DMat3::IDENTITY * com.length_squared() - outer) * volume;

    Ok(MassProperties {
        volume,
        center_of_mass: com,
        inertia_tensor: i_origin - shift,
    })
}

fn product_sum(ap: f64, aq: f64, bp: f64, bq: f64, cp: f64, cq: f64) -> f64 {
    2.0 * ap * aq + 2.0 * bp * bq + 2.0 * cp * cq + ap * bq + aq * bp + ap * cq + aq * cp + bp * cq
        + bq * cp
}

/// Clean a mesh and measure it, falling back to the convex hull when the
/// cleaned mesh is not watertight
pub fn measure_mesh(mesh: &TriangleMesh) -> Result<GeometricMeasures, MeasureError> {
    let trimesh = clean_mesh(mesh)?;
    let cleaned = to_triangle_mesh(&trimesh);

    if is_watertight(&trimesh) {
        match mass_properties(&cleaned) {
            Ok(props) => return Ok(GeometricMeasures::from_props(props, false)),
            Err(MeasureError::DegenerateVolume(volume)) => {
                tracing::debug!("Watertight mesh has degenerate volume {}, using convex hull", volume);
            }
            Err(e) => return Err(e),
        }
    } else {
        tracing::debug!("Mesh is not watertight, using convex hull");
    }

    let hull = convex_hull(&cleaned)?;
    let props = mass_properties(&hull)?;
    Ok(GeometricMeasures::from_props(props, true))
}

impl GeometricMeasures {
    fn from_props(props: MassProperties, used_convex_hull: bool) -> Self {
        Self {
            volume: props.volume,
            center_of_mass: props.center_of_mass,
            inertia_tensor: props.inertia_tensor,
            used_convex_hull,
        }
    }
}

/// Measurement errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum MeasureError {
    #[error("Empty mesh: no faces left to measure")]
    EmptyMesh,
    #[error("Mesh topology error: {0}")]
    Topology(String),
    #[error("Convex hull failed: {0}")]
    ConvexHull(String),
    #[error("Degenerate mesh volume: {0}")]
    DegenerateVolume(f64),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{cuboid, open_cube, unit_cube};
    use approx::assert_relative_eq;

    #[test]
    fn test_cube_mass_properties() {
        let props = mass_properties(&unit_cube(1.0)).unwrap();

        assert_relative_eq!(props.volume, 1.0, epsilon = 1e-12);
        assert_relative_eq!(props.center_of_mass.length(), 0.0, epsilon = 1e-12);
        // Unit density cube: I = V * s² / 6
        let tensor = props.inertia_tensor;
        assert_relative_eq!(tensor.x_axis.x, 1.0 / 6.0, epsilon = 1e-12);
        assert_relative_eq!(tensor.y_axis.y, 1.0 / 6.0, epsilon = 1e-12);
        assert_relative_eq!(tensor.z_axis.z, 1.0 / 6.0, epsilon = 1e-12);
        assert_relative_eq!(tensor.y_axis.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(tensor.z_axis.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(tensor.z_axis.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_offset_cuboid_com_and_tensor() {
        let props = mass_properties(&cuboid([1.0, 2.0, 3.0], [1.0, -2.0, 0.5])).unwrap();

        assert_relative_eq!(props.volume, 6.0, epsilon = 1e-9);
        assert_relative_eq!(props.center_of_mass.x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(props.center_of_mass.y, -2.0, epsilon = 1e-9);
        assert_relative_eq!(props.center_of_mass.z, 0.5, epsilon = 1e-9);

        // About the COM the offset must not leak into the tensor
        let tensor = props.inertia_tensor;
        assert_relative_eq!(tensor.x_axis.x, 6.0 * (4.0 + 9.0) / 12.0, epsilon = 1e-9);
        assert_relative_eq!(tensor.y_axis.y, 6.0 * (1.0 + 9.0) / 12.0, epsilon = 1e-9);
        assert_relative_eq!(tensor.z_axis.z, 6.0 * (1.0 + 4.0) / 12.0, epsilon = 1e-9);
        assert_relative_eq!(tensor.y_axis.x, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_inverted_mesh_gives_positive_volume() {
        let mut mesh = unit_cube(2.0);
        for face in &mut mesh.faces {
            face.swap(1, 2);
        }
        let props = mass_properties(&mesh).unwrap();
        assert_relative_eq!(props.volume, 8.0, epsilon = 1e-12);
        assert_relative_eq!(props.inertia_tensor.x_axis.x, 8.0 * 8.0 / 12.0, epsilon = 1e-9);
    }

    /// Two unit tetrahedra, the second mirrored in orientation, so the signed
    /// volumes cancel while every edge stays shared by two faces
    fn cancelling_tetrahedra() -> TriangleMesh {
        let corners = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        let mut vertices = corners.to_vec();
        vertices.extend(corners.iter().map(|[x, y, z]| [x + 2.0, *y, *z]));

        let outward = [[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]];
        let mut faces = outward.to_vec();
        faces.extend(outward.iter().map(|[a, b, c]| [a + 4, c + 4, b + 4]));
        TriangleMesh::new(vertices, faces)
    }

    #[test]
    fn test_watertight_detection() {
        assert!(is_watertight(&clean_mesh(&unit_cube(1.0)).unwrap()));
        assert!(!is_watertight(&clean_mesh(&open_cube(1.0)).unwrap()));
        assert!(is_watertight(&clean_mesh(&cancelling_tetrahedra()).unwrap()));
    }

    #[test]
    fn test_clean_removes_duplicate_faces() {
        let mut mesh = unit_cube(1.0);
        mesh.faces.push([0, 2, 1]);
        let cleaned = clean_mesh(&mesh).unwrap();
        assert_eq!(cleaned.indices().len(), 12);
        assert!(is_watertight(&cleaned));
    }

    #[test]
    fn test_clean_rejects_out_of_bounds_faces() {
        let mut mesh = unit_cube(1.0);
        mesh.faces.push([0, 1, 42]);
        assert!(matches!(clean_mesh(&mesh), Err(MeasureError::Topology(_))));
    }

    #[test]
    fn test_degenerate_closed_mesh_uses_convex_hull() {
        let mesh = cancelling_tetrahedra();
        let cleaned = to_triangle_mesh(&clean_mesh(&mesh).unwrap());
        assert!(matches!(
            mass_properties(&cleaned),
            Err(MeasureError::DegenerateVolume(_))
        ));

        let measures = measure_mesh(&mesh).unwrap();
        assert!(measures.used_convex_hull);
        assert!(measures.volume > 1.0 / 6.0);
    }

    #[test]
    fn test_open_mesh_uses_convex_hull() {
        let measures = measure_mesh(&open_cube(1.0)).unwrap();
        assert!(measures.used_convex_hull);
        assert_relative_eq!(measures.volume, 1.0, epsilon = 1e-9);
        assert_relative_eq!(measures.inertia_tensor.x_axis.x, 1.0 / 6.0, epsilon = 1e-9);
    }

    #[test]
    fn test_closed_mesh_skips_convex_hull() {
        let measures = measure_mesh(&unit_cube(1.0)).unwrap();
        assert!(!measures.used_convex_hull);
    }

    #[test]
    fn test_flat_mesh_is_rejected() {
        let mesh = TriangleMesh::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]],
            vec![[0, 1, 2], [1, 3, 2]],
        );
        assert!(measure_mesh(&mesh).is_err());
    }

    #[test]
    fn test_empty_mesh_is_rejected() {
        assert!(matches!(
            measure_mesh(&TriangleMesh::default()),
            Err(MeasureError::EmptyMesh)
        ));
    }
}
