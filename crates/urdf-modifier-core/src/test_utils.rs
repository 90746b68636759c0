//! Fixtures shared by the unit tests

use std::path::{Path, PathBuf};

use crate::mesh::TriangleMesh;
use crate::stl::save_stl;

/// Axis-aligned cube centered at the origin with outward-facing triangles
pub fn unit_cube(side: f64) -> TriangleMesh {
    let h = side / 2.0;
    let vertices = vec![
        [-h, -h, -h],
        [h, -h, -h],
        [h, h, -h],
        [-h, h, -h],
        [-h, -h, h],
        [h, -h, h],
        [h, h, h],
        [-h, h, h],
    ];
    let faces = vec![
        [0, 2, 1],
        [0, 3, 2],
        [4, 5, 6],
        [4, 6, 7],
        [0, 1, 5],
        [0, 5, 4],
        [3, 7, 6],
        [3, 6, 2],
        [0, 4, 7],
        [0, 7, 3],
        [1, 2, 6],
        [1, 6, 5],
    ];
    TriangleMesh::new(vertices, faces)
}

/// Box with extents `size`, translated by `offset`
pub fn cuboid(size: [f64; 3], offset: [f64; 3]) -> TriangleMesh {
    let mut mesh = unit_cube(1.0);
    for v in &mut mesh.vertices {
        for axis in 0..3 {
            v[axis] = v[axis] * size[axis] + offset[axis];
        }
    }
    mesh
}

/// Cube with its top face removed
pub fn open_cube(side: f64) -> TriangleMesh {
    let mut mesh = unit_cube(side);
    mesh.faces.retain(|f| *f != [4, 5, 6] && *f != [4, 6, 7]);
    mesh
}

/// Write a mesh as `<dir>/<name>.stl`
pub fn write_stl(dir: &Path, name: &str, mesh: &TriangleMesh) -> PathBuf {
    let path = dir.join(format!("{}.stl", name));
    save_stl(mesh, &path).unwrap();
    path
}

/// Robot with one updatable link, one link without inertial, one link whose
/// mesh is absent and one continuous joint
pub const SAMPLE_URDF: &str = r#"<?xml version="1.0"?>
<!-- exported by onshape-to-robot -->
<robot name="rover">
    <link name="base_link">
        <visual>
            <geometry>
                <mesh filename="package://rover_description/meshes/base_link.stl"/>
            </geometry>
        </visual>
    </link>
    <link name="arm">
        <visual>
            <origin xyz="0 0 0" rpy="0 0 0" />
            <geometry>
                <mesh filename="package://rover_description/meshes/arm.stl"/>
            </geometry>
        </visual>
        <collision>
            <geometry>
                <mesh filename="package://rover_description/meshes/arm.stl"/>
            </geometry>
        </collision>
        <inertial>
            <mass value="2.0" />
            <origin xyz="1 2 3" rpy="0 0 0" />
            <inertia ixx="1" ixy="0" ixz="0" iyy="1" iyz="0" izz="1" />
        </inertial>
    </link>
    <link name="ghost">
        <inertial>
            <mass value="0.5" />
            <origin xyz="0 0 0" rpy="0 0 0" />
            <inertia ixx="0.1" ixy="0" ixz="0" iyy="0.1" iyz="0" izz="0.1" />
        </inertial>
    </link>
    <joint name="elbow_continuous" type="continuous">
        <parent link="base_link"/>
        <child link="arm"/>
    </joint>
    <joint name="wrist" type="fixed">
        <parent link="arm"/>
        <child link="ghost"/>
    </joint>
</robot>
"#;

/// Extract the `<inertial>…</inertial>` block of a link from raw XML
pub fn inertial_block<'a>(xml: &'a str, link: &str) -> &'a str {
    let start = xml
        .find(&format!("<link name=\"{}\"", link))
        .unwrap_or_else(|| panic!("link {} not found", link));
    let rest = &xml[start..];
    let link_end = rest.find("</link>").unwrap();
    let rest = &rest[..link_end];
    match (rest.find("<inertial"), rest.find("</inertial>")) {
        (Some(a), Some(b)) => &rest[a..b + "</inertial>".len()],
        (Some(a), None) => &rest[a..],
        _ => "",
    }
}
