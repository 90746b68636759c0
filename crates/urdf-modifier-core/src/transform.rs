//! Helper transforms for exported URDFs

use crate::document::{Element, UrdfDocument};

/// Suffix some exporters append to continuous joint names
pub const CONTINUOUS_SUFFIX: &str = "_continuous";

const PACKAGE_SCHEME: &str = "package";
const FILE_SCHEME: &str = "file";

/// Point visual meshes at `file://` instead of `package://`
///
/// Only `link/visual/geometry/mesh` is rewritten; collision meshes are left
/// alone. Returns the number of filenames changed.
pub fn relink_meshes(doc: &mut UrdfDocument) -> usize {
    let mut changed = 0;

    for link in doc.links_mut() {
        for visual in link.children_named_mut("visual") {
            let Some(mesh) = visual
                .child_mut("geometry")
                .and_then(|geometry| geometry.child_mut("mesh"))
            else {
                continue;
            };
            let Some(filename) = mesh.attr("filename") else {
                continue;
            };

            match relinked(&filename) {
                Some(new_filename) => {
                    tracing::debug!("Relinking {} -> {}", filename, new_filename);
                    mesh.set_attr("filename", &new_filename);
                    changed += 1;
                }
                None => tracing::debug!("Leaving mesh {} as is", filename),
            }
        }
    }

    changed
}

fn relinked(filename: &str) -> Option<String> {
    filename
        .strip_prefix(PACKAGE_SCHEME)
        .map(|rest| format!("{}{}", FILE_SCHEME, rest))
}

/// Strip `_continuous` from joint names, returning the number of joints renamed
pub fn remove_continuous(doc: &mut UrdfDocument) -> usize {
    let mut changed = 0;

    for joint in doc.joints_mut() {
        let Some(name) = joint.attr("name") else {
            continue;
        };
        if let Some(stripped) = name.strip_suffix(CONTINUOUS_SUFFIX) {
            joint.set_attr("name", stripped);
            changed += 1;
        }
    }

    changed
}

/// Replace every inertial block with `<inertial auto="true"/>`
///
/// Links need both an inertial (for the mass) and a visual (for the mesh) to
/// qualify. Returns the number of links changed.
pub fn auto_inertia(doc: &mut UrdfDocument) -> usize {
    let mut changed = 0;

    for link in doc.links_mut() {
        let name = link.attr("name").unwrap_or_default();
        let Some(index) = link.position_of("inertial") else {
            tracing::info!("Skipping link: {}", name);
            continue;
        };
        if link.child("visual").is_none() {
            tracing::info!("Skipping link: {}", name);
            continue;
        }

        link.replace_child(index, Element::new_empty("inertial", &[("auto", "true")]));
        changed += 1;
    }

    changed
}
