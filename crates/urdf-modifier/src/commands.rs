//! Batch and manual commands

use std::path::PathBuf;

use anyhow::{Context, Result};
use urdf_modifier_core::{
    ModifierConfig, OverrideReport, UrdfDocument, auto_inertia, calc_inertia, output_path,
    override_inertias, relink_meshes, remove_continuous, render,
};

use crate::cli::{BatchArgs, ManualArgs};

/// What a batch run did
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub output: PathBuf,
    /// Empty when auto-inertia replaced the recalculation pass
    pub report: OverrideReport,
    pub relinked: usize,
    pub renamed: usize,
    pub auto_inertias: usize,
}

/// Config file (if any) with command-line flags layered on top
pub fn resolve_config(args: &BatchArgs) -> Result<ModifierConfig> {
    let mut config = match &args.config {
        Some(path) => ModifierConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ModifierConfig::default(),
    };

    if let Some(ext) = &args.mesh_ext {
        config.mesh_extension = ext.clone();
    }
    if let Some(unit) = args.unit {
        config.mesh_unit = unit;
    }
    config.transforms.relink_meshes |= args.relink_meshes;
    config.transforms.remove_continuous |= args.remove_continuous;
    config.transforms.auto_inertia |= args.auto_inertia;

    Ok(config)
}

/// Process one URDF and write the result next to it (or to `--output`)
pub fn run_batch(args: &BatchArgs) -> Result<BatchSummary> {
    let config = resolve_config(args)?;
    let mut doc = UrdfDocument::read(&args.urdf_file)
        .with_context(|| format!("Failed to read {}", args.urdf_file.display()))?;

    let mut summary = BatchSummary {
        output: args
            .output
            .clone()
            .unwrap_or_else(|| output_path(&args.urdf_file, &config.output_suffix)),
        ..Default::default()
    };

    if config.transforms.auto_inertia {
        summary.auto_inertias = auto_inertia(&mut doc);
    } else {
        let mesh_dir = args.mesh_dir.clone().unwrap_or_default();
        summary.report = override_inertias(&mut doc, &mesh_dir, &config.override_options());
    }
    if config.transforms.relink_meshes {
        summary.relinked = relink_meshes(&mut doc);
    }
    if config.transforms.remove_continuous {
        summary.renamed = remove_continuous(&mut doc);
    }

    doc.write(&summary.output)
        .with_context(|| format!("Failed to write {}", summary.output.display()))?;

    if config.transforms.auto_inertia {
        tracing::info!(
            "Wrote {} ({} inertials marked auto)",
            summary.output.display(),
            summary.auto_inertias
        );
    } else {
        tracing::info!(
            "Wrote {} ({} updated, {} skipped, {} failed)",
            summary.output.display(),
            summary.report.updated(),
            summary.report.skipped(),
            summary.report.failed()
        );
    }
    if summary.relinked > 0 || summary.renamed > 0 {
        tracing::info!(
            "Relinked {} meshes, renamed {} joints",
            summary.relinked,
            summary.renamed
        );
    }

    Ok(summary)
}

/// Measure one mesh and render its inertial values
pub fn run_manual(args: &ManualArgs) -> Result<String> {
    let values = calc_inertia(&args.stl_file, args.mass, args.unit)
        .with_context(|| format!("Failed to compute inertia of {}", args.stl_file.display()))?;
    Ok(render(&args.stl_file, &values, args.format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use urdf_modifier_core::test_utils::unit_cube;
    use urdf_modifier_core::{LinkOutcome, OutputFormat, StlUnit, save_stl};

    const URDF: &str = r#"<?xml version="1.0"?>
<robot name="bot">
  <link name="body">
    <visual>
      <geometry>
        <mesh filename="package://bot/meshes/body.stl"/>
      </geometry>
    </visual>
    <inertial>
      <origin xyz="0 0 0" rpy="0 0 0"/>
      <mass value="6"/>
      <inertia ixx="0" ixy="0" ixz="0" iyy="0" iyz="0" izz="0"/>
    </inertial>
  </link>
  <link name="wheel">
    <inertial>
      <origin xyz="0 0 0" rpy="0 0 0"/>
      <mass value="1"/>
      <inertia ixx="0" ixy="0" ixz="0" iyy="0" iyz="0" izz="0"/>
    </inertial>
  </link>
  <joint name="axle_continuous" type="continuous">
    <parent link="body"/>
    <child link="wheel"/>
  </joint>
</robot>
"#;

    fn batch_args(urdf: &Path, mesh_dir: &Path) -> BatchArgs {
        BatchArgs {
            urdf_file: urdf.to_path_buf(),
            mesh_dir: Some(mesh_dir.to_path_buf()),
            config: None,
            mesh_ext: None,
            unit: None,
            relink_meshes: false,
            remove_continuous: false,
            auto_inertia: false,
            output: None,
        }
    }

    fn fixture() -> (tempfile::TempDir, PathBuf) {
        let temp = tempfile::tempdir().unwrap();
        let urdf = temp.path().join("bot.urdf");
        std::fs::write(&urdf, URDF).unwrap();
        save_stl(&unit_cube(1.0), temp.path().join("body.stl")).unwrap();
        (temp, urdf)
    }

    #[test]
    fn test_batch_updates_links_with_meshes() {
        let (temp, urdf) = fixture();
        let summary = run_batch(&batch_args(&urdf, temp.path())).unwrap();

        assert_eq!(summary.output, temp.path().join("bot.urdf+out.urdf"));
        assert_eq!(summary.report.updated(), 1);
        assert!(matches!(
            summary.report.outcome("wheel"),
            Some(LinkOutcome::MeshNotFound { .. })
        ));

        let out = std::fs::read_to_string(&summary.output).unwrap();
        // 6 kg unit cube: 6/6 = 1 kg m^2 on the diagonal
        assert!(out.contains(r#"ixx="1.0000000000e+00""#));
        assert!(out.contains(r#"<inertia ixx="0" ixy="0" ixz="0" iyy="0" iyz="0" izz="0"/>"#));
        assert!(out.contains("axle_continuous"));
        assert!(out.contains("package://"));
    }

    #[test]
    fn test_batch_transforms_and_output() {
        let (temp, urdf) = fixture();
        let mut args = batch_args(&urdf, temp.path());
        args.relink_meshes = true;
        args.remove_continuous = true;
        args.output = Some(temp.path().join("patched.urdf"));

        let summary = run_batch(&args).unwrap();
        assert_eq!(summary.relinked, 1);
        assert_eq!(summary.renamed, 1);

        let out = std::fs::read_to_string(temp.path().join("patched.urdf")).unwrap();
        assert!(out.contains(r#"<mesh filename="file://bot/meshes/body.stl"/>"#));
        assert!(out.contains(r#"<joint name="axle" type="continuous">"#));
    }

    #[test]
    fn test_auto_inertia_skips_recalculation() {
        let (temp, urdf) = fixture();
        let mut args = batch_args(&urdf, temp.path());
        args.auto_inertia = true;

        let summary = run_batch(&args).unwrap();
        assert_eq!(summary.auto_inertias, 1);
        assert!(summary.report.links.is_empty());

        let out = std::fs::read_to_string(&summary.output).unwrap();
        assert!(out.contains(r#"<inertial auto="true"/>"#));
        assert_eq!(out.matches("<inertial>").count(), 1);
    }

    #[test]
    fn test_config_and_flags_merge() {
        let (temp, urdf) = fixture();
        let config = temp.path().join("modifier.ron");
        std::fs::write(
            &config,
            r#"(mesh_unit: Millimeters, output_suffix: ".new", transforms: (relink_meshes: true))"#,
        )
        .unwrap();

        let mut args = batch_args(&urdf, temp.path());
        args.config = Some(config);
        args.unit = Some(StlUnit::Meters);
        args.remove_continuous = true;

        let resolved = resolve_config(&args).unwrap();
        assert_eq!(resolved.mesh_unit, StlUnit::Meters);
        assert_eq!(resolved.output_suffix, ".new");
        assert!(resolved.transforms.relink_meshes);
        assert!(resolved.transforms.remove_continuous);

        let summary = run_batch(&args).unwrap();
        assert_eq!(summary.output, temp.path().join("bot.urdf.new"));
    }

    #[test]
    fn test_batch_file_errors() {
        let temp = tempfile::tempdir().unwrap();
        let args = batch_args(&temp.path().join("missing.urdf"), temp.path());
        assert!(run_batch(&args).is_err());

        let urdf = temp.path().join("broken.urdf");
        std::fs::write(&urdf, "<robot><link name=\"a\">").unwrap();
        assert!(run_batch(&batch_args(&urdf, temp.path())).is_err());
        assert!(!temp.path().join("broken.urdf+out.urdf").exists());
    }

    #[test]
    fn test_manual_output() {
        let temp = tempfile::tempdir().unwrap();
        let stl = temp.path().join("cube.stl");
        save_stl(&unit_cube(1.0), &stl).unwrap();

        let args = ManualArgs {
            stl_file: stl.clone(),
            mass: 6.0,
            format: OutputFormat::Sdf,
            unit: StlUnit::Meters,
        };
        let text = run_manual(&args).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 10);
        assert!(lines[0].starts_with("Using "));
        assert!(lines[0].ends_with("with sdf format:"));
        let ixx: f64 = lines[4]
            .strip_prefix("<ixx>")
            .and_then(|l| l.strip_suffix("</ixx>"))
            .unwrap()
            .parse()
            .unwrap();
        assert!((ixx - 1.0).abs() < 1e-9);

        let bad_mass = ManualArgs { mass: -1.0, ..args.clone() };
        assert!(run_manual(&bad_mass).is_err());

        let missing = ManualArgs {
            stl_file: temp.path().join("nope.stl"),
            ..args
        };
        assert!(run_manual(&missing).is_err());
    }
}
