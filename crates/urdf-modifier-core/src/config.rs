//! Run configuration
//!
//! A config file is optional; the command line overrides whatever it sets.
//! Files use RON, e.g.
//!
//! ```ron
//! (
//!     mesh_extension: "stl",
//!     mesh_unit: Millimeters,
//!     output_suffix: "+out.urdf",
//!     transforms: (relink_meshes: true),
//! )
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::inertial::OverrideOptions;
use crate::stl::StlUnit;

/// Optional document transforms
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TransformConfig {
    /// Rewrite visual mesh URIs from `package://` to `file://`
    pub relink_meshes: bool,
    /// Strip `_continuous` from joint names
    pub remove_continuous: bool,
    /// Replace inertial blocks with `<inertial auto="true"/>`
    pub auto_inertia: bool,
}

/// Batch-mode configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModifierConfig {
    /// Mesh file extension, without the dot
    pub mesh_extension: String,
    /// Length unit of the mesh files
    pub mesh_unit: StlUnit,
    /// Appended to the input path to name the output file
    pub output_suffix: String,
    pub transforms: TransformConfig,
}

impl Default for ModifierConfig {
    fn default() -> Self {
        Self {
            mesh_extension: "stl".to_string(),
            mesh_unit: StlUnit::Meters,
            output_suffix: "+out.urdf".to_string(),
            transforms: TransformConfig::default(),
        }
    }
}

impl ModifierConfig {
    /// Load configuration from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_ron_str(&content)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        ron::from_str(content).map_err(|e| ConfigError::Deserialize(e.to_string()))
    }

    /// Save configuration as pretty-printed RON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::write(path, content)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))
    }

    /// Options for the inertia override pass
    pub fn override_options(&self) -> OverrideOptions {
        OverrideOptions {
            mesh_extension: self.mesh_extension.trim_start_matches('.').to_string(),
            mesh_unit: self.mesh_unit,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
}
