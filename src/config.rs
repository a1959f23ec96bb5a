use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::operations::extraction::DuplicateVertexPolicy;
use crate::operations::heights::HeightRules;

/// Everything a run can be tuned with. Every section has a default, so `{}`
/// is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub metadata: MetadataConfig,
    pub heights: HeightRules,
    pub duplicate_vertices: DuplicateVertexPolicy,
    /// Where the pipeline writes the document, if anywhere.
    pub output: Option<PathBuf>,
}

impl ModelConfig {
    /// Parses a configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] if the text is not a valid configuration.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text).map_err(ConfigError::from)?)
    }

    /// Reads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Json`] if its content is not a valid configuration.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json_str(&text)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }
}

/// Strings copied into the document metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    pub title: String,
    pub reference_date: String,
    pub reference_system: String,
    pub contact_name: String,
    pub email_address: String,
    pub contact_type: String,
    pub website: String,
    /// Name of the processing workflow, quoted in the lineage process steps.
    pub workflow: String,
    pub workflow_website: String,
    pub terrain_source: TerrainSourceConfig,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            title: "LoD1 city model".to_owned(),
            reference_date: String::new(),
            reference_system: String::new(),
            contact_name: String::new(),
            email_address: String::new(),
            contact_type: "individual".to_owned(),
            website: String::new(),
            workflow: env!("CARGO_PKG_NAME").to_owned(),
            workflow_website: String::new(),
            terrain_source: TerrainSourceConfig::default(),
        }
    }
}

/// Lineage of the elevation model the terrain was built from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainSourceConfig {
    pub description: String,
    pub spatial_resolution: Option<String>,
    pub reference_system: String,
    pub citation: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_all_defaults() {
        let config = ModelConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ModelConfig::default());
        assert_eq!(config.duplicate_vertices, DuplicateVertexPolicy::KeepHighest);
        assert!(config.output.is_none());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = ModelConfig::from_json_str(
            r#"{
                "metadata": { "title": "Harbour", "terrain_source": { "spatial_resolution": "25 m" } },
                "heights": { "storey_height": 3.0 },
                "duplicate_vertices": "keep_lowest",
                "output": "out/model.city.json"
            }"#,
        )
        .unwrap();
        assert_eq!(config.metadata.title, "Harbour");
        assert_eq!(config.metadata.contact_type, "individual");
        assert_eq!(config.metadata.terrain_source.spatial_resolution.as_deref(), Some("25 m"));
        assert!((config.heights.storey_height - 3.0).abs() < f64::EPSILON);
        assert!((config.heights.roof_allowance - 1.3).abs() < f64::EPSILON);
        assert_eq!(config.duplicate_vertices, DuplicateVertexPolicy::KeepLowest);
        assert_eq!(config.output, Some(PathBuf::from("out/model.city.json")));
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = ModelConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, crate::error::GeocityError::Config(ConfigError::Json(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = ModelConfig::from_path("/nonexistent/geocity.json").unwrap_err();
        assert!(matches!(err, crate::error::GeocityError::Config(ConfigError::Io { .. })));
    }
}
