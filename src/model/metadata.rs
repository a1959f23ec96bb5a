use serde::{Deserialize, Serialize};

use crate::config::MetadataConfig;

const BUILDING_SOURCE_DESCRIPTION: &str = "OpenStreetMap contributors";
const BUILDING_SOURCE_REFERENCE_SYSTEM: &str = "urn:ogc:def:crs:EPSG:4326";
const BUILDING_SOURCE_CITATION: &str = "https://www.openstreetmap.org";

/// Document metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub title: String,
    pub reference_date: String,
    pub reference_system: String,
    /// `[min_x, min_y, min_z, max_x, max_y, max_z]` of the vertex list.
    pub geographical_extent: [f64; 6],
    pub dataset_point_of_contact: PointOfContact,
    #[serde(rename = "+metadata-extended")]
    pub extended: MetadataExtended,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointOfContact {
    pub contact_name: String,
    pub email_address: String,
    pub contact_type: String,
    pub website: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataExtended {
    pub lineage: Vec<Lineage>,
}

/// Provenance of one city object type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lineage {
    #[serde(rename = "featureIDs")]
    pub feature_ids: Vec<String>,
    pub source: Vec<LineageSource>,
    pub process_step: ProcessStep,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageSource {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_spatial_resolution: Option<String>,
    pub source_reference_system: String,
    pub source_citation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessStep {
    pub description: String,
    pub processor: Processor,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Processor {
    pub contact_name: String,
    pub contact_type: String,
    pub website: String,
}

impl Metadata {
    /// Builds the metadata block for a document covering `extent`.
    #[must_use]
    pub fn from_config(config: &MetadataConfig, extent: [f64; 6]) -> Self {
        let processor = |website: &str| Processor {
            contact_name: config.contact_name.clone(),
            contact_type: config.contact_type.clone(),
            website: website.to_owned(),
        };
        let terrain = Lineage {
            feature_ids: vec!["TINRelief".to_owned()],
            source: vec![LineageSource {
                description: config.terrain_source.description.clone(),
                source_spatial_resolution: config.terrain_source.spatial_resolution.clone(),
                source_reference_system: config.terrain_source.reference_system.clone(),
                source_citation: config.terrain_source.citation.clone(),
            }],
            process_step: ProcessStep {
                description: format!("Processing of raster DEM using {}", config.workflow),
                processor: processor(&config.website),
            },
        };
        let buildings = Lineage {
            feature_ids: vec!["Building".to_owned()],
            source: vec![LineageSource {
                description: BUILDING_SOURCE_DESCRIPTION.to_owned(),
                source_spatial_resolution: None,
                source_reference_system: BUILDING_SOURCE_REFERENCE_SYSTEM.to_owned(),
                source_citation: BUILDING_SOURCE_CITATION.to_owned(),
            }],
            process_step: ProcessStep {
                description: format!(
                    "Processing of building vector contributions using {}",
                    config.workflow
                ),
                processor: processor(&config.workflow_website),
            },
        };

        Self {
            title: config.title.clone(),
            reference_date: config.reference_date.clone(),
            reference_system: config.reference_system.clone(),
            geographical_extent: extent,
            dataset_point_of_contact: PointOfContact {
                contact_name: config.contact_name.clone(),
                email_address: config.email_address.clone(),
                contact_type: config.contact_type.clone(),
                website: config.website.clone(),
            },
            extended: MetadataExtended {
                lineage: vec![terrain, buildings],
            },
        }
    }
}
