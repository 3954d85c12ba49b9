//! Project export documents.
//!
//! An export lists the tasks of an existing project. Each task geometry is a
//! GeoJSON feature in EPSG:4326, stored either as an embedded JSON string or
//! as a plain object.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tasker_models::PolygonFeature;
use tracing::warn;

use crate::error::ImportError;
use crate::formats::GeoJsonDecoder;
use crate::normalize::normalize_all;

/// An exported project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectExport {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tasks: Vec<TaskExport>,
}

/// One task of an exported project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskExport {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub process_points: u32,
    #[serde(default)]
    pub max_process_points: u32,
    pub geometry: Value,
}

impl TaskExport {
    /// Decodes and normalizes the task geometry.
    ///
    /// Returns an empty list if the geometry is unreadable or not polygon-like.
    pub fn polygon_features(&self) -> Vec<PolygonFeature> {
        let decoded = match &self.geometry {
            Value::String(text) => serde_json::from_str::<Value>(text)
                .map_err(Into::into)
                .and_then(|v| GeoJsonDecoder.decode_value(&v)),
            other => GeoJsonDecoder.decode_value(other),
        };

        match decoded {
            Ok(features) => normalize_all(&features),
            Err(e) => {
                warn!(task = %self.name, error = %e, "Skipping task with unreadable geometry");
                Vec::new()
            }
        }
    }
}

/// Parses a project export document.
pub fn parse_export(text: &str) -> Result<ProjectExport, ImportError> {
    Ok(serde_json::from_str(text)?)
}
