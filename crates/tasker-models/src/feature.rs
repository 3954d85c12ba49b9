//! Feature types: a geometry plus an open property bag.

use serde::{Deserialize, Serialize};

use crate::geometry::{Geometry, PolygonGeometry};

/// Open key/value property bag attached to a feature.
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// A decoded feature of arbitrary geometry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Feature {
    /// Geometry of the feature, if the source provided one.
    pub geometry: Option<Geometry>,
    /// Properties copied from the source.
    pub properties: Properties,
}

impl Feature {
    /// Creates a feature with the given geometry and no properties.
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry: Some(geometry),
            properties: Properties::new(),
        }
    }

    /// Creates a feature with the given geometry and properties.
    pub fn with_properties(geometry: Option<Geometry>, properties: Properties) -> Self {
        Self {
            geometry,
            properties,
        }
    }

    /// Adds a property.
    pub fn property(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// A feature whose geometry is polygon-like.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonFeature {
    pub geometry: PolygonGeometry,
    #[serde(default)]
    pub properties: Properties,
}

impl PolygonFeature {
    /// Creates a polygon feature.
    pub fn new(geometry: PolygonGeometry, properties: Properties) -> Self {
        Self {
            geometry,
            properties,
        }
    }

    /// Returns a property as a string, converting numbers.
    ///
    /// Returns `None` for missing, null, or structured values.
    pub fn property_text(&self, key: &str) -> Option<String> {
        match self.properties.get(key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}
