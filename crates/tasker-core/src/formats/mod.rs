//! Geometry format decoders.
//!
//! Each decoder turns a text payload into raw features or rejects it. The
//! detection chain in [`crate::parser`] tries them in priority order.

mod esri;
mod geojson;
mod gpx;
mod kml;
mod osm;
mod wkt;

use std::fmt;

use serde_json::Value;
use tasker_models::{Coord, Feature, Ring};

use crate::error::DecodeError;

pub use esri::EsriJsonDecoder;
pub use geojson::GeoJsonDecoder;
pub use gpx::GpxDecoder;
pub use kml::KmlDecoder;
pub use osm::OsmXmlDecoder;
pub use wkt::WktDecoder;

/// Result type alias for decoding.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Supported payload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryFormat {
    GeoJson,
    OsmXml,
    Gpx,
    EsriJson,
    Kml,
    Wkt,
}

impl fmt::Display for GeometryFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GeometryFormat::GeoJson => "geojson",
            GeometryFormat::OsmXml => "osm-xml",
            GeometryFormat::Gpx => "gpx",
            GeometryFormat::EsriJson => "esri-json",
            GeometryFormat::Kml => "kml",
            GeometryFormat::Wkt => "wkt",
        };
        write!(f, "{}", s)
    }
}

/// A decoder for one payload format.
pub trait FormatDecoder: Send + Sync {
    /// Format this decoder reads.
    fn format(&self) -> GeometryFormat;

    /// Decodes the payload into raw features.
    ///
    /// An empty result means the payload was readable but held nothing.
    fn decode(&self, text: &str) -> Result<Vec<Feature>>;
}

/// Decoders in detection priority order.
pub fn default_decoders() -> Vec<Box<dyn FormatDecoder>> {
    vec![
        Box::new(GeoJsonDecoder),
        Box::new(OsmXmlDecoder),
        Box::new(GpxDecoder),
        Box::new(EsriJsonDecoder),
        Box::new(KmlDecoder),
        Box::new(WktDecoder),
    ]
}

/// Reads a `[x, y, ...]` JSON position.
pub(crate) fn json_coord(value: &Value) -> Result<Coord> {
    let items = value
        .as_array()
        .ok_or_else(|| DecodeError::InvalidGeometry("position is not an array".to_string()))?;
    match (
        items.first().and_then(Value::as_f64),
        items.get(1).and_then(Value::as_f64),
    ) {
        (Some(x), Some(y)) => Ok(Coord::new(x, y)),
        _ => Err(DecodeError::InvalidGeometry(
            "position needs two numbers".to_string(),
        )),
    }
}

/// Reads an array of positions.
pub(crate) fn json_coords(value: &Value) -> Result<Ring> {
    json_array(value)?.iter().map(json_coord).collect()
}

/// Reads an array of position arrays.
pub(crate) fn json_rings(value: &Value) -> Result<Vec<Ring>> {
    json_array(value)?.iter().map(json_coords).collect()
}

pub(crate) fn json_array(value: &Value) -> Result<&Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| DecodeError::InvalidGeometry("expected an array".to_string()))
}

/// Parses a number from XML text or attribute content.
pub(crate) fn parse_number(raw: &str, what: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| DecodeError::InvalidGeometry(format!("invalid {}: '{}'", what, raw)))
}
