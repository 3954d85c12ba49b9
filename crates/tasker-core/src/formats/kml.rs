//! KML decoder.

use serde_json::Value;
use tasker_models::{Coord, Feature, Geometry, Properties, Ring};

use super::{parse_number, FormatDecoder, GeometryFormat, Result};
use crate::error::DecodeError;
use crate::xml::{parse_document, XmlElement};

const GEOMETRY_ELEMENTS: [&str; 5] = ["Point", "LineString", "LinearRing", "Polygon", "MultiGeometry"];

/// Reads every `<Placemark>` in the document.
#[derive(Debug, Clone, Copy, Default)]
pub struct KmlDecoder;

impl FormatDecoder for KmlDecoder {
    fn format(&self) -> GeometryFormat {
        GeometryFormat::Kml
    }

    fn decode(&self, text: &str) -> Result<Vec<Feature>> {
        let root = parse_document(text)?;

        let mut placemarks = Vec::new();
        if root.name == "Placemark" {
            placemarks.push(&root);
        }
        root.descendants_named("Placemark", &mut placemarks);

        placemarks.into_iter().map(read_placemark).collect()
    }
}

fn read_placemark(placemark: &XmlElement) -> Result<Feature> {
    let geometry = placemark
        .children
        .iter()
        .find(|c| GEOMETRY_ELEMENTS.contains(&c.name.as_str()))
        .map(read_geometry)
        .transpose()?;

    let mut properties = Properties::new();
    for key in ["name", "description"] {
        if let Some(text) = placemark.child_text(key) {
            properties.insert(key.to_string(), Value::from(text));
        }
    }
    if let Some(extended) = placemark.child("ExtendedData") {
        for data in extended.children_named("Data") {
            if let (Some(name), Some(value)) = (data.attr("name"), data.child("value")) {
                properties.insert(name.to_string(), Value::from(value.text()));
            }
        }
        for schema in extended.children_named("SchemaData") {
            for data in schema.children_named("SimpleData") {
                if let Some(name) = data.attr("name") {
                    properties.insert(name.to_string(), Value::from(data.text()));
                }
            }
        }
    }

    Ok(Feature::with_properties(geometry, properties))
}

fn read_geometry(element: &XmlElement) -> Result<Geometry> {
    match element.name.as_str() {
        "Point" => {
            let coords = coordinates(element)?;
            coords
                .first()
                .copied()
                .map(Geometry::Point)
                .ok_or_else(|| DecodeError::InvalidGeometry("Point without coordinates".to_string()))
        }
        "LineString" => Ok(Geometry::LineString(coordinates(element)?)),
        "LinearRing" => Ok(Geometry::LinearRing(coordinates(element)?)),
        "Polygon" => {
            let mut rings = Vec::new();
            for boundary in ["outerBoundaryIs", "innerBoundaryIs"] {
                for b in element.children_named(boundary) {
                    if let Some(ring) = b.child("LinearRing") {
                        rings.push(coordinates(ring)?);
                    }
                }
            }
            if rings.is_empty() {
                return Err(DecodeError::InvalidGeometry(
                    "Polygon without outer boundary".to_string(),
                ));
            }
            Ok(Geometry::Polygon(rings))
        }
        "MultiGeometry" => Ok(Geometry::GeometryCollection(
            element
                .children
                .iter()
                .filter(|c| GEOMETRY_ELEMENTS.contains(&c.name.as_str()))
                .map(read_geometry)
                .collect::<Result<Vec<_>>>()?,
        )),
        other => Err(DecodeError::InvalidGeometry(format!(
            "unsupported KML geometry <{}>",
            other
        ))),
    }
}

/// Reads `lon,lat[,alt]` tuples separated by whitespace.
fn coordinates(element: &XmlElement) -> Result<Ring> {
    let text = element.child("coordinates").map(|c| c.text()).unwrap_or_default();
    text.split_whitespace()
        .map(|tuple| {
            let mut parts = tuple.split(',');
            match (parts.next(), parts.next()) {
                (Some(lon), Some(lat)) => Ok(Coord::new(
                    parse_number(lon, "longitude")?,
                    parse_number(lat, "latitude")?,
                )),
                _ => Err(DecodeError::InvalidGeometry(format!(
                    "invalid coordinate tuple '{}'",
                    tuple
                ))),
            }
        })
        .collect()
}
