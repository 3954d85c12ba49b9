//! GeoJSON decoder.

use serde_json::Value;
use tasker_models::{Feature, Geometry, Properties};

use super::{json_array, json_coord, json_coords, json_rings, FormatDecoder, GeometryFormat, Result};
use crate::error::DecodeError;

/// Reads FeatureCollections, Features and bare geometry objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoJsonDecoder;

impl FormatDecoder for GeoJsonDecoder {
    fn format(&self) -> GeometryFormat {
        GeometryFormat::GeoJson
    }

    fn decode(&self, text: &str) -> Result<Vec<Feature>> {
        let value: Value = serde_json::from_str(text)?;
        read_document(&value)
    }
}

impl GeoJsonDecoder {
    /// Decodes an already-parsed JSON value.
    pub fn decode_value(&self, value: &Value) -> Result<Vec<Feature>> {
        read_document(value)
    }
}

fn read_document(value: &Value) -> Result<Vec<Feature>> {
    match type_of(value)? {
        "FeatureCollection" => {
            let features = value.get("features").ok_or_else(|| {
                DecodeError::UnexpectedDocument("FeatureCollection without features".to_string())
            })?;
            json_array(features)?.iter().map(read_feature).collect()
        }
        "Feature" => Ok(vec![read_feature(value)?]),
        _ => Ok(vec![Feature::new(read_geometry(value)?)]),
    }
}

fn type_of(value: &Value) -> Result<&str> {
    value
        .as_object()
        .ok_or_else(|| DecodeError::UnexpectedDocument("expected a JSON object".to_string()))?
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| DecodeError::UnexpectedDocument("missing \"type\" member".to_string()))
}

fn read_feature(value: &Value) -> Result<Feature> {
    if type_of(value)? != "Feature" {
        return Err(DecodeError::UnexpectedDocument(
            "FeatureCollection member is not a Feature".to_string(),
        ));
    }

    let geometry = match value.get("geometry") {
        None | Some(Value::Null) => None,
        Some(g) => Some(read_geometry(g)?),
    };

    let mut properties: Properties = value
        .get("properties")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    if let Some(id) = value.get("id") {
        properties.entry("id").or_insert_with(|| id.clone());
    }

    Ok(Feature::with_properties(geometry, properties))
}

fn read_geometry(value: &Value) -> Result<Geometry> {
    let kind = type_of(value)?;

    if kind == "GeometryCollection" {
        let geometries = value.get("geometries").ok_or_else(|| {
            DecodeError::InvalidGeometry("GeometryCollection without geometries".to_string())
        })?;
        let children = json_array(geometries)?
            .iter()
            .map(read_geometry)
            .collect::<Result<Vec<_>>>()?;
        return Ok(Geometry::GeometryCollection(children));
    }

    let coordinates = value
        .get("coordinates")
        .ok_or_else(|| DecodeError::InvalidGeometry(format!("{} without coordinates", kind)))?;

    match kind {
        "Point" => Ok(Geometry::Point(json_coord(coordinates)?)),
        "MultiPoint" => Ok(Geometry::MultiPoint(json_coords(coordinates)?)),
        "LineString" => Ok(Geometry::LineString(json_coords(coordinates)?)),
        "MultiLineString" => Ok(Geometry::MultiLineString(json_rings(coordinates)?)),
        "Polygon" => Ok(Geometry::Polygon(json_rings(coordinates)?)),
        "MultiPolygon" => Ok(Geometry::MultiPolygon(
            json_array(coordinates)?
                .iter()
                .map(json_rings)
                .collect::<Result<Vec<_>>>()?,
        )),
        other => Err(DecodeError::InvalidGeometry(format!(
            "unsupported geometry type '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tasker_models::{Coord, GeometryKind};

    #[test]
    fn test_feature_collection() {
        let text = json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "id": 4, "properties": {"name": "A"},
                 "geometry": {"type": "Point", "coordinates": [1, 2]}},
                {"type": "Feature", "properties": null, "geometry": null}
            ]
        })
        .to_string();

        let features = GeoJsonDecoder.decode(&text).unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].geometry, Some(Geometry::Point(Coord::new(1.0, 2.0))));
        assert_eq!(features[0].properties.get("name"), Some(&json!("A")));
        assert_eq!(features[0].properties.get("id"), Some(&json!(4)));
        assert!(features[1].geometry.is_none());
    }

    #[test]
    fn test_property_id_wins_over_feature_id() {
        let text = json!({
            "type": "Feature", "id": "outer", "properties": {"id": "inner"},
            "geometry": {"type": "Point", "coordinates": [0, 0]}
        })
        .to_string();

        let features = GeoJsonDecoder.decode(&text).unwrap();
        assert_eq!(features[0].properties.get("id"), Some(&json!("inner")));
    }

    #[test]
    fn test_bare_geometry_collection() {
        let text = json!({
            "type": "GeometryCollection",
            "geometries": [
                {"type": "LineString", "coordinates": [[0, 0], [1, 1]]},
                {"type": "MultiPolygon", "coordinates": [[[[0, 0], [1, 0], [1, 1], [0, 0]]]]}
            ]
        })
        .to_string();

        let features = GeoJsonDecoder.decode(&text).unwrap();
        assert_eq!(features.len(), 1);
        match features[0].geometry.as_ref().unwrap() {
            Geometry::GeometryCollection(children) => {
                assert_eq!(children[0].kind(), GeometryKind::LineString);
                assert_eq!(children[1].kind(), GeometryKind::MultiPolygon);
            }
            other => panic!("unexpected geometry: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_non_geojson() {
        assert!(GeoJsonDecoder.decode("").is_err());
        assert!(GeoJsonDecoder.decode("{\"type\":").is_err());
        assert!(GeoJsonDecoder.decode("[1, 2]").is_err());
        assert!(GeoJsonDecoder.decode(r#"{"rings": []}"#).is_err());
        assert!(GeoJsonDecoder
            .decode(r#"{"type": "Circle", "coordinates": [0, 0]}"#)
            .is_err());
    }

    #[test]
    fn test_empty_collection_has_no_features() {
        let features = GeoJsonDecoder
            .decode(r#"{"type": "FeatureCollection", "features": []}"#)
            .unwrap();
        assert!(features.is_empty());
    }
}
