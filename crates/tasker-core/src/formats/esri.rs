//! Esri-JSON decoder.
//!
//! Polygon rings follow the Esri convention: clockwise rings are exteriors,
//! counter-clockwise rings are holes of the preceding exterior.

use serde_json::Value;
use tasker_models::{Coord, Feature, Geometry, Properties, Ring};

use super::{json_array, json_coords, json_rings, FormatDecoder, GeometryFormat, Result};
use crate::error::DecodeError;

#[derive(Debug, Clone, Copy, Default)]
pub struct EsriJsonDecoder;

impl FormatDecoder for EsriJsonDecoder {
    fn format(&self) -> GeometryFormat {
        GeometryFormat::EsriJson
    }

    fn decode(&self, text: &str) -> Result<Vec<Feature>> {
        let value: Value = serde_json::from_str(text)?;
        if !value.is_object() {
            return Err(DecodeError::UnexpectedDocument(
                "expected a JSON object".to_string(),
            ));
        }

        if let Some(features) = value.get("features") {
            return json_array(features)?.iter().map(read_feature).collect();
        }
        if value.get("geometry").is_some() || value.get("attributes").is_some() {
            return Ok(vec![read_feature(&value)?]);
        }
        Ok(vec![Feature::new(read_geometry(&value)?)])
    }
}

fn read_feature(value: &Value) -> Result<Feature> {
    let geometry = match value.get("geometry") {
        None | Some(Value::Null) => None,
        Some(g) => Some(read_geometry(g)?),
    };
    let properties: Properties = value
        .get("attributes")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    Ok(Feature::with_properties(geometry, properties))
}

fn read_geometry(value: &Value) -> Result<Geometry> {
    if let (Some(x), Some(y)) = (
        value.get("x").and_then(Value::as_f64),
        value.get("y").and_then(Value::as_f64),
    ) {
        return Ok(Geometry::Point(Coord::new(x, y)));
    }
    if let Some(points) = value.get("points") {
        return Ok(Geometry::MultiPoint(json_coords(points)?));
    }
    if let Some(paths) = value.get("paths") {
        let mut paths = json_rings(paths)?;
        return Ok(if paths.len() == 1 {
            Geometry::LineString(paths.remove(0))
        } else {
            Geometry::MultiLineString(paths)
        });
    }
    if let Some(rings) = value.get("rings") {
        return rings_to_geometry(json_rings(rings)?);
    }
    Err(DecodeError::InvalidGeometry(
        "unrecognized Esri geometry".to_string(),
    ))
}

fn rings_to_geometry(rings: Vec<Ring>) -> Result<Geometry> {
    let mut polygons: Vec<Vec<Ring>> = Vec::new();
    for ring in rings.into_iter().filter(|r| !r.is_empty()) {
        match polygons.last_mut() {
            Some(polygon) if !is_clockwise(&ring) => polygon.push(ring),
            _ => polygons.push(vec![ring]),
        }
    }

    match polygons.len() {
        0 => Err(DecodeError::InvalidGeometry(
            "polygon has no rings".to_string(),
        )),
        1 => Ok(Geometry::Polygon(polygons.remove(0))),
        _ => Ok(Geometry::MultiPolygon(polygons)),
    }
}

/// Shoelace sign test; negative area means clockwise in a y-up system.
fn is_clockwise(ring: &[Coord]) -> bool {
    let area: f64 = ring
        .windows(2)
        .map(|w| (w[1].x - w[0].x) * (w[1].y + w[0].y))
        .sum();
    area > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tasker_models::GeometryKind;

    fn clockwise(offset: f64) -> Value {
        json!([[offset, 0], [offset, 1], [offset + 1.0, 1], [offset + 1.0, 0], [offset, 0]])
    }

    #[test]
    fn test_feature_set() {
        let text = json!({
            "geometryType": "esriGeometryPolygon",
            "features": [
                {"attributes": {"OBJECTID": 1, "name": "Lot"}, "geometry": {"rings": [clockwise(0.0)]}},
                {"attributes": {"OBJECTID": 2}, "geometry": {"x": 3, "y": 4}}
            ]
        })
        .to_string();

        let features = EsriJsonDecoder.decode(&text).unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].geometry.as_ref().unwrap().kind(), GeometryKind::Polygon);
        assert_eq!(features[0].properties.get("name"), Some(&json!("Lot")));
        assert_eq!(features[1].geometry, Some(Geometry::Point(Coord::new(3.0, 4.0))));
    }

    #[test]
    fn test_two_outer_rings_become_multipolygon() {
        let text = json!({"rings": [clockwise(0.0), clockwise(5.0)]}).to_string();
        let features = EsriJsonDecoder.decode(&text).unwrap();
        assert_eq!(
            features[0].geometry.as_ref().unwrap().kind(),
            GeometryKind::MultiPolygon
        );
    }

    #[test]
    fn test_counter_clockwise_ring_is_hole() {
        let hole = json!([[0.2, 0.2], [0.8, 0.2], [0.8, 0.8], [0.2, 0.8], [0.2, 0.2]]);
        let text = json!({"rings": [clockwise(0.0), hole]}).to_string();
        match EsriJsonDecoder.decode(&text).unwrap()[0].geometry.as_ref().unwrap() {
            Geometry::Polygon(rings) => assert_eq!(rings.len(), 2),
            other => panic!("unexpected geometry: {:?}", other),
        }
    }

    #[test]
    fn test_paths() {
        let single = json!({"paths": [[[0, 0], [1, 1]]]}).to_string();
        let multi = json!({"paths": [[[0, 0], [1, 1]], [[2, 2], [3, 3]]]}).to_string();
        assert_eq!(
            EsriJsonDecoder.decode(&single).unwrap()[0].geometry.as_ref().unwrap().kind(),
            GeometryKind::LineString
        );
        assert_eq!(
            EsriJsonDecoder.decode(&multi).unwrap()[0].geometry.as_ref().unwrap().kind(),
            GeometryKind::MultiLineString
        );
    }

    #[test]
    fn test_rejects_unknown_object() {
        assert!(EsriJsonDecoder.decode(r#"{"type": "Polygon"}"#).is_err());
        assert!(EsriJsonDecoder.decode("[]").is_err());
    }

    #[test]
    fn test_rejects_polygon_without_rings() {
        for text in [r#"{"rings": []}"#, r#"{"rings": [[]]}"#] {
            assert!(matches!(
                EsriJsonDecoder.decode(text),
                Err(DecodeError::InvalidGeometry(_))
            ));
        }
    }
}
