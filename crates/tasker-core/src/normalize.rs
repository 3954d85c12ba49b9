//! Expansion of raw features into polygon features.
//!
//! Polygons and multi-polygons pass through unchanged unless they hold no
//! coordinates at all (`POLYGON EMPTY`, `"rings": []`). Closed rings taken
//! from line strings, linear rings and multi-line strings become single-ring
//! polygons. Collections are expanded depth-first. Everything else is dropped.

use tasker_models::{is_closed_ring, Feature, Geometry, PolygonFeature, PolygonGeometry, Properties};

/// Expands one raw feature into zero or more polygon features.
///
/// Every output carries its own copy of the feature's properties. A missing
/// feature or geometry yields nothing.
pub fn normalize(feature: Option<&Feature>) -> Vec<PolygonFeature> {
    let mut out = Vec::new();
    if let Some(Feature {
        geometry: Some(geometry),
        properties,
    }) = feature
    {
        expand(geometry, properties, &mut out);
    }
    out
}

/// Normalizes each feature in order and concatenates the results.
pub fn normalize_all<'a, I>(features: I) -> Vec<PolygonFeature>
where
    I: IntoIterator<Item = &'a Feature>,
{
    features
        .into_iter()
        .flat_map(|f| normalize(Some(f)))
        .collect()
}

fn expand(geometry: &Geometry, properties: &Properties, out: &mut Vec<PolygonFeature>) {
    match geometry {
        Geometry::Polygon(rings) => {
            push_non_empty(PolygonGeometry::Polygon(rings.clone()), properties, out)
        }
        Geometry::MultiPolygon(polygons) => {
            push_non_empty(PolygonGeometry::MultiPolygon(polygons.clone()), properties, out)
        }
        Geometry::GeometryCollection(children) => {
            for child in children {
                expand(child, properties, out);
            }
        }
        Geometry::MultiLineString(lines) => {
            for line in lines.iter().filter(|l| is_closed_ring(l)) {
                out.push(PolygonFeature::new(
                    PolygonGeometry::from_ring(line.clone()),
                    properties.clone(),
                ));
            }
        }
        Geometry::LineString(line) if is_closed_ring(line) => out.push(PolygonFeature::new(
            PolygonGeometry::from_ring(line.clone()),
            properties.clone(),
        )),
        Geometry::LinearRing(ring) => out.push(PolygonFeature::new(
            PolygonGeometry::from_ring(ring.clone()),
            properties.clone(),
        )),
        Geometry::LineString(_) | Geometry::Point(_) | Geometry::MultiPoint(_) => {}
    }
}

fn push_non_empty(geometry: PolygonGeometry, properties: &Properties, out: &mut Vec<PolygonFeature>) {
    if geometry.coords().next().is_some() {
        out.push(PolygonFeature::new(geometry, properties.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::{FormatDecoder, GeoJsonDecoder};
    use serde_json::json;
    use tasker_models::{Coord, Ring};

    fn c(x: f64, y: f64) -> Coord {
        Coord::new(x, y)
    }

    fn closed() -> Ring {
        vec![c(0.0, 0.0), c(1.0, 0.0), c(1.0, 1.0), c(0.0, 0.0)]
    }

    fn open() -> Ring {
        vec![c(0.0, 0.0), c(1.0, 0.0), c(1.0, 1.0), c(0.0, 1.0)]
    }

    #[test]
    fn test_closed_line_string_becomes_polygon() {
        let feature = Feature::new(Geometry::LineString(closed()));
        let out = normalize(Some(&feature));

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].geometry, PolygonGeometry::Polygon(vec![closed()]));
    }

    #[test]
    fn test_open_line_string_dropped() {
        let feature = Feature::new(Geometry::LineString(open()));
        assert!(normalize(Some(&feature)).is_empty());
    }

    #[test]
    fn test_short_ring_is_not_closed() {
        let feature = Feature::new(Geometry::LineString(vec![c(0.0, 0.0), c(1.0, 1.0), c(0.0, 0.0)]));
        assert!(normalize(Some(&feature)).is_empty());
    }

    #[test]
    fn test_linear_ring_always_kept() {
        let feature = Feature::new(Geometry::LinearRing(open()));
        assert_eq!(normalize(Some(&feature)).len(), 1);
    }

    #[test]
    fn test_missing_feature_or_geometry() {
        assert!(normalize(None).is_empty());
        assert!(normalize(Some(&Feature::default())).is_empty());
    }

    #[test]
    fn test_points_dropped() {
        let point = Feature::new(Geometry::Point(c(1.0, 1.0)));
        let multi = Feature::new(Geometry::MultiPoint(vec![c(1.0, 1.0)]));
        assert!(normalize_all([&point, &multi]).is_empty());
    }

    #[test]
    fn test_collection_keeps_child_order() {
        let square = vec![c(5.0, 5.0), c(6.0, 5.0), c(6.0, 6.0), c(5.0, 6.0), c(5.0, 5.0)];
        let feature = Feature::new(Geometry::GeometryCollection(vec![
            Geometry::LineString(closed()),
            Geometry::Point(c(3.0, 3.0)),
            Geometry::Polygon(vec![square.clone()]),
        ]))
        .property("name", "mixed");

        let out = normalize(Some(&feature));
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].geometry, PolygonGeometry::Polygon(vec![closed()]));
        assert_eq!(out[1].geometry, PolygonGeometry::Polygon(vec![square]));
        assert!(out.iter().all(|f| f.properties.get("name") == Some(&json!("mixed"))));
    }

    #[test]
    fn test_multi_line_string_keeps_closed_components() {
        let mut feature = Feature::new(Geometry::MultiLineString(vec![
            open(),
            closed(),
            vec![c(9.0, 9.0), c(8.0, 8.0)],
            closed(),
        ]))
        .property("kind", "fence");

        let mut out = normalize(Some(&feature));
        assert_eq!(out.len(), 2);

        // Sibling outputs own independent property bags.
        out[0].properties.insert("kind".into(), json!("changed"));
        assert_eq!(out[1].properties.get("kind"), Some(&json!("fence")));
        feature.properties.clear();
        assert_eq!(out[1].properties.get("kind"), Some(&json!("fence")));
    }

    #[test]
    fn test_mixed_geojson_document() {
        let document = json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {}, "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}},
                {"type": "Feature", "properties": {}, "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [[[[0, 0], [1, 0], [1, 1], [0, 0]]], [[[2, 2], [3, 2], [3, 3], [2, 2]]]]}},
                {"type": "Feature", "properties": {}, "geometry": {
                    "type": "MultiLineString",
                    "coordinates": [
                        [[0, 0], [1, 0], [1, 1], [0, 0]],
                        [[0, 0], [1, 0], [1, 1]],
                        [[0, 0], [1, 0]],
                        [[5, 5], [6, 6], [7, 7], [8, 8]]
                    ]}},
                {"type": "Feature", "properties": {}, "geometry": {
                    "type": "GeometryCollection",
                    "geometries": [
                        {"type": "LineString", "coordinates": [[0, 0], [1, 0], [1, 1], [0, 0]]},
                        {"type": "Point", "coordinates": [4, 4]},
                        {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}
                    ]}}
            ]
        })
        .to_string();

        let features = GeoJsonDecoder.decode(&document).unwrap();
        assert_eq!(normalize_all(&features).len(), 5);
    }

    #[test]
    fn test_empty_polygons_dropped() {
        let features = [
            Feature::new(Geometry::Polygon(vec![])),
            Feature::new(Geometry::Polygon(vec![vec![]])),
            Feature::new(Geometry::MultiPolygon(vec![])),
            Feature::new(Geometry::MultiPolygon(vec![vec![vec![]]])),
        ];
        assert!(normalize_all(&features).is_empty());
    }
}
