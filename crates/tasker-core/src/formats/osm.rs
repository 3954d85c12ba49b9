//! OSM-XML decoder.
//!
//! Ways become polygons when closed (first node ref equals last) and line
//! strings otherwise. Only tagged nodes become point features. Relations
//! are ignored.

use std::collections::HashMap;

use serde_json::Value;
use tasker_models::{Coord, Feature, Geometry, Properties};
use tracing::trace;

use super::{parse_number, FormatDecoder, GeometryFormat, Result};
use crate::error::DecodeError;
use crate::xml::{parse_document, XmlElement};

#[derive(Debug, Clone, Copy, Default)]
pub struct OsmXmlDecoder;

impl FormatDecoder for OsmXmlDecoder {
    fn format(&self) -> GeometryFormat {
        GeometryFormat::OsmXml
    }

    fn decode(&self, text: &str) -> Result<Vec<Feature>> {
        let root = parse_document(text)?;
        if root.name != "osm" {
            return Err(DecodeError::UnexpectedDocument(format!(
                "root element is <{}>, expected <osm>",
                root.name
            )));
        }

        let mut nodes: HashMap<&str, Coord> = HashMap::new();
        for node in root.children_named("node") {
            if let (Some(id), Some(lat), Some(lon)) = (node.attr("id"), node.attr("lat"), node.attr("lon")) {
                let coord = Coord::new(parse_number(lon, "lon")?, parse_number(lat, "lat")?);
                nodes.insert(id, coord);
            }
        }

        let mut features = Vec::new();
        for element in &root.children {
            match element.name.as_str() {
                "node" => {
                    let properties = tags(element);
                    if properties.is_empty() {
                        continue;
                    }
                    if let Some(coord) = element.attr("id").and_then(|id| nodes.get(id)) {
                        features.push(Feature::with_properties(
                            Some(Geometry::Point(*coord)),
                            with_osm_id(properties, element),
                        ));
                    }
                }
                "way" => {
                    if let Some(feature) = read_way(element, &nodes) {
                        features.push(feature);
                    }
                }
                _ => {}
            }
        }

        Ok(features)
    }
}

fn read_way(way: &XmlElement, nodes: &HashMap<&str, Coord>) -> Option<Feature> {
    let refs: Vec<&str> = way.children_named("nd").filter_map(|nd| nd.attr("ref")).collect();
    let coords: Vec<Coord> = refs.iter().filter_map(|r| nodes.get(r).copied()).collect();

    if coords.len() < 2 {
        trace!(way = ?way.attr("id"), "Skipping way with unresolved nodes");
        return None;
    }

    let closed = refs.len() > 2 && refs.first() == refs.last();
    let geometry = if closed {
        Geometry::Polygon(vec![coords])
    } else {
        Geometry::LineString(coords)
    };

    Some(Feature::with_properties(
        Some(geometry),
        with_osm_id(tags(way), way),
    ))
}

fn tags(element: &XmlElement) -> Properties {
    element
        .children_named("tag")
        .filter_map(|tag| Some((tag.attr("k")?.to_string(), Value::from(tag.attr("v")?))))
        .collect()
}

fn with_osm_id(mut properties: Properties, element: &XmlElement) -> Properties {
    if let Some(id) = element.attr("id") {
        properties
            .entry("osm_id")
            .or_insert_with(|| Value::from(id));
    }
    properties
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasker_models::GeometryKind;

    const DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6">
  <node id="1" lat="0" lon="0"/>
  <node id="2" lat="0" lon="1"/>
  <node id="3" lat="1" lon="1">
    <tag k="amenity" v="bench"/>
  </node>
  <way id="10">
    <nd ref="1"/><nd ref="2"/><nd ref="3"/><nd ref="1"/>
    <tag k="landuse" v="meadow"/>
  </way>
  <way id="11">
    <nd ref="1"/><nd ref="2"/>
  </way>
  <way id="12">
    <nd ref="99"/>
  </way>
</osm>"#;

    #[test]
    fn test_ways_and_tagged_nodes() {
        let features = OsmXmlDecoder.decode(DOC).unwrap();
        let kinds: Vec<GeometryKind> = features
            .iter()
            .map(|f| f.geometry.as_ref().unwrap().kind())
            .collect();

        assert_eq!(
            kinds,
            vec![GeometryKind::Point, GeometryKind::Polygon, GeometryKind::LineString]
        );
        assert_eq!(features[1].properties.get("landuse"), Some(&Value::from("meadow")));
        assert_eq!(features[1].properties.get("osm_id"), Some(&Value::from("10")));
    }

    #[test]
    fn test_closed_way_ring() {
        let features = OsmXmlDecoder.decode(DOC).unwrap();
        match features[1].geometry.as_ref().unwrap() {
            Geometry::Polygon(rings) => {
                assert_eq!(rings[0].len(), 4);
                assert_eq!(rings[0][0], rings[0][3]);
            }
            other => panic!("unexpected geometry: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_other_xml() {
        assert!(OsmXmlDecoder.decode("<gpx></gpx>").is_err());
        assert!(OsmXmlDecoder.decode("{}").is_err());
    }
}
