//! GPX decoder: waypoints, routes and tracks.

use serde_json::Value;
use tasker_models::{Coord, Feature, Geometry, Properties, Ring};

use super::{parse_number, FormatDecoder, GeometryFormat, Result};
use crate::error::DecodeError;
use crate::xml::{parse_document, XmlElement};

#[derive(Debug, Clone, Copy, Default)]
pub struct GpxDecoder;

impl FormatDecoder for GpxDecoder {
    fn format(&self) -> GeometryFormat {
        GeometryFormat::Gpx
    }

    fn decode(&self, text: &str) -> Result<Vec<Feature>> {
        let root = parse_document(text)?;
        if root.name != "gpx" {
            return Err(DecodeError::UnexpectedDocument(format!(
                "root element is <{}>, expected <gpx>",
                root.name
            )));
        }

        let mut features = Vec::new();
        for element in &root.children {
            let geometry = match element.name.as_str() {
                "wpt" => Geometry::Point(point(element)?),
                "rte" => Geometry::LineString(points(element, "rtept")?),
                "trk" => Geometry::MultiLineString(
                    element
                        .children_named("trkseg")
                        .map(|seg| points(seg, "trkpt"))
                        .collect::<Result<Vec<Ring>>>()?,
                ),
                _ => continue,
            };
            features.push(Feature::with_properties(Some(geometry), metadata(element)));
        }

        Ok(features)
    }
}

fn point(element: &XmlElement) -> Result<Coord> {
    let lat = element
        .attr("lat")
        .ok_or_else(|| DecodeError::InvalidGeometry(format!("<{}> without lat", element.name)))?;
    let lon = element
        .attr("lon")
        .ok_or_else(|| DecodeError::InvalidGeometry(format!("<{}> without lon", element.name)))?;
    Ok(Coord::new(parse_number(lon, "lon")?, parse_number(lat, "lat")?))
}

fn points(element: &XmlElement, name: &str) -> Result<Ring> {
    element.children_named(name).map(point).collect()
}

/// Simple text children (name, desc, type, ...) as properties.
fn metadata(element: &XmlElement) -> Properties {
    element
        .children
        .iter()
        .filter(|c| c.children.is_empty() && !c.text().is_empty())
        .map(|c| (c.name.clone(), Value::from(c.text())))
        .collect()
}
