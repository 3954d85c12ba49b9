//! Geometry types for Tasker.
//!
//! Geometries are plain coordinate containers. Whether a coordinate is
//! geographic (lon/lat) or projected (metres) is decided by the caller.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coord {
    /// Longitude or easting.
    pub x: f64,
    /// Latitude or northing.
    pub y: f64,
}

impl Coord {
    /// Creates a new coordinate.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Coord {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Coord> for [f64; 2] {
    fn from(c: Coord) -> Self {
        [c.x, c.y]
    }
}

impl From<(f64, f64)> for Coord {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// A sequence of coordinates forming one ring or line.
pub type Ring = Vec<Coord>;

/// Returns true if the coordinates form a closed ring.
///
/// A closed ring has at least four points and its first point equals its
/// last point exactly.
pub fn is_closed_ring(coords: &[Coord]) -> bool {
    match (coords.first(), coords.last()) {
        (Some(first), Some(last)) => coords.len() >= 4 && first == last,
        _ => false,
    }
}

/// Kind of a geometry, without its coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    MultiPoint,
    LineString,
    LinearRing,
    MultiLineString,
    Polygon,
    MultiPolygon,
    GeometryCollection,
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GeometryKind::Point => "Point",
            GeometryKind::MultiPoint => "MultiPoint",
            GeometryKind::LineString => "LineString",
            GeometryKind::LinearRing => "LinearRing",
            GeometryKind::MultiLineString => "MultiLineString",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::MultiPolygon => "MultiPolygon",
            GeometryKind::GeometryCollection => "GeometryCollection",
        };
        write!(f, "{}", s)
    }
}

/// Any geometry a decoder can produce.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Coord),
    MultiPoint(Vec<Coord>),
    LineString(Ring),
    LinearRing(Ring),
    MultiLineString(Vec<Ring>),
    /// Exterior ring first, then holes.
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
    GeometryCollection(Vec<Geometry>),
}

impl Geometry {
    /// Returns the kind of this geometry.
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point(_) => GeometryKind::Point,
            Geometry::MultiPoint(_) => GeometryKind::MultiPoint,
            Geometry::LineString(_) => GeometryKind::LineString,
            Geometry::LinearRing(_) => GeometryKind::LinearRing,
            Geometry::MultiLineString(_) => GeometryKind::MultiLineString,
            Geometry::Polygon(_) => GeometryKind::Polygon,
            Geometry::MultiPolygon(_) => GeometryKind::MultiPolygon,
            Geometry::GeometryCollection(_) => GeometryKind::GeometryCollection,
        }
    }

    /// Applies `f` to every coordinate, keeping the structure.
    pub fn map_coords<F: Fn(Coord) -> Coord>(&self, f: &F) -> Self {
        match self {
            Geometry::Point(c) => Geometry::Point(f(*c)),
            Geometry::MultiPoint(cs) => Geometry::MultiPoint(map_ring(cs, f)),
            Geometry::LineString(cs) => Geometry::LineString(map_ring(cs, f)),
            Geometry::LinearRing(cs) => Geometry::LinearRing(map_ring(cs, f)),
            Geometry::MultiLineString(lines) => Geometry::MultiLineString(map_rings(lines, f)),
            Geometry::Polygon(rings) => Geometry::Polygon(map_rings(rings, f)),
            Geometry::MultiPolygon(polys) => {
                Geometry::MultiPolygon(polys.iter().map(|p| map_rings(p, f)).collect())
            }
            Geometry::GeometryCollection(children) => Geometry::GeometryCollection(
                children.iter().map(|g| g.map_coords(f)).collect(),
            ),
        }
    }
}

impl From<PolygonGeometry> for Geometry {
    fn from(polygon: PolygonGeometry) -> Self {
        match polygon {
            PolygonGeometry::Polygon(rings) => Geometry::Polygon(rings),
            PolygonGeometry::MultiPolygon(polys) => Geometry::MultiPolygon(polys),
        }
    }
}

fn map_ring<F: Fn(Coord) -> Coord>(ring: &[Coord], f: &F) -> Ring {
    ring.iter().map(|c| f(*c)).collect()
}

fn map_rings<F: Fn(Coord) -> Coord>(rings: &[Ring], f: &F) -> Vec<Ring> {
    rings.iter().map(|r| map_ring(r, f)).collect()
}

/// The polygon-like geometry a task draft is made of.
///
/// Serializes as a GeoJSON geometry object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum PolygonGeometry {
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
}

impl PolygonGeometry {
    /// Creates a polygon from a single exterior ring.
    pub fn from_ring(ring: Ring) -> Self {
        PolygonGeometry::Polygon(vec![ring])
    }

    /// Returns the polygons as slices of rings.
    pub fn polygons(&self) -> Vec<&[Ring]> {
        match self {
            PolygonGeometry::Polygon(rings) => vec![rings.as_slice()],
            PolygonGeometry::MultiPolygon(polys) => polys.iter().map(|p| p.as_slice()).collect(),
        }
    }

    /// Iterates over every coordinate of every ring.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        self.polygons()
            .into_iter()
            .flat_map(|rings| rings.iter().flat_map(|r| r.iter().copied()))
    }

    /// Applies `f` to every coordinate, keeping the structure.
    pub fn map_coords<F: Fn(Coord) -> Coord>(&self, f: &F) -> Self {
        match self {
            PolygonGeometry::Polygon(rings) => PolygonGeometry::Polygon(map_rings(rings, f)),
            PolygonGeometry::MultiPolygon(polys) => {
                PolygonGeometry::MultiPolygon(polys.iter().map(|p| map_rings(p, f)).collect())
            }
        }
    }

    /// Returns the (min, max) corners of the bounding box.
    ///
    /// Returns `None` for a geometry without coordinates.
    pub fn bounding_box(&self) -> Option<(Coord, Coord)> {
        self.coords().fold(None, |acc, c| match acc {
            None => Some((c, c)),
            Some((min, max)) => Some((
                Coord::new(min.x.min(c.x), min.y.min(c.y)),
                Coord::new(max.x.max(c.x), max.y.max(c.y)),
            )),
        })
    }

    /// Returns true if the point lies inside the geometry.
    ///
    /// Uses the even-odd rule per polygon, so holes are excluded.
    pub fn contains(&self, point: Coord) -> bool {
        self.polygons().into_iter().any(|rings| {
            rings
                .iter()
                .filter(|ring| ring_contains(ring, point))
                .count()
                % 2
                == 1
        })
    }
}

/// Ray-casting point-in-ring test.
pub(crate) fn ring_contains(ring: &[Coord], point: Coord) -> bool {
    let mut inside = false;
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > point.y) != (b.y > point.y)
            && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}
