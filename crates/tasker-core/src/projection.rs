//! Reprojection between geographic (EPSG:4326) and Web Mercator (EPSG:3857).

use std::f64::consts::PI;

use tasker_models::{Coord, PolygonGeometry};

/// Sphere radius used by EPSG:3857, in metres.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude limit of the Web Mercator square, in degrees.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_6;

/// Projects a lon/lat coordinate to Web Mercator metres.
///
/// Latitude is clamped to the valid band.
pub fn project_coord(c: Coord) -> Coord {
    let lat = c.y.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    Coord::new(
        EARTH_RADIUS * c.x.to_radians(),
        EARTH_RADIUS * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln(),
    )
}

/// Converts Web Mercator metres back to lon/lat.
pub fn unproject_coord(c: Coord) -> Coord {
    Coord::new(
        (c.x / EARTH_RADIUS).to_degrees(),
        (2.0 * (c.y / EARTH_RADIUS).exp().atan() - PI / 2.0).to_degrees(),
    )
}

/// Reprojects a polygon geometry from EPSG:4326 to EPSG:3857.
pub fn to_projected(geometry: &PolygonGeometry) -> PolygonGeometry {
    geometry.map_coords(&project_coord)
}

/// Reprojects a polygon geometry from EPSG:3857 to EPSG:4326.
pub fn to_geographic(geometry: &PolygonGeometry) -> PolygonGeometry {
    geometry.map_coords(&unproject_coord)
}
