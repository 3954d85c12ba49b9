//! Subdivision grids over a polygon.
//!
//! Grids are laid over the polygon's bounding box in projected metres. A cell
//! is kept when it touches the polygon; cells are not clipped to it.

use std::fmt;
use std::str::FromStr;

use tasker_models::{Coord, PolygonGeometry, Ring};

use crate::error::GridError;

/// Upper bound on candidate cells for one subdivision.
pub const MAX_GRID_CELLS: u64 = 10_000;

/// Shape of the grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridShape {
    Square,
    /// Flat-topped hexagons; the cell size is the side length.
    Hexagon,
    /// Squares split along their rising diagonal.
    Triangle,
}

impl FromStr for GridShape {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "square" | "squaregrid" => Ok(GridShape::Square),
            "hexagon" | "hex" | "hexgrid" => Ok(GridShape::Hexagon),
            "triangle" | "trianglegrid" => Ok(GridShape::Triangle),
            _ => Err(GridError::UnknownShape(s.to_string())),
        }
    }
}

impl fmt::Display for GridShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GridShape::Square => "square",
            GridShape::Hexagon => "hexagon",
            GridShape::Triangle => "triangle",
        };
        write!(f, "{}", s)
    }
}

/// Checks that a cell size is finite and positive.
pub fn validate_cell_size(cell_size: f64) -> Result<f64, GridError> {
    if cell_size.is_finite() && cell_size > 0.0 {
        Ok(cell_size)
    } else {
        Err(GridError::InvalidCellSize(cell_size))
    }
}

/// Computes the grid cells of `shape` that touch `geometry`.
///
/// Fails on an invalid cell size, an empty or unbounded geometry, or a grid
/// larger than [`MAX_GRID_CELLS`].
pub fn grid_cells(
    geometry: &PolygonGeometry,
    shape: GridShape,
    cell_size: f64,
) -> Result<Vec<PolygonGeometry>, GridError> {
    let size = validate_cell_size(cell_size)?;
    let (min, max) = geometry.bounding_box().ok_or(GridError::EmptyGeometry)?;
    let (width, height) = (max.x - min.x, max.y - min.y);
    if !(width.is_finite() && height.is_finite()) {
        return Err(GridError::InvalidExtent);
    }

    let candidates = match shape {
        GridShape::Square => {
            let (cols, rows) = span(width, size, height, size);
            let (cols, rows) = checked_dims(cols, rows, 1.0)?;
            square_cells(min, size, cols, rows)
        }
        GridShape::Triangle => {
            let (cols, rows) = span(width, size, height, size);
            let (cols, rows) = checked_dims(cols, rows, 2.0)?;
            square_cells(min, size, cols, rows)
                .into_iter()
                .flat_map(split_square)
                .collect()
        }
        GridShape::Hexagon => {
            let row_step = 3f64.sqrt() * size;
            let (cols, rows) = span(width, 1.5 * size, height, row_step);
            let (cols, rows) = checked_dims(cols + 1.0, rows + 1.0, 1.0)?;
            hex_cells(min, size, cols, rows)
        }
    };

    let edges: Vec<(Coord, Coord)> = geometry
        .polygons()
        .into_iter()
        .flat_map(|rings| rings.iter().flat_map(|r| r.windows(2).map(|w| (w[0], w[1]))))
        .collect();

    Ok(candidates
        .into_iter()
        .filter(|cell| touches(geometry, &edges, cell))
        .map(PolygonGeometry::from_ring)
        .collect())
}

/// Column and row counts, still in floating point.
fn span(width: f64, col_step: f64, height: f64, row_step: f64) -> (f64, f64) {
    let count = |extent: f64, step: f64| (extent / step).ceil().max(1.0);
    (count(width, col_step), count(height, row_step))
}

/// Checks `cols * rows * cells_per_slot` against the limit before casting.
fn checked_dims(cols: f64, rows: f64, cells_per_slot: f64) -> Result<(usize, usize), GridError> {
    let count = cols * rows * cells_per_slot;
    if !count.is_finite() || count > MAX_GRID_CELLS as f64 {
        Err(GridError::TooManyCells {
            count: count.min(u64::MAX as f64) as u64,
            max: MAX_GRID_CELLS,
        })
    } else {
        Ok((cols as usize, rows as usize))
    }
}

fn square_cells(min: Coord, size: f64, cols: usize, rows: usize) -> Vec<Ring> {
    let mut cells = Vec::with_capacity(cols * rows);
    for i in 0..cols {
        for j in 0..rows {
            let x = min.x + i as f64 * size;
            let y = min.y + j as f64 * size;
            cells.push(vec![
                Coord::new(x, y),
                Coord::new(x + size, y),
                Coord::new(x + size, y + size),
                Coord::new(x, y + size),
                Coord::new(x, y),
            ]);
        }
    }
    cells
}

fn split_square(square: Ring) -> [Ring; 2] {
    let (a, b, c, d) = (square[0], square[1], square[2], square[3]);
    [vec![a, b, c, a], vec![a, c, d, a]]
}

fn hex_cells(min: Coord, side: f64, cols: usize, rows: usize) -> Vec<Ring> {
    let row_step = 3f64.sqrt() * side;
    let mut cells = Vec::with_capacity(cols * rows);
    for i in 0..cols {
        let offset = if i % 2 == 1 { row_step / 2.0 } else { 0.0 };
        for j in 0..rows {
            let center = Coord::new(
                min.x + i as f64 * 1.5 * side,
                min.y + j as f64 * row_step + offset,
            );
            let mut ring: Ring = (0..6)
                .map(|k| {
                    let angle = (60.0 * k as f64).to_radians();
                    Coord::new(center.x + side * angle.cos(), center.y + side * angle.sin())
                })
                .collect();
            ring.push(ring[0]);
            cells.push(ring);
        }
    }
    cells
}

fn touches(geometry: &PolygonGeometry, edges: &[(Coord, Coord)], cell: &Ring) -> bool {
    let corners = &cell[..cell.len() - 1];
    let centroid = Coord::new(
        corners.iter().map(|c| c.x).sum::<f64>() / corners.len() as f64,
        corners.iter().map(|c| c.y).sum::<f64>() / corners.len() as f64,
    );
    if geometry.contains(centroid) || corners.iter().any(|c| geometry.contains(*c)) {
        return true;
    }

    let cell_polygon = PolygonGeometry::from_ring(cell.clone());
    if geometry.coords().any(|v| cell_polygon.contains(v)) {
        return true;
    }

    cell.windows(2).any(|w| {
        edges
            .iter()
            .any(|(p, q)| segments_intersect(w[0], w[1], *p, *q))
    })
}

fn segments_intersect(a: Coord, b: Coord, c: Coord, d: Coord) -> bool {
    let orient = |p: Coord, q: Coord, r: Coord| (q.x - p.x) * (r.y - p.y) - (q.y - p.y) * (r.x - p.x);
    let (d1, d2) = (orient(c, d, a), orient(c, d, b));
    let (d3, d4) = (orient(a, b, c), orient(a, b, d));
    (d1 > 0.0) != (d2 > 0.0) && (d3 > 0.0) != (d4 > 0.0) && d1 != 0.0 && d2 != 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_polygon(size: f64) -> PolygonGeometry {
        PolygonGeometry::from_ring(vec![
            Coord::new(0.0, 0.0),
            Coord::new(size, 0.0),
            Coord::new(size, size),
            Coord::new(0.0, size),
            Coord::new(0.0, 0.0),
        ])
    }

    #[test]
    fn test_shape_names() {
        assert_eq!("square".parse::<GridShape>().unwrap(), GridShape::Square);
        assert_eq!(" HexGrid ".parse::<GridShape>().unwrap(), GridShape::Hexagon);
        assert_eq!("triangle".parse::<GridShape>().unwrap(), GridShape::Triangle);
        assert_eq!(
            "circle".parse::<GridShape>(),
            Err(GridError::UnknownShape("circle".to_string()))
        );
    }

    #[test]
    fn test_invalid_cell_sizes() {
        let polygon = square_polygon(100.0);
        for size in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                grid_cells(&polygon, GridShape::Square, size),
                Err(GridError::InvalidCellSize(_))
            ));
        }
    }

    #[test]
    fn test_square_grid_covers_polygon() {
        let cells = grid_cells(&square_polygon(100.0), GridShape::Square, 50.0).unwrap();
        assert_eq!(cells.len(), 4);
    }

    #[test]
    fn test_triangle_grid_doubles_squares() {
        let cells = grid_cells(&square_polygon(100.0), GridShape::Triangle, 50.0).unwrap();
        assert_eq!(cells.len(), 8);
    }

    #[test]
    fn test_hex_grid_touches_polygon() {
        let polygon = square_polygon(100.0);
        let cells = grid_cells(&polygon, GridShape::Hexagon, 20.0).unwrap();
        assert!(!cells.is_empty());
        for cell in &cells {
            match cell {
                PolygonGeometry::Polygon(rings) => assert_eq!(rings[0].len(), 7),
                other => panic!("unexpected cell: {:?}", other),
            }
        }
    }

    #[test]
    fn test_cells_outside_concave_polygon_dropped() {
        // L-shape: the upper right quadrant is empty.
        let polygon = PolygonGeometry::from_ring(vec![
            Coord::new(0.0, 0.0),
            Coord::new(100.0, 0.0),
            Coord::new(100.0, 40.0),
            Coord::new(40.0, 40.0),
            Coord::new(40.0, 100.0),
            Coord::new(0.0, 100.0),
            Coord::new(0.0, 0.0),
        ]);
        let cells = grid_cells(&polygon, GridShape::Square, 25.0).unwrap();
        let upper_right = cells.iter().any(|cell| {
            let (min, _) = cell.bounding_box().unwrap();
            min.x >= 75.0 && min.y >= 75.0
        });
        assert!(!upper_right);
        assert!(cells.len() < 16);
    }

    #[test]
    fn test_too_many_cells() {
        let result = grid_cells(&square_polygon(100_000.0), GridShape::Square, 1.0);
        assert!(matches!(result, Err(GridError::TooManyCells { .. })));
    }

    #[test]
    fn test_empty_geometry() {
        let result = grid_cells(&PolygonGeometry::Polygon(vec![]), GridShape::Square, 1.0);
        assert_eq!(result, Err(GridError::EmptyGeometry));
    }

    #[test]
    fn test_non_finite_extent() {
        let polygon = PolygonGeometry::from_ring(vec![
            Coord::new(0.0, 0.0),
            Coord::new(f64::INFINITY, 0.0),
            Coord::new(f64::INFINITY, 10.0),
            Coord::new(0.0, 0.0),
        ]);
        for shape in [GridShape::Square, GridShape::Hexagon, GridShape::Triangle] {
            assert_eq!(grid_cells(&polygon, shape, 100.0), Err(GridError::InvalidExtent));
        }
    }

    #[test]
    fn test_huge_finite_extent_rejected_before_allocation() {
        let polygon = square_polygon(f64::MAX / 4.0);
        for shape in [GridShape::Square, GridShape::Hexagon, GridShape::Triangle] {
            assert!(matches!(
                grid_cells(&polygon, shape, 1e-300),
                Err(GridError::TooManyCells { .. })
            ));
        }
    }
}
