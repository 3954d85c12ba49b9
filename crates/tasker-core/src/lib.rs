//! Tasker Core - geometry ingestion for task drafts.
//!
//! This crate turns spatial payloads of unknown format into polygon features:
//!
//! - **formats**: decoders for GeoJSON, OSM-XML, GPX, Esri-JSON, KML and WKT
//! - **parser**: the format auto-detection chain over those decoders
//! - **normalize**: expansion of arbitrary geometries into polygon features
//! - **projection**: EPSG:4326 <-> EPSG:3857 reprojection
//! - **grid**: square, hexagon and triangle subdivision grids
//! - **fetch**: loading payloads from a remote URL
//! - **import**: reading project export documents
//! - **config**: environment-driven settings

pub mod config;
pub mod error;
pub mod fetch;
pub mod formats;
pub mod grid;
pub mod import;
pub mod normalize;
pub mod parser;
pub mod projection;
mod xml;

pub use config::TaskerConfig;
pub use error::{DecodeError, FetchError, GridError, ImportError};
pub use fetch::{PayloadFetcher, RemoteFetcher};
pub use formats::{FormatDecoder, GeometryFormat};
pub use grid::{grid_cells, GridShape, MAX_GRID_CELLS};
pub use import::{parse_export, ProjectExport, TaskExport};
pub use normalize::{normalize, normalize_all};
pub use parser::FormatDetectingParser;
pub use projection::{to_geographic, to_projected};
