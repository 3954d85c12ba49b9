//! Error types for geometry ingestion.

use thiserror::Error;

/// Why a single decoder rejected a payload.
///
/// The detection chain swallows these; they only show up in debug logs.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Payload is not JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Payload is not well-formed XML.
    #[error("invalid XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Malformed XML attribute.
    #[error("invalid XML attribute: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    /// Well-formed document of the wrong kind.
    #[error("unexpected document: {0}")]
    UnexpectedDocument(String),

    /// Geometry could not be read.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// WKT syntax error.
    #[error("invalid WKT at offset {offset}: {message}")]
    Wkt { offset: usize, message: String },
}

/// Errors that can occur while loading a payload from a remote URL.
#[derive(Error, Debug)]
pub enum FetchError {
    /// URL could not be parsed.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Transport-level failure (DNS, TLS, timeout, ...).
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("server returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },
}

/// Invalid input for grid subdivision.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    /// Shape name is not one of the supported grids.
    #[error("unknown grid shape: {0}")]
    UnknownShape(String),

    /// Cell size must be a finite positive number.
    #[error("invalid cell size: {0}")]
    InvalidCellSize(f64),

    /// Geometry has no coordinates to subdivide.
    #[error("geometry has no extent")]
    EmptyGeometry,

    /// Geometry bounds are not finite numbers.
    #[error("geometry extent is not finite")]
    InvalidExtent,

    /// Grid would exceed the cell limit.
    #[error("grid would produce {count} cells, limit is {max}")]
    TooManyCells { count: u64, max: u64 },
}

/// Errors that can occur while reading a project export.
#[derive(Error, Debug)]
pub enum ImportError {
    /// Document is not a valid export.
    #[error("invalid project export: {0}")]
    Json(#[from] serde_json::Error),
}
