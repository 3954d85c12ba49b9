//! Format auto-detection chain.
//!
//! Decoders are tried in a fixed priority order; the first one that yields
//! at least one feature wins. Nothing is merged across decoders.

use tasker_models::Feature;
use tracing::debug;

use crate::formats::{default_decoders, FormatDecoder, GeometryFormat};

/// Parses payloads of unknown format into raw features.
pub struct FormatDetectingParser {
    decoders: Vec<Box<dyn FormatDecoder>>,
}

impl Default for FormatDetectingParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatDetectingParser {
    /// Creates a parser with the standard decoder chain:
    /// GeoJSON, OSM-XML, GPX, Esri-JSON, KML, WKT.
    pub fn new() -> Self {
        Self::with_decoders(default_decoders())
    }

    /// Creates a parser over a custom decoder chain, tried in order.
    pub fn with_decoders(decoders: Vec<Box<dyn FormatDecoder>>) -> Self {
        Self { decoders }
    }

    /// Formats in the order they are tried.
    pub fn formats(&self) -> Vec<GeometryFormat> {
        self.decoders.iter().map(|d| d.format()).collect()
    }

    /// Decodes the payload and reports which format matched.
    ///
    /// Returns `None` if no decoder produced a feature, including for empty
    /// or non-UTF-8 payloads.
    pub fn detect(&self, payload: impl AsRef<[u8]>) -> Option<(GeometryFormat, Vec<Feature>)> {
        let Some(text) = payload_text(payload.as_ref()) else {
            debug!("Payload is not valid UTF-8");
            return None;
        };

        self.decoders.iter().find_map(|decoder| {
            let format = decoder.format();
            match decoder.decode(text) {
                Ok(features) if !features.is_empty() => {
                    debug!(%format, features = features.len(), "Payload decoded");
                    Some((format, features))
                }
                Ok(_) => {
                    debug!(%format, "Decoder produced no features");
                    None
                }
                Err(e) => {
                    debug!(%format, error = %e, "Decoder rejected payload");
                    None
                }
            }
        })
    }

    /// Decodes the payload into raw features; empty if nothing matched.
    pub fn parse(&self, payload: impl AsRef<[u8]>) -> Vec<Feature> {
        self.detect(payload)
            .map(|(_, features)| features)
            .unwrap_or_default()
    }
}

fn payload_text(bytes: &[u8]) -> Option<&str> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    std::str::from_utf8(bytes).ok()
}
