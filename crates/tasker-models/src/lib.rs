//! Core data models for Tasker.
//!
//! This crate provides the fundamental data types shared by the parsing
//! pipeline and the draft repository: coordinates, geometries, features,
//! task drafts and the events emitted while drafts change.

pub mod builders;
pub mod draft;
pub mod event;
pub mod feature;
pub mod geometry;

// Re-export main types
pub use builders::NewTaskDraftBuilder;
pub use draft::{NewTaskDraft, RawId, TaskDraft, TaskIndex};
pub use event::DraftEvent;
pub use feature::{Feature, PolygonFeature, Properties};
pub use geometry::{is_closed_ring, Coord, Geometry, GeometryKind, PolygonGeometry, Ring};
