//! Builder patterns for complex types.

use crate::draft::{NewTaskDraft, RawId};
use crate::geometry::PolygonGeometry;

/// Builder for creating NewTaskDraft instances with a fluent API.
#[derive(Debug, Clone)]
pub struct NewTaskDraftBuilder {
    geometry: PolygonGeometry,
    id: Option<RawId>,
    name: Option<String>,
    process_points: u32,
}

impl NewTaskDraftBuilder {
    /// Creates a new builder with the required geometry.
    pub fn new(geometry: PolygonGeometry) -> Self {
        Self {
            geometry,
            id: None,
            name: None,
            process_points: 0,
        }
    }

    /// Sets the requested id.
    pub fn id(mut self, id: impl Into<RawId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the requested id from an optional value.
    pub fn maybe_id(mut self, id: Option<RawId>) -> Self {
        self.id = id;
        self
    }

    /// Sets the name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the name from an optional value.
    pub fn maybe_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// Sets the process points.
    pub fn process_points(mut self, points: u32) -> Self {
        self.process_points = points;
        self
    }

    /// Builds the NewTaskDraft.
    pub fn build(self) -> NewTaskDraft {
        NewTaskDraft {
            id: self.id,
            name: self.name,
            geometry: self.geometry,
            process_points: self.process_points,
        }
    }
}
