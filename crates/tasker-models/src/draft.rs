//! Task draft types.
//!
//! A task draft is a polygon awaiting confirmation as a project task. Drafts
//! enter the repository as [`NewTaskDraft`] with a raw, possibly missing id
//! and leave it as [`TaskDraft`] with a unique decimal id.

use serde::{Deserialize, Serialize};

use crate::builders::NewTaskDraftBuilder;
use crate::geometry::PolygonGeometry;

/// Caller-supplied draft id before allocation.
///
/// Source data carries ids as text or numbers; anything else is treated as
/// missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(f64),
    Text(String),
}

impl From<&str> for RawId {
    fn from(s: &str) -> Self {
        RawId::Text(s.to_string())
    }
}

impl From<String> for RawId {
    fn from(s: String) -> Self {
        RawId::Text(s)
    }
}

impl From<f64> for RawId {
    fn from(n: f64) -> Self {
        RawId::Number(n)
    }
}

impl From<i64> for RawId {
    fn from(n: i64) -> Self {
        RawId::Number(n as f64)
    }
}

impl From<u64> for RawId {
    fn from(n: u64) -> Self {
        RawId::Number(n as f64)
    }
}

impl RawId {
    /// Reads a raw id from a JSON value (string or number).
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Some(RawId::Text(s.clone())),
            serde_json::Value::Number(n) => n.as_f64().map(RawId::Number),
            _ => None,
        }
    }
}

/// Values that may denote a non-negative integer task index.
///
/// Blank, negative, fractional, non-finite and non-numeric values are not
/// indices.
pub trait TaskIndex {
    /// Returns the index this value denotes, if any.
    fn task_index(&self) -> Option<u64>;
}

fn index_from_f64(n: f64) -> Option<u64> {
    // 2^64 is the first float out of range for u64
    if n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n < 18_446_744_073_709_551_616.0 {
        Some(n as u64)
    } else {
        None
    }
}

fn index_from_text(s: &str) -> Option<u64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<u64>()
        .ok()
        .or_else(|| trimmed.parse::<f64>().ok().and_then(index_from_f64))
}

impl TaskIndex for str {
    fn task_index(&self) -> Option<u64> {
        index_from_text(self)
    }
}

impl TaskIndex for String {
    fn task_index(&self) -> Option<u64> {
        index_from_text(self)
    }
}

impl TaskIndex for f64 {
    fn task_index(&self) -> Option<u64> {
        index_from_f64(*self)
    }
}

impl TaskIndex for u64 {
    fn task_index(&self) -> Option<u64> {
        Some(*self)
    }
}

impl TaskIndex for i64 {
    fn task_index(&self) -> Option<u64> {
        u64::try_from(*self).ok()
    }
}

impl TaskIndex for RawId {
    fn task_index(&self) -> Option<u64> {
        match self {
            RawId::Number(n) => index_from_f64(*n),
            RawId::Text(s) => index_from_text(s),
        }
    }
}

impl TaskIndex for serde_json::Value {
    fn task_index(&self) -> Option<u64> {
        RawId::from_json(self).and_then(|id| id.task_index())
    }
}

impl<T: TaskIndex> TaskIndex for Option<T> {
    fn task_index(&self) -> Option<u64> {
        self.as_ref().and_then(|v| v.task_index())
    }
}

impl<T: TaskIndex + ?Sized> TaskIndex for &T {
    fn task_index(&self) -> Option<u64> {
        (**self).task_index()
    }
}

/// A draft submitted to the repository, before id allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTaskDraft {
    /// Requested id; kept when it is a free non-negative integer.
    pub id: Option<RawId>,
    /// Display name; blank names fall back to the final id.
    pub name: Option<String>,
    pub geometry: PolygonGeometry,
    pub process_points: u32,
}

impl NewTaskDraft {
    /// Creates a draft with no id, no name and zero process points.
    pub fn new(geometry: PolygonGeometry) -> Self {
        Self {
            id: None,
            name: None,
            geometry,
            process_points: 0,
        }
    }

    /// Creates a builder for a new draft.
    pub fn builder(geometry: PolygonGeometry) -> NewTaskDraftBuilder {
        NewTaskDraftBuilder::new(geometry)
    }
}

/// A draft held by the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    /// Unique decimal id within the owning repository.
    pub id: String,
    pub name: String,
    pub geometry: PolygonGeometry,
    #[serde(default)]
    pub process_points: u32,
}
