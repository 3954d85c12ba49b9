//! Change events emitted by the draft repository.

use crate::draft::TaskDraft;

/// A change to the set of task drafts.
///
/// Subscribers (map layers, task lists) re-render from these.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftEvent {
    /// A whole batch was added; one event per batch.
    Added(Vec<TaskDraft>),
    /// The draft with this id was removed.
    Removed(String),
    /// A draft was modified in place.
    Changed(TaskDraft),
    /// The selection changed. `None` means nothing is selected.
    Selected(Option<String>),
}

impl DraftEvent {
    /// Short name of the event, used in log fields.
    pub fn name(&self) -> &'static str {
        match self {
            DraftEvent::Added(_) => "added",
            DraftEvent::Removed(_) => "removed",
            DraftEvent::Changed(_) => "changed",
            DraftEvent::Selected(_) => "selected",
        }
    }
}
