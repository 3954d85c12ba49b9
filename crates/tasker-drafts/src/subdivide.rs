//! Splitting a draft into grid cells.

use tasker_core::{grid_cells, GridShape};
use tasker_models::{NewTaskDraft, TaskDraft};
use tracing::info;

use crate::error::{DraftError, Result};
use crate::repository::TaskDraftRepository;

/// Replaces a draft with the grid cells of `shape` that touch it.
///
/// `cell_size` is in projected metres, matching the stored geometry. The
/// grid is computed and validated before the repository changes; on any
/// error the draft stays in place. Returns the new cell drafts.
pub fn subdivide_task(
    repo: &TaskDraftRepository,
    id: &str,
    shape: GridShape,
    cell_size: f64,
) -> Result<Vec<TaskDraft>> {
    let draft = repo
        .get_task(id)
        .ok_or_else(|| DraftError::NotFound(id.to_string()))?;

    let cells = grid_cells(&draft.geometry, shape, cell_size)?;
    if cells.is_empty() {
        return Err(DraftError::NoUsableGeometry);
    }

    info!(id = %id, shape = %shape, cell_size, cells = cells.len(), "Subdividing task draft");
    repo.remove_task(id)?;
    repo.add_tasks(cells.into_iter().map(NewTaskDraft::new).collect(), false)
}
