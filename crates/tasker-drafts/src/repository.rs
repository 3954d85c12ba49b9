//! TaskDraftRepository - thread-safe draft storage with change notifications.
//!
//! Drafts live in insertion order behind an `Arc<RwLock<_>>`; subscribers
//! receive [`DraftEvent`]s over `mpsc` channels after each mutation.

use std::collections::HashSet;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, RwLock, RwLockWriteGuard};

use tasker_core::to_projected;
use tasker_models::{DraftEvent, NewTaskDraft, TaskDraft, TaskIndex};
use tracing::{debug, info};

use crate::allocator::IdAllocator;
use crate::error::{DraftError, Result};

/// Which draft, if any, is selected.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Unselected,
    Selected(String),
}

impl Selection {
    /// Returns the selected id.
    pub fn id(&self) -> Option<&str> {
        match self {
            Selection::Unselected => None,
            Selection::Selected(id) => Some(id),
        }
    }
}

#[derive(Debug, Default)]
struct DraftState {
    tasks: Vec<TaskDraft>,
    selection: Selection,
}

impl DraftState {
    fn position(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }
}

/// Thread-safe store of task drafts for one project-creation session.
///
/// # Concurrency
///
/// - **`Arc<RwLock<DraftState>>`**: drafts and selection change together
///   under one write lock, so a selected id always refers to a stored draft.
///
/// - **`Arc<RwLock<Vec<Sender>>>`**: subscriber list, locked separately.
///   Events are broadcast after the state lock is released, so a subscriber
///   reading the repository from its handler never blocks on the mutation
///   that notified it.
///
/// # Example
///
/// ```no_run
/// use tasker_drafts::TaskDraftRepository;
/// use tasker_models::{Coord, NewTaskDraft, PolygonGeometry};
///
/// let repo = TaskDraftRepository::new();
/// let rx = repo.subscribe();
///
/// let square = PolygonGeometry::from_ring(vec![
///     Coord::new(0.0, 0.0),
///     Coord::new(1.0, 0.0),
///     Coord::new(1.0, 1.0),
///     Coord::new(0.0, 0.0),
/// ]);
/// let added = repo.add_tasks(vec![NewTaskDraft::new(square)], false).unwrap();
/// repo.select_task(&added[0].id).unwrap();
///
/// while let Ok(event) = rx.try_recv() {
///     println!("{}", event.name());
/// }
/// ```
#[derive(Debug, Default)]
pub struct TaskDraftRepository {
    state: Arc<RwLock<DraftState>>,
    subscribers: Arc<RwLock<Vec<Sender<DraftEvent>>>>,
}

impl TaskDraftRepository {
    /// Creates an empty repository with nothing selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to change notifications.
    ///
    /// The receiver gets every event emitted after this call. Dropped
    /// receivers are pruned on the next broadcast.
    pub fn subscribe(&self) -> Receiver<DraftEvent> {
        let (tx, rx) = mpsc::channel();

        if let Ok(mut subs) = self.subscribers.write() {
            subs.push(tx);
        }

        rx
    }

    fn broadcast(&self, event: DraftEvent) {
        if let Ok(mut subs) = self.subscribers.write() {
            debug!(event = event.name(), subscribers = subs.len(), "Broadcasting draft event");
            subs.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, DraftState>> {
        self.state
            .write()
            .map_err(|e| DraftError::LockPoisoned(e.to_string()))
    }

    /// Adds a batch of drafts and returns them as stored.
    ///
    /// With `transform_geometry` the geometries are reprojected from
    /// EPSG:4326 to EPSG:3857. A requested id is kept when it is a
    /// non-negative integer not used by the store or an earlier draft of the
    /// batch; otherwise the smallest free index is assigned. Blank names
    /// become the id. Subscribers get one `Added` event for the batch; an
    /// empty batch changes nothing and emits nothing.
    pub fn add_tasks(
        &self,
        drafts: Vec<NewTaskDraft>,
        transform_geometry: bool,
    ) -> Result<Vec<TaskDraft>> {
        if drafts.is_empty() {
            return Ok(Vec::new());
        }

        let added = {
            let mut state = self.write_state()?;

            let requested: Vec<Option<u64>> = drafts.iter().map(|d| d.id.task_index()).collect();
            let mut taken: HashSet<u64> = state
                .tasks
                .iter()
                .filter_map(|t| t.id.task_index())
                .collect();
            let mut allocator = IdAllocator::new(
                state
                    .tasks
                    .iter()
                    .filter_map(|t| t.id.task_index())
                    .chain(requested.iter().flatten().copied()),
            );

            let mut added = Vec::with_capacity(drafts.len());
            for (draft, requested) in drafts.into_iter().zip(requested) {
                let id = match requested {
                    Some(index) if taken.insert(index) => index.to_string(),
                    _ => {
                        let id = allocator.allocate();
                        if let Some(index) = id.task_index() {
                            taken.insert(index);
                        }
                        id
                    }
                };

                let name = draft
                    .name
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| id.clone());
                let geometry = if transform_geometry {
                    to_projected(&draft.geometry)
                } else {
                    draft.geometry
                };

                added.push(TaskDraft {
                    id,
                    name,
                    geometry,
                    process_points: draft.process_points,
                });
            }

            state.tasks.extend(added.iter().cloned());
            added
        };

        info!(drafts = added.len(), transformed = transform_geometry, "Added task drafts");
        self.broadcast(DraftEvent::Added(added.clone()));
        Ok(added)
    }

    /// Removes a draft, clearing the selection if it was selected.
    ///
    /// Returns the removed draft, or `None` (and emits nothing) if the id is
    /// unknown.
    pub fn remove_task(&self, id: &str) -> Result<Option<TaskDraft>> {
        let removed = {
            let mut state = self.write_state()?;
            let Some(pos) = state.position(id) else {
                return Ok(None);
            };
            let removed = state.tasks.remove(pos);
            if state.selection.id() == Some(id) {
                state.selection = Selection::Unselected;
            }
            removed
        };

        debug!(id = %id, "Removed task draft");
        self.broadcast(DraftEvent::Removed(removed.id.clone()));
        Ok(Some(removed))
    }

    /// Renames a draft in place.
    ///
    /// Returns the updated draft, or `None` if the id is unknown.
    pub fn change_task_name(&self, id: &str, name: impl Into<String>) -> Result<Option<TaskDraft>> {
        let changed = {
            let mut state = self.write_state()?;
            let Some(pos) = state.position(id) else {
                return Ok(None);
            };
            state.tasks[pos].name = name.into();
            state.tasks[pos].clone()
        };

        debug!(id = %id, name = %changed.name, "Renamed task draft");
        self.broadcast(DraftEvent::Changed(changed.clone()));
        Ok(Some(changed))
    }

    /// Toggles the selection of a draft.
    ///
    /// Selecting the selected draft deselects it. Unknown ids leave the
    /// selection alone and emit nothing. Returns the resulting selection.
    pub fn select_task(&self, id: &str) -> Result<Selection> {
        let selection = {
            let mut state = self.write_state()?;
            let next = match &state.selection {
                Selection::Selected(current) if current == id => Selection::Unselected,
                _ if state.position(id).is_none() => return Ok(state.selection.clone()),
                _ => Selection::Selected(id.to_string()),
            };
            state.selection = next.clone();
            next
        };

        debug!(selection = ?selection, "Selection changed");
        self.broadcast(DraftEvent::Selected(selection.id().map(str::to_string)));
        Ok(selection)
    }

    /// Clears the selection. Always emits `Selected(None)`.
    pub fn deselect_task(&self) -> Result<()> {
        self.write_state()?.selection = Selection::Unselected;
        self.broadcast(DraftEvent::Selected(None));
        Ok(())
    }

    /// Removes every draft, emitting `Removed` for each in insertion order.
    ///
    /// Returns the number of drafts removed.
    pub fn clear(&self) -> Result<usize> {
        let removed = {
            let mut state = self.write_state()?;
            state.selection = Selection::Unselected;
            std::mem::take(&mut state.tasks)
        };

        info!(drafts = removed.len(), "Cleared task drafts");
        for draft in &removed {
            self.broadcast(DraftEvent::Removed(draft.id.clone()));
        }
        Ok(removed.len())
    }

    /// Returns true if any draft is stored.
    pub fn has_tasks(&self) -> bool {
        self.len() > 0
    }

    /// Number of stored drafts.
    pub fn len(&self) -> usize {
        self.state.read().map(|s| s.tasks.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns all drafts in insertion order.
    pub fn get_tasks(&self) -> Vec<TaskDraft> {
        match self.state.read() {
            Ok(state) => state.tasks.clone(),
            Err(_) => Vec::new(),
        }
    }

    /// Gets a draft by id.
    pub fn get_task(&self, id: &str) -> Option<TaskDraft> {
        let state = self.state.read().ok()?;
        state.tasks.iter().find(|t| t.id == id).cloned()
    }

    /// Returns the current selection.
    pub fn selection(&self) -> Selection {
        self.state
            .read()
            .map(|s| s.selection.clone())
            .unwrap_or_default()
    }

    /// Returns the selected draft, if any.
    pub fn get_selected_task(&self) -> Option<TaskDraft> {
        let state = self.state.read().ok()?;
        let id = state.selection.id()?;
        state.tasks.iter().find(|t| t.id == id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;
    use tasker_models::{Coord, PolygonGeometry, RawId};

    fn square(offset: f64) -> PolygonGeometry {
        PolygonGeometry::from_ring(vec![
            Coord::new(offset, offset),
            Coord::new(offset + 1.0, offset),
            Coord::new(offset + 1.0, offset + 1.0),
            Coord::new(offset, offset),
        ])
    }

    fn draft(id: Option<RawId>) -> NewTaskDraft {
        NewTaskDraft::builder(square(0.0)).maybe_id(id).build()
    }

    fn drain(rx: &Receiver<DraftEvent>) -> Vec<DraftEvent> {
        rx.try_iter().collect()
    }

    fn ids(repo: &TaskDraftRepository) -> Vec<String> {
        repo.get_tasks().into_iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_add_assigns_ids_and_names() {
        let repo = TaskDraftRepository::new();
        let added = repo
            .add_tasks(
                vec![
                    NewTaskDraft::new(square(0.0)),
                    NewTaskDraft::builder(square(2.0)).name("Harbour").build(),
                    NewTaskDraft::builder(square(4.0)).name("   ").build(),
                ],
                false,
            )
            .unwrap();

        assert_eq!(ids(&repo), vec!["0", "1", "2"]);
        assert_eq!(added[0].name, "0");
        assert_eq!(added[1].name, "Harbour");
        assert_eq!(added[2].name, "2");
        assert!(repo.has_tasks());
        assert_eq!(repo.len(), 3);
    }

    #[test]
    fn test_mixed_batch_ids() {
        let repo = TaskDraftRepository::new();
        repo.add_tasks(
            vec![
                draft(Some(RawId::from(10u64))),
                draft(Some(RawId::from("5"))),
                draft(Some(RawId::from("one"))),
                draft(None),
                draft(None),
                draft(Some(RawId::from(0u64))),
            ],
            false,
        )
        .unwrap();

        assert_eq!(ids(&repo), vec!["10", "5", "1", "2", "3", "0"]);
    }

    #[test]
    fn test_duplicate_ids_reallocated() {
        let repo = TaskDraftRepository::new();
        repo.add_tasks(vec![draft(Some(RawId::from("2")))], false).unwrap();
        repo.add_tasks(
            vec![
                draft(Some(RawId::from(2u64))),
                draft(Some(RawId::from(" 07 "))),
                draft(Some(RawId::from("7"))),
            ],
            false,
        )
        .unwrap();

        assert_eq!(ids(&repo), vec!["2", "0", "7", "1"]);
        let unique: HashSet<String> = ids(&repo).into_iter().collect();
        assert_eq!(unique.len(), 4);
    }

    #[test]
    fn test_add_emits_one_event_per_batch() {
        let repo = TaskDraftRepository::new();
        let rx = repo.subscribe();

        repo.add_tasks(vec![draft(None), draft(None)], false).unwrap();

        match drain(&rx).as_slice() {
            [DraftEvent::Added(batch)] => assert_eq!(batch.len(), 2),
            other => panic!("unexpected events: {:?}", other),
        }
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let repo = TaskDraftRepository::new();
        let rx = repo.subscribe();

        assert!(repo.add_tasks(Vec::new(), true).unwrap().is_empty());
        assert!(!repo.has_tasks());
        assert!(drain(&rx).is_empty());
    }

    #[test]
    fn test_add_with_transform_projects_geometry() {
        let repo = TaskDraftRepository::new();
        let added = repo.add_tasks(vec![draft(None)], true).unwrap();

        let (_, max) = added[0].geometry.bounding_box().unwrap();
        assert!((max.x - 111_319.490_793_273_6).abs() < 1e-6);
        assert!(max.y > 100_000.0);
    }

    #[test]
    fn test_select_toggles() {
        let repo = TaskDraftRepository::new();
        repo.add_tasks(vec![draft(None)], false).unwrap();
        let rx = repo.subscribe();

        assert_eq!(repo.select_task("0").unwrap(), Selection::Selected("0".into()));
        assert_eq!(repo.get_selected_task().unwrap().id, "0");
        assert_eq!(repo.select_task("0").unwrap(), Selection::Unselected);
        assert!(repo.get_selected_task().is_none());

        assert_eq!(
            drain(&rx),
            vec![
                DraftEvent::Selected(Some("0".into())),
                DraftEvent::Selected(None)
            ]
        );
    }

    #[test]
    fn test_select_unknown_id_is_ignored() {
        let repo = TaskDraftRepository::new();
        repo.add_tasks(vec![draft(None)], false).unwrap();
        repo.select_task("0").unwrap();
        let rx = repo.subscribe();

        assert_eq!(repo.select_task("42").unwrap(), Selection::Selected("0".into()));
        assert!(drain(&rx).is_empty());
    }

    #[test]
    fn test_select_other_switches() {
        let repo = TaskDraftRepository::new();
        repo.add_tasks(vec![draft(None), draft(None)], false).unwrap();

        repo.select_task("0").unwrap();
        repo.select_task("1").unwrap();
        assert_eq!(repo.selection(), Selection::Selected("1".into()));
    }

    #[test]
    fn test_deselect_always_emits() {
        let repo = TaskDraftRepository::new();
        let rx = repo.subscribe();

        repo.deselect_task().unwrap();
        repo.deselect_task().unwrap();

        assert_eq!(
            drain(&rx),
            vec![DraftEvent::Selected(None), DraftEvent::Selected(None)]
        );
    }

    #[test]
    fn test_remove_selected_clears_selection() {
        let repo = TaskDraftRepository::new();
        repo.add_tasks(vec![draft(None), draft(None)], false).unwrap();
        repo.select_task("1").unwrap();
        let rx = repo.subscribe();

        let removed = repo.remove_task("1").unwrap().unwrap();
        assert_eq!(removed.id, "1");
        assert_eq!(repo.selection(), Selection::Unselected);
        assert_eq!(drain(&rx), vec![DraftEvent::Removed("1".into())]);
    }

    #[test]
    fn test_remove_other_keeps_selection() {
        let repo = TaskDraftRepository::new();
        repo.add_tasks(vec![draft(None), draft(None)], false).unwrap();
        repo.select_task("1").unwrap();

        repo.remove_task("0").unwrap();
        assert_eq!(repo.get_selected_task().unwrap().id, "1");
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let repo = TaskDraftRepository::new();
        let rx = repo.subscribe();

        assert!(repo.remove_task("3").unwrap().is_none());
        assert!(drain(&rx).is_empty());
    }

    #[test]
    fn test_removed_id_is_reused() {
        let repo = TaskDraftRepository::new();
        repo.add_tasks(vec![draft(None), draft(None), draft(None)], false)
            .unwrap();
        repo.remove_task("1").unwrap();

        let added = repo.add_tasks(vec![draft(None)], false).unwrap();
        assert_eq!(added[0].id, "1");
    }

    #[test]
    fn test_rename_selected() {
        let repo = TaskDraftRepository::new();
        repo.add_tasks(vec![draft(None)], false).unwrap();
        repo.select_task("0").unwrap();
        let rx = repo.subscribe();

        let changed = repo.change_task_name("0", "North pier").unwrap().unwrap();
        assert_eq!(changed.name, "North pier");
        assert_eq!(repo.get_selected_task().unwrap().name, "North pier");
        assert_eq!(drain(&rx), vec![DraftEvent::Changed(changed)]);

        assert!(repo.change_task_name("9", "x").unwrap().is_none());
        assert!(drain(&rx).is_empty());
    }

    #[test]
    fn test_clear_emits_removed_in_order() {
        let repo = TaskDraftRepository::new();
        repo.add_tasks(vec![draft(None), draft(None), draft(None)], false)
            .unwrap();
        repo.select_task("2").unwrap();
        let rx = repo.subscribe();

        assert_eq!(repo.clear().unwrap(), 3);
        assert!(repo.is_empty());
        assert_eq!(repo.selection(), Selection::Unselected);
        assert_eq!(
            drain(&rx),
            vec![
                DraftEvent::Removed("0".into()),
                DraftEvent::Removed("1".into()),
                DraftEvent::Removed("2".into()),
            ]
        );
    }

    #[test]
    fn test_dropped_subscriber_pruned() {
        let repo = TaskDraftRepository::new();
        let rx1 = repo.subscribe();
        let rx2 = repo.subscribe();
        drop(rx1);

        repo.add_tasks(vec![draft(None)], false).unwrap();
        assert_eq!(drain(&rx2).len(), 1);
        assert_eq!(repo.subscribers.read().unwrap().len(), 1);
    }

    #[test]
    fn test_concurrent_adds_keep_ids_unique() {
        let repo = Arc::new(TaskDraftRepository::new());
        let rx = repo.subscribe();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let repo = Arc::clone(&repo);
                thread::spawn(move || {
                    for _ in 0..10 {
                        repo.add_tasks(vec![draft(None), draft(None)], false).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let unique: HashSet<String> = ids(&repo).into_iter().collect();
        assert_eq!(unique.len(), 80);
        for _ in 0..40 {
            rx.recv_timeout(Duration::from_secs(1)).unwrap();
        }
    }
}
