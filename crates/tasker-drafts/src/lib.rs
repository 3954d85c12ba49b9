//! Task drafts for Tasker.
//!
//! This crate holds the drafts of a project being created:
//! - `TaskDraftRepository`: thread-safe storage using `Arc<RwLock<T>>`, with
//!   change notifications over `mpsc` channels
//! - Id allocation that fills the smallest free integer index
//! - Ingestion of parsed payloads, remote URLs, drawn shapes and project
//!   exports
//! - Grid subdivision of a stored draft
//!
//! # Example
//!
//! ```no_run
//! use tasker_drafts::{add_payload, subdivide_task, TaskDraftRepository};
//! use tasker_core::GridShape;
//!
//! let repo = TaskDraftRepository::new();
//! let events = repo.subscribe();
//!
//! let payload = std::fs::read("area.kml").unwrap();
//! let drafts = add_payload(&repo, payload).unwrap();
//! subdivide_task(&repo, &drafts[0].id, GridShape::Hexagon, 250.0).unwrap();
//!
//! for event in events.try_iter() {
//!     println!("{:?}", event);
//! }
//! ```

pub mod allocator;
pub mod error;
pub mod ingest;
pub mod repository;
pub mod subdivide;

pub use allocator::{smallest_missing, IdAllocator};
pub use error::{DraftError, Result};
pub use ingest::{add_drawn_shape, add_payload, add_project_export, add_remote, drafts_from_features};
pub use repository::{Selection, TaskDraftRepository};
pub use subdivide::subdivide_task;
