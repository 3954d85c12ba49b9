//! Turning parsed, fetched, drawn and imported geometry into drafts.

use serde_json::Value;
use tasker_core::{normalize_all, FormatDetectingParser, PayloadFetcher, ProjectExport};
use tasker_models::{NewTaskDraft, PolygonFeature, PolygonGeometry, RawId, TaskDraft};
use tracing::{info, warn};

use crate::error::{DraftError, Result};
use crate::repository::TaskDraftRepository;

/// Builds one draft per polygon feature.
///
/// The requested id comes from the `id` property and the name from `name`,
/// when they are strings or numbers.
pub fn drafts_from_features(features: &[PolygonFeature]) -> Vec<NewTaskDraft> {
    features
        .iter()
        .map(|feature| {
            let name = match feature.properties.get("name") {
                Some(Value::String(s)) => Some(s.clone()),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            };
            NewTaskDraft::builder(feature.geometry.clone())
                .maybe_id(feature.properties.get("id").and_then(RawId::from_json))
                .maybe_name(name)
                .build()
        })
        .collect()
}

/// Parses a payload of any supported format and adds its polygons.
///
/// Geometries are reprojected to EPSG:3857. The repository is untouched on
/// failure: [`DraftError::UnrecognizedPayload`] when no decoder accepts the
/// payload, [`DraftError::NoUsableGeometry`] when it decodes to no polygon.
pub fn add_payload(repo: &TaskDraftRepository, payload: impl AsRef<[u8]>) -> Result<Vec<TaskDraft>> {
    let parser = FormatDetectingParser::new();
    let Some((format, features)) = parser.detect(payload) else {
        warn!("No supported format recognised the payload");
        return Err(DraftError::UnrecognizedPayload);
    };
    info!(format = %format, features = features.len(), "Detected payload format");

    let polygons = normalize_all(&features);
    if polygons.is_empty() {
        warn!(features = features.len(), "Payload contains no usable polygons");
        return Err(DraftError::NoUsableGeometry);
    }

    repo.add_tasks(drafts_from_features(&polygons), true)
}

/// Fetches a payload from `url` and adds its polygons like [`add_payload`].
///
/// A failed request is reported once as [`DraftError::Fetch`].
pub fn add_remote<F>(repo: &TaskDraftRepository, fetcher: &F, url: &str) -> Result<Vec<TaskDraft>>
where
    F: PayloadFetcher + ?Sized,
{
    let body = fetcher.fetch(url)?;
    add_payload(repo, body)
}

/// Adds a hand-drawn polygon, already in projected coordinates.
pub fn add_drawn_shape(repo: &TaskDraftRepository, geometry: PolygonGeometry) -> Result<TaskDraft> {
    repo.add_tasks(vec![NewTaskDraft::new(geometry)], false)?
        .pop()
        .ok_or(DraftError::NoUsableGeometry)
}

/// Adds the tasks of a project export.
///
/// Each task keeps its name and process points. Tasks whose geometry does
/// not normalize are skipped.
pub fn add_project_export(repo: &TaskDraftRepository, export: &ProjectExport) -> Result<Vec<TaskDraft>> {
    let drafts: Vec<NewTaskDraft> = export
        .tasks
        .iter()
        .flat_map(|task| {
            task.polygon_features().into_iter().map(move |feature| {
                NewTaskDraft::builder(feature.geometry)
                    .name(task.name.clone())
                    .process_points(task.process_points)
                    .build()
            })
        })
        .collect();

    if drafts.is_empty() {
        warn!(project = %export.name, tasks = export.tasks.len(), "Project export has no usable tasks");
        return Err(DraftError::NoUsableGeometry);
    }

    info!(project = %export.name, drafts = drafts.len(), "Importing project export");
    repo.add_tasks(drafts, true)
}
