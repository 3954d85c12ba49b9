//! Command handlers for CLI subcommands.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Serialize;
use tasker_core::{
    normalize_all, parse_export, to_geographic, FormatDetectingParser, GridShape, RemoteFetcher,
    TaskerConfig,
};
use tasker_drafts::{
    add_payload, add_project_export, add_remote, subdivide_task, DraftError, TaskDraftRepository,
};
use tasker_models::{PolygonFeature, PolygonGeometry, TaskDraft};
use tracing::{info, warn};

use crate::cli::{Commands, OutputFormat};

/// Result type for command operations.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Execute a CLI command.
pub fn execute(command: Commands, format: OutputFormat, config: &TaskerConfig) -> Result<()> {
    match command {
        Commands::Parse { file } => cmd_parse(&file, format),
        Commands::Load { file, projected } => {
            let repo = load_file(&file)?;
            print_drafts(&repo.get_tasks(), format, projected)
        }
        Commands::Fetch { url, timeout } => {
            let mut config = config.clone();
            if let Some(secs) = timeout {
                config.fetch_timeout = Duration::from_secs(secs);
            }
            let repo = fetch_url(&url, &config)?;
            print_drafts(&repo.get_tasks(), format, false)
        }
        Commands::Import { file } => {
            let repo = import_file(&file)?;
            print_drafts(&repo.get_tasks(), format, false)
        }
        Commands::Subdivide {
            file,
            shape,
            size,
            task,
        } => {
            let shape: GridShape = shape.parse().map_err(DraftError::from)?;
            let size = size.unwrap_or(config.default_cell_size);
            let repo = load_file(&file)?;
            subdivide(&repo, shape, size, task.as_deref())?;
            print_drafts(&repo.get_tasks(), format, false)
        }
    }
}

/// Ingests a spatial file into a fresh repository.
pub fn load_file(path: &Path) -> Result<TaskDraftRepository> {
    let payload = fs::read(path).map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
    let repo = TaskDraftRepository::new();
    add_payload(&repo, payload)?;
    info!(file = %path.display(), drafts = repo.len(), "Loaded file");
    Ok(repo)
}

/// Fetches a URL into a fresh repository.
pub fn fetch_url(url: &str, config: &TaskerConfig) -> Result<TaskDraftRepository> {
    let fetcher = RemoteFetcher::new(config).map_err(DraftError::from)?;
    let repo = TaskDraftRepository::new();
    add_remote(&repo, &fetcher, url)?;
    Ok(repo)
}

/// Reads a project export into a fresh repository.
pub fn import_file(path: &Path) -> Result<TaskDraftRepository> {
    let text =
        fs::read_to_string(path).map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
    let export = parse_export(&text).map_err(DraftError::from)?;
    let repo = TaskDraftRepository::new();
    add_project_export(&repo, &export)?;
    Ok(repo)
}

/// Subdivides one draft, or all of them when `task` is `None`.
pub fn subdivide(
    repo: &TaskDraftRepository,
    shape: GridShape,
    size: f64,
    task: Option<&str>,
) -> Result<usize> {
    let targets: Vec<String> = match task {
        Some(id) => vec![id.to_string()],
        None => repo.get_tasks().into_iter().map(|t| t.id).collect(),
    };

    let mut created = 0;
    for id in &targets {
        created += subdivide_task(repo, id, shape, size)?.len();
    }
    info!(drafts = targets.len(), cells = created, "Subdivision complete");
    Ok(created)
}

fn cmd_parse(path: &Path, format: OutputFormat) -> Result<()> {
    let payload = fs::read(path).map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
    let parser = FormatDetectingParser::new();

    let Some((detected, features)) = parser.detect(&payload) else {
        warn!(file = %path.display(), "No supported format recognised");
        println!("No features found.");
        return Ok(());
    };
    let polygons = normalize_all(&features);

    match format {
        OutputFormat::Table => {
            println!("Format: {}", detected);
            println!("Features: {} ({} polygon)", features.len(), polygons.len());
            if polygons.is_empty() {
                return Ok(());
            }
            println!();
            println!("{:<5}  {:<13}  {:>8}  NAME", "#", "TYPE", "VERTICES");
            println!("{}", "-".repeat(50));
            for (i, feature) in polygons.iter().enumerate() {
                println!(
                    "{:<5}  {:<13}  {:>8}  {}",
                    i,
                    geometry_type(&feature.geometry),
                    feature.geometry.coords().count(),
                    feature.property_text("name").unwrap_or_default()
                );
            }
        }
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct ParseReport<'a> {
                format: String,
                features: usize,
                polygons: &'a [PolygonFeature],
            }
            let report = ParseReport {
                format: detected.to_string(),
                features: features.len(),
                polygons: &polygons,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

fn print_drafts(drafts: &[TaskDraft], format: OutputFormat, projected: bool) -> Result<()> {
    let drafts: Vec<TaskDraft> = drafts
        .iter()
        .cloned()
        .map(|mut d| {
            if !projected {
                d.geometry = to_geographic(&d.geometry);
            }
            d
        })
        .collect();

    match format {
        OutputFormat::Table => {
            if drafts.is_empty() {
                println!("No task drafts.");
                return Ok(());
            }

            println!(
                "{:<6}  {:<20}  {:<13}  {:>8}  {:>6}  BOUNDS",
                "ID", "NAME", "TYPE", "VERTICES", "POINTS"
            );
            println!("{}", "-".repeat(90));
            for draft in &drafts {
                println!(
                    "{:<6}  {:<20}  {:<13}  {:>8}  {:>6}  {}",
                    draft.id,
                    truncate(&draft.name, 20),
                    geometry_type(&draft.geometry),
                    draft.geometry.coords().count(),
                    draft.process_points,
                    bounds(&draft.geometry, projected)
                );
            }
            println!("\n{} draft(s)", drafts.len());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&drafts)?);
        }
    }
    Ok(())
}

fn geometry_type(geometry: &PolygonGeometry) -> &'static str {
    match geometry {
        PolygonGeometry::Polygon(_) => "Polygon",
        PolygonGeometry::MultiPolygon(_) => "MultiPolygon",
    }
}

fn bounds(geometry: &PolygonGeometry, projected: bool) -> String {
    let precision = if projected { 1 } else { 6 };
    match geometry.bounding_box() {
        Some((min, max)) => format!(
            "{:.p$},{:.p$} {:.p$},{:.p$}",
            min.x,
            min.y,
            max.x,
            max.y,
            p = precision
        ),
        None => "-".to_string(),
    }
}

/// Truncate a string to max length, adding "..." if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
