//! Command-line interface definition using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Build version string with git hash and build date.
fn version_string() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const BUILD_DATE: &str = env!("BUILD_DATE");

    // Format: "0.1.0 (abc1234, 2026-10-17)"
    static VERSION_STRING: std::sync::OnceLock<String> = std::sync::OnceLock::new();
    VERSION_STRING.get_or_init(|| format!("{} ({}, {})", VERSION, GIT_HASH, BUILD_DATE))
}

/// Tasker - turn spatial files into task drafts
#[derive(Parser, Debug)]
#[command(name = "tasker")]
#[command(author, version = version_string(), about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output format
    #[arg(short, long, default_value = "table", global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect the format of a file and list its polygon features
    Parse {
        /// GeoJSON, OSM-XML, GPX, Esri-JSON, KML or WKT file
        #[arg(required = true)]
        file: PathBuf,
    },

    /// Load a file as task drafts
    Load {
        #[arg(required = true)]
        file: PathBuf,

        /// Print Web Mercator coordinates instead of lon/lat
        #[arg(short, long)]
        projected: bool,
    },

    /// Fetch a file from a URL and load it as task drafts
    Fetch {
        #[arg(required = true)]
        url: String,

        /// Request timeout in seconds (default: TASKER_FETCH_TIMEOUT_SECS or 30)
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Load the tasks of a project export
    Import {
        /// Project export JSON document
        #[arg(required = true)]
        file: PathBuf,
    },

    /// Load a file and split its drafts into grid cells
    Subdivide {
        #[arg(required = true)]
        file: PathBuf,

        /// Cell shape (square, hexagon, triangle)
        #[arg(short, long, default_value = "square")]
        shape: String,

        /// Cell size in metres
        #[arg(long)]
        size: Option<f64>,

        /// Only subdivide the draft with this id
        #[arg(short, long)]
        task: Option<String>,
    },
}

/// Output format for draft listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Cli {
    /// Returns the log level based on verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
