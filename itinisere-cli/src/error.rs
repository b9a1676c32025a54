//! Error types emitted by the Itinisère CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use itinisere_core::{BoundaryError, ShapeError};
use itinisere_data::FeedBuildError;
use thiserror::Error;

/// Errors emitted by the Itinisère CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Flag name without the leading dashes.
        field: &'static str,
        /// Environment variable supplying the value.
        env: &'static str,
    },
    /// The boundary path does not exist or is not a file.
    #[error("boundary path {path:?} does not exist or is not a file")]
    MissingBoundaryFile {
        /// Boundary file path.
        path: Utf8PathBuf,
    },
    /// Reading the boundary file failed.
    #[error("failed to read boundary at {path:?}: {source}")]
    ReadBoundary {
        /// Boundary file path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The boundary file is not a usable GeoJSON outline.
    #[error("boundary at {path:?} is invalid: {source}")]
    InvalidBoundary {
        /// Boundary file path.
        path: Utf8PathBuf,
        /// Decoding error.
        #[source]
        source: BoundaryError,
    },
    /// The container id does not resolve to a map element.
    #[error("no map container matches #{container}")]
    NoContainer {
        /// Requested container id.
        container: String,
    },
    /// Constructing the traffic feed failed.
    #[error("failed to build traffic feed for {api_host:?}: {source}")]
    BuildFeed {
        /// Traffic API base URL.
        api_host: String,
        /// Construction error.
        #[source]
        source: FeedBuildError,
    },
    /// The shape passed to `convert` is not a valid `MULTILINESTRING`.
    #[error("invalid shape: {0}")]
    Shape(#[from] ShapeError),
    /// Serializing command output failed.
    #[error("failed to serialize output: {0}")]
    Serialize(#[source] serde_json::Error),
    /// Writing the output file failed.
    #[error("failed to write output to {path:?}: {source}")]
    WriteOutputFile {
        /// Output file path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// Writing to standard output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
