//! Command-line interface for the Itinisère traffic map.
//!
//! `itinisere render` builds a map scene from the live traffic API and
//! writes it as JSON. `itinisere convert` turns a WKT `MULTILINESTRING` into
//! a GeoJSON geometry.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod convert;
mod error;
mod render;

pub use error::CliError;

use convert::{ConvertArgs, run_convert};
use render::{RenderArgs, run_render};

pub(crate) const ARG_API_HOST: &str = "api-host";
pub(crate) const ARG_USER_KEY: &str = "user-key";
pub(crate) const ARG_STYLE: &str = "style";
pub(crate) const ARG_ACCESS_TOKEN: &str = "access-token";
pub(crate) const ARG_CENTER_LON: &str = "center-lon";
pub(crate) const ARG_CENTER_LAT: &str = "center-lat";
pub(crate) const ARG_ZOOM: &str = "zoom";
pub(crate) const ARG_CONTAINER: &str = "container";
pub(crate) const ARG_BOUNDARY: &str = "boundary";
pub(crate) const ARG_OUTPUT: &str = "output";
pub(crate) const ENV_API_HOST: &str = "ITINISERE_CMDS_RENDER_API_HOST";
pub(crate) const ENV_USER_KEY: &str = "ITINISERE_CMDS_RENDER_USER_KEY";
pub(crate) const ENV_STYLE: &str = "ITINISERE_CMDS_RENDER_STYLE";

/// Run the Itinisère CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when arguments or configuration are invalid, or when
/// the selected command fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Render(args) => run_render(args),
        Command::Convert(args) => run_convert(&args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "itinisere",
    about = "Traffic map tooling for the Isère road network",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build a map scene with live traffic and mountain pass overlays.
    Render(RenderArgs),
    /// Convert a WKT MULTILINESTRING into GeoJSON.
    Convert(ConvertArgs),
}

#[cfg(test)]
mod tests;
