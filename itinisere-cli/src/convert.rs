//! Convert command implementation for the Itinisère CLI.

use std::io::Write;

use clap::Parser;
use itinisere_core::{parse_shape, to_geojson, to_geojson_geometry};

use crate::CliError;

/// CLI arguments for the `convert` subcommand.
#[derive(Debug, Clone, Parser)]
#[command(
    long_about = "Convert a WKT MULTILINESTRING, as found in the traffic \
                 API's Shape field, into a GeoJSON MultiLineString geometry.",
    about = "Convert a WKT MULTILINESTRING into GeoJSON"
)]
pub(crate) struct ConvertArgs {
    /// WKT text, e.g. "MULTILINESTRING ((5.71 45.18, 5.72 45.19))".
    #[arg(value_name = "shape")]
    pub(crate) shape: String,
    /// Print the bare `"type": ..., "coordinates": ...` fragment instead of
    /// a complete JSON object.
    #[arg(long)]
    pub(crate) fragment: bool,
}

pub(crate) fn run_convert(args: &ConvertArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_convert_with(args, &mut stdout)
}

pub(crate) fn run_convert_with(args: &ConvertArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let payload = if args.fragment {
        to_geojson(&args.shape)?
    } else {
        let geometry = to_geojson_geometry(&parse_shape(&args.shape)?);
        serde_json::to_string_pretty(&geometry).map_err(CliError::Serialize)?
    };
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)
}
