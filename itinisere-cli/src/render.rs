//! Render command implementation for the Itinisère CLI.

use std::cell::Cell;
use std::io::Write;
use std::rc::Rc;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use itinisere_core::config::{DEFAULT_CENTER, DEFAULT_ZOOM};
use itinisere_core::{
    Boundary, MapBootstrapper, MapConfig, Scene, SceneEngine, SceneMap, StaticDocument,
    TrafficFeed, TrafficOutcome, display_mountain_passes, display_traffic_status,
};
use itinisere_data::{HttpTrafficFeed, HttpTrafficFeedConfig};
use log::{info, warn};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_ACCESS_TOKEN, ARG_API_HOST, ARG_BOUNDARY, ARG_CENTER_LAT, ARG_CENTER_LON, ARG_CONTAINER,
    ARG_OUTPUT, ARG_STYLE, ARG_USER_KEY, ARG_ZOOM, CliError, ENV_API_HOST, ENV_STYLE,
    ENV_USER_KEY,
};

/// Container id used when none is configured.
pub(crate) const DEFAULT_CONTAINER: &str = "map";

/// CLI arguments for the `render` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Bootstrap a map, draw the department outline, then fetch \
                 live traffic and mountain pass closures and write the \
                 resulting scene as JSON. Values can come from CLI flags, \
                 configuration files, or environment variables.",
    about = "Render the traffic map scene"
)]
#[ortho_config(prefix = "ITINISERE")]
pub(crate) struct RenderArgs {
    /// Base URL of the traffic API (e.g. "https://traffic.example.com").
    #[arg(long = ARG_API_HOST, value_name = "url")]
    #[serde(default)]
    pub(crate) api_host: Option<String>,
    /// Traffic API user key.
    #[arg(long = ARG_USER_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) user_key: Option<String>,
    /// Map style reference.
    #[arg(long = ARG_STYLE, value_name = "style")]
    #[serde(default)]
    pub(crate) style: Option<String>,
    /// Tile service access token.
    #[arg(long = ARG_ACCESS_TOKEN, value_name = "token")]
    #[serde(default)]
    pub(crate) access_token: Option<String>,
    /// Initial centre longitude.
    #[arg(long = ARG_CENTER_LON, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) center_lon: Option<f64>,
    /// Initial centre latitude.
    #[arg(long = ARG_CENTER_LAT, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) center_lat: Option<f64>,
    /// Initial zoom level.
    #[arg(long = ARG_ZOOM, value_name = "level")]
    #[serde(default)]
    pub(crate) zoom: Option<f64>,
    /// Id of the element hosting the map.
    #[arg(long = ARG_CONTAINER, value_name = "id")]
    #[serde(default)]
    pub(crate) container: Option<String>,
    /// GeoJSON file replacing the built-in Isère outline.
    #[arg(long = ARG_BOUNDARY, value_name = "path")]
    #[serde(default)]
    pub(crate) boundary: Option<Utf8PathBuf>,
    /// Write the scene here instead of standard output.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
}

impl RenderArgs {
    pub(crate) fn into_config(self) -> Result<RenderConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RenderConfig::try_from(merged)
    }
}

/// Resolved `render` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RenderConfig {
    /// Map and traffic API settings.
    pub(crate) map: MapConfig,
    /// Id of the element hosting the map.
    pub(crate) container: String,
    /// Optional replacement outline.
    pub(crate) boundary: Option<Utf8PathBuf>,
    /// Optional output file.
    pub(crate) output: Option<Utf8PathBuf>,
}

impl TryFrom<RenderArgs> for RenderConfig {
    type Error = CliError;

    fn try_from(args: RenderArgs) -> Result<Self, Self::Error> {
        let api_host = args.api_host.ok_or(CliError::MissingArgument {
            field: ARG_API_HOST,
            env: ENV_API_HOST,
        })?;
        let user_key = args.user_key.ok_or(CliError::MissingArgument {
            field: ARG_USER_KEY,
            env: ENV_USER_KEY,
        })?;
        let style = args.style.ok_or(CliError::MissingArgument {
            field: ARG_STYLE,
            env: ENV_STYLE,
        })?;

        let mut map = MapConfig::default()
            .with_api_host(api_host)
            .with_user_key(user_key)
            .with_style(style)
            .with_zoom(args.zoom.unwrap_or(DEFAULT_ZOOM));
        map.center.x = args.center_lon.unwrap_or(DEFAULT_CENTER.x);
        map.center.y = args.center_lat.unwrap_or(DEFAULT_CENTER.y);
        if let Some(token) = args.access_token {
            map = map.with_access_token(token);
        }

        Ok(Self {
            map,
            container: args
                .container
                .unwrap_or_else(|| DEFAULT_CONTAINER.to_owned()),
            boundary: args.boundary,
            output: args.output,
        })
    }
}

/// Builds the traffic feed for the current render invocation.
pub(crate) trait RenderFeedBuilder {
    fn build(&self, config: &RenderConfig) -> Result<Box<dyn TrafficFeed>, CliError>;
}

pub(crate) struct DefaultRenderFeedBuilder;

impl RenderFeedBuilder for DefaultRenderFeedBuilder {
    fn build(&self, config: &RenderConfig) -> Result<Box<dyn TrafficFeed>, CliError> {
        let feed = HttpTrafficFeed::with_config(HttpTrafficFeedConfig::from_map_config(
            &config.map,
        ))
        .map_err(|source| CliError::BuildFeed {
            api_host: config.map.api_host.clone(),
            source,
        })?;
        Ok(Box::new(feed))
    }
}

pub(crate) fn run_render(args: RenderArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_render_with(args, &DefaultRenderFeedBuilder, &mut stdout)
}

pub(crate) fn run_render_with(
    args: RenderArgs,
    builder: &dyn RenderFeedBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let scene = build_scene(&config, builder)?;
    let payload = serde_json::to_string_pretty(&scene).map_err(CliError::Serialize)?;
    match &config.output {
        Some(path) => write_scene_file(path, &payload),
        None => {
            writer
                .write_all(payload.as_bytes())
                .map_err(CliError::WriteOutput)?;
            writer.write_all(b"\n").map_err(CliError::WriteOutput)
        }
    }
}

/// Bootstrap the map, then draw both overlays once it is ready.
///
/// Overlay failures are logged and leave the rest of the scene intact.
pub(crate) fn build_scene(
    config: &RenderConfig,
    builder: &dyn RenderFeedBuilder,
) -> Result<Scene, CliError> {
    let mut bootstrapper = MapBootstrapper::new(config.map.clone());
    if let Some(path) = &config.boundary {
        bootstrapper = bootstrapper.with_boundary(load_boundary(path)?);
    }
    let feed = builder.build(config)?;

    let document = StaticDocument::with_elements([config.container.as_str()]);
    let ready = Rc::new(Cell::new(false));
    let on_ready = Rc::clone(&ready);
    let mut map: SceneMap = bootstrapper
        .init_map(
            &SceneEngine,
            &document,
            &format!("#{}", config.container),
            move |_map: &mut SceneMap| on_ready.set(true),
        )
        .ok_or_else(|| CliError::NoContainer {
            container: config.container.clone(),
        })?;
    map.load_style();

    if ready.get() {
        draw_overlays(feed.as_ref(), &mut map);
    } else {
        warn!("map did not become ready; skipping live overlays");
    }
    Ok(map.snapshot())
}

fn draw_overlays(feed: &dyn TrafficFeed, map: &mut SceneMap) {
    match display_traffic_status(feed, map) {
        Ok(TrafficOutcome::Rendered { features, skipped }) => {
            info!("traffic overlay drawn with {features} segments ({skipped} skipped)");
        }
        Ok(TrafficOutcome::NoData) => info!("traffic feed returned no data"),
        Err(err) => warn!("traffic overlay unavailable: {err}"),
    }
    match display_mountain_passes(feed, map) {
        Ok(ids) => info!("{} mountain pass markers placed", ids.len()),
        Err(err) => warn!("mountain pass markers unavailable: {err}"),
    }
}

pub(crate) fn load_boundary(path: &Utf8Path) -> Result<Boundary, CliError> {
    require_boundary_file(path)?;
    let text = itinisere_fs::read_to_string(path).map_err(|source| CliError::ReadBoundary {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path.file_stem().unwrap_or("boundary");
    Boundary::from_geojson_str(name, &text).map_err(|source| CliError::InvalidBoundary {
        path: path.to_path_buf(),
        source,
    })
}

fn require_boundary_file(path: &Utf8Path) -> Result<(), CliError> {
    match itinisere_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::MissingBoundaryFile {
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingBoundaryFile {
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::ReadBoundary {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn write_scene_file(path: &Utf8Path, payload: &str) -> Result<(), CliError> {
    let mut contents = payload.as_bytes().to_vec();
    contents.push(b'\n');
    itinisere_fs::write_file(path, &contents).map_err(|source| CliError::WriteOutputFile {
        path: path.to_path_buf(),
        source,
    })
}
