//! Core domain for the Itinisère traffic map.
//!
//! A map is created through [`MapBootstrapper`], which draws the department
//! outline once the style has loaded and then hands the map to the caller.
//! The caller typically runs [`display_traffic_status`] and
//! [`display_mountain_passes`] against a [`TrafficFeed`] to add the live
//! overlays.
//!
//! Maps are reached through the [`MapSurface`] trait so the overlays do not
//! depend on a particular rendering engine. [`scene::SceneMap`] records the
//! commands it receives and serialises them as a scene document.

#![forbid(unsafe_code)]

pub mod bootstrap;
pub mod boundary;
pub mod config;
pub mod feed;
pub mod geometry;
pub mod map;
pub mod overlay;
pub mod passes;
pub mod scene;
pub mod traffic;

#[doc(hidden)]
pub mod test_support;

pub use bootstrap::{MapBootstrapper, apply_boundary};
pub use boundary::{Boundary, BoundaryError};
pub use config::MapConfig;
pub use feed::{FeedError, TrafficFeed};
pub use geometry::{ShapeError, parse_shape, to_geojson, to_geojson_geometry};
pub use map::{
    Container, Document, FitBoundsOptions, GeoJsonSource, LineColor, LineLayer, MapControl,
    MapEngine, MapError, MapOptions, MapSurface, Marker, MarkerId, Popup, StyleLoadCallback,
};
pub use overlay::{
    OverlayError, display_mountain_passes, display_mountain_passes_in, display_traffic_status,
    refresh_mountain_passes, refresh_traffic_status,
};
pub use passes::{ClosureReport, MountainPass, MountainPassMarkers, PassState};
pub use scene::{Scene, SceneEngine, SceneMap, StaticDocument};
pub use traffic::{TrafficOutcome, TrafficSegment, remove_traffic_overlay};
