//! Facade crate for the Itinisère traffic map.
//!
//! This crate re-exports the core domain types and, behind the `http`
//! feature, the HTTP traffic feed.

#![forbid(unsafe_code)]

pub use itinisere_core::{
    Boundary, BoundaryError, ClosureReport, FeedError, MapBootstrapper, MapConfig, MapEngine,
    MapError, MapSurface, MountainPass, MountainPassMarkers, OverlayError, PassState, Scene,
    SceneEngine, SceneMap, ShapeError, StaticDocument, TrafficFeed, TrafficOutcome,
    TrafficSegment, display_mountain_passes, display_traffic_status, refresh_mountain_passes,
    refresh_traffic_status, to_geojson,
};

#[cfg(feature = "http")]
pub use itinisere_data::{FeedBuildError, HttpTrafficFeed, HttpTrafficFeedConfig};
