//! Test doubles shared by unit and behaviour tests.

use std::cell::Cell;

use geo::Coord;

use crate::feed::{FeedError, TrafficFeed};
use crate::map::{Container, MapEngine, MapOptions};
use crate::passes::ClosureReport;
use crate::scene::SceneMap;
use crate::traffic::TrafficSegment;

/// `TrafficFeed` returning canned data and counting requests.
///
/// By default both calls return `Ok(None)`.
#[derive(Debug, Default)]
pub struct FixedTrafficFeed {
    segments: Option<Vec<TrafficSegment>>,
    report: Option<ClosureReport>,
    error: Option<FeedError>,
    traffic_requests: Cell<usize>,
    closure_requests: Cell<usize>,
}

impl FixedTrafficFeed {
    /// Answer traffic requests with `segments`.
    #[must_use]
    pub fn with_segments(mut self, segments: Vec<TrafficSegment>) -> Self {
        self.segments = Some(segments);
        self
    }

    /// Answer closure requests with `report`.
    #[must_use]
    pub fn with_report(mut self, report: ClosureReport) -> Self {
        self.report = Some(report);
        self
    }

    /// Fail every request with `error`.
    #[must_use]
    pub fn with_error(mut self, error: FeedError) -> Self {
        self.error = Some(error);
        self
    }

    /// Number of traffic requests served.
    #[must_use]
    pub fn traffic_requests(&self) -> usize {
        self.traffic_requests.get()
    }

    /// Number of closure requests served.
    #[must_use]
    pub fn closure_requests(&self) -> usize {
        self.closure_requests.get()
    }

    fn fail(&self) -> Result<(), FeedError> {
        self.error.clone().map_or(Ok(()), Err)
    }
}

impl TrafficFeed for FixedTrafficFeed {
    fn traffic_status(&self) -> Result<Option<Vec<TrafficSegment>>, FeedError> {
        self.traffic_requests.set(self.traffic_requests.get() + 1);
        self.fail()?;
        Ok(self.segments.clone())
    }

    fn closure_list(&self) -> Result<Option<ClosureReport>, FeedError> {
        self.closure_requests.set(self.closure_requests.get() + 1);
        self.fail()?;
        Ok(self.report.clone())
    }
}

/// `MapEngine` producing [`SceneMap`]s and counting how many it built.
#[derive(Debug, Default)]
pub struct CountingEngine {
    created: Cell<usize>,
}

impl CountingEngine {
    /// Maps created so far.
    #[must_use]
    pub fn created(&self) -> usize {
        self.created.get()
    }
}

impl MapEngine for CountingEngine {
    type Map = SceneMap;

    fn create_map(&self, container: &Container, options: MapOptions) -> SceneMap {
        self.created.set(self.created.get() + 1);
        SceneMap::new(container.clone(), options)
    }
}

/// A [`SceneMap`] in a `map` container centred on the origin.
#[must_use]
pub fn blank_scene_map() -> SceneMap {
    SceneMap::new(
        Container::new("map"),
        MapOptions {
            style: String::new(),
            access_token: None,
            center: Coord { x: 0.0, y: 0.0 },
            zoom: 1.0,
        },
    )
}
