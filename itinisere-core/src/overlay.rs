//! Fetch-then-draw entry points combining a [`TrafficFeed`] with a map.

use std::fmt::Display;

use chrono::{Local, TimeZone};
use log::{debug, info};
use thiserror::Error;

use crate::feed::{FeedError, TrafficFeed};
use crate::map::{MapError, MapSurface, MarkerId};
use crate::passes::{MountainPassMarkers, render_mountain_passes};
use crate::traffic::{TrafficOutcome, remove_traffic_overlay, render_traffic};

/// Errors raised while displaying an overlay.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverlayError {
    /// Fetching the data failed.
    #[error(transparent)]
    Feed(#[from] FeedError),
    /// Drawing onto the map failed.
    #[error(transparent)]
    Map(#[from] MapError),
}

/// Fetch the traffic status and draw it as the `traffic` overlay.
///
/// # Errors
///
/// Returns [`OverlayError::Feed`] when the request fails and
/// [`OverlayError::Map`] when the overlay is already on the map.
pub fn display_traffic_status<F, M>(feed: &F, map: &mut M) -> Result<TrafficOutcome, OverlayError>
where
    F: TrafficFeed + ?Sized,
    M: MapSurface,
{
    let Some(segments) = feed.traffic_status()? else {
        info!("traffic response carried no data");
        return Ok(TrafficOutcome::NoData);
    };
    Ok(render_traffic(map, &segments)?)
}

/// Replace any traffic overlay with fresh data.
///
/// The feed is queried before anything is removed, so a failed request
/// leaves the previous overlay in place.
///
/// # Errors
///
/// As [`display_traffic_status`].
pub fn refresh_traffic_status<F, M>(feed: &F, map: &mut M) -> Result<TrafficOutcome, OverlayError>
where
    F: TrafficFeed + ?Sized,
    M: MapSurface,
{
    let segments = feed.traffic_status()?;
    if remove_traffic_overlay(map)? {
        debug!("removed previous traffic overlay");
    }
    match segments {
        Some(segments) => Ok(render_traffic(map, &segments)?),
        None => Ok(TrafficOutcome::NoData),
    }
}

/// Fetch the closure list and place one marker per pass, timestamps in the
/// local time zone.
///
/// # Errors
///
/// Returns [`OverlayError::Feed`] when the request fails.
pub fn display_mountain_passes<F, M>(feed: &F, map: &mut M) -> Result<Vec<MarkerId>, OverlayError>
where
    F: TrafficFeed + ?Sized,
    M: MapSurface,
{
    display_mountain_passes_in(feed, map, &Local)
}

/// [`display_mountain_passes`] with timestamps rendered in `tz`.
///
/// # Errors
///
/// Returns [`OverlayError::Feed`] when the request fails.
pub fn display_mountain_passes_in<F, M, Tz>(
    feed: &F,
    map: &mut M,
    tz: &Tz,
) -> Result<Vec<MarkerId>, OverlayError>
where
    F: TrafficFeed + ?Sized,
    M: MapSurface,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let Some(report) = feed.closure_list()? else {
        info!("closure response carried no data");
        return Ok(Vec::new());
    };
    Ok(render_mountain_passes(map, &report, tz))
}

/// Fetch the closure list and replace the markers tracked by `markers`.
///
/// When the response carries no data the existing markers stay.
///
/// # Errors
///
/// Returns [`OverlayError::Feed`] when the request fails.
pub fn refresh_mountain_passes<F, M, Tz>(
    feed: &F,
    map: &mut M,
    markers: &mut MountainPassMarkers,
    tz: &Tz,
) -> Result<usize, OverlayError>
where
    F: TrafficFeed + ?Sized,
    M: MapSurface,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let Some(report) = feed.closure_list()? else {
        return Ok(markers.ids().len());
    };
    markers.refresh(map, &report, tz);
    Ok(markers.ids().len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::{ClosureReport, MountainPass, PassState};
    use crate::scene::SceneMap;
    use crate::test_support::{FixedTrafficFeed, blank_scene_map};
    use crate::traffic::{TRAFFIC_LAYER_ID, TRAFFIC_SOURCE_ID, TrafficSegment};
    use chrono::{DateTime, Utc};
    use geo::Coord;
    use rstest::{fixture, rstest};

    #[fixture]
    fn map() -> SceneMap {
        blank_scene_map()
    }

    fn one_segment() -> Vec<TrafficSegment> {
        vec![TrafficSegment::new(
            "MULTILINESTRING ((5.0 45.0, 5.1 45.1))",
            1,
        )]
    }

    #[rstest]
    fn no_data_leaves_map_untouched(mut map: SceneMap) {
        let feed = FixedTrafficFeed::default();
        let outcome = display_traffic_status(&feed, &mut map).expect("display");
        assert_eq!(outcome, TrafficOutcome::NoData);
        assert!(!map.has_source(TRAFFIC_SOURCE_ID));
        assert!(!map.has_layer(TRAFFIC_LAYER_ID));
    }

    #[rstest]
    fn feed_errors_surface(mut map: SceneMap) {
        let feed = FixedTrafficFeed::default().with_error(FeedError::Timeout {
            url: "https://api.example.com".to_owned(),
            timeout_secs: 30,
        });
        let err = display_traffic_status(&feed, &mut map).expect_err("should fail");
        assert!(matches!(err, OverlayError::Feed(FeedError::Timeout { .. })));
        let err = display_mountain_passes_in(&feed, &mut map, &Utc).expect_err("should fail");
        assert!(matches!(err, OverlayError::Feed(_)));
    }

    #[rstest]
    fn second_display_is_a_duplicate(mut map: SceneMap) {
        let feed = FixedTrafficFeed::default().with_segments(one_segment());
        display_traffic_status(&feed, &mut map).expect("first display");
        let err = display_traffic_status(&feed, &mut map).expect_err("second display");
        assert!(matches!(
            err,
            OverlayError::Map(MapError::DuplicateSource { .. })
        ));
        let outcome = refresh_traffic_status(&feed, &mut map).expect("refresh");
        assert_eq!(
            outcome,
            TrafficOutcome::Rendered {
                features: 1,
                skipped: 0
            }
        );
        assert_eq!(feed.traffic_requests(), 3);
    }

    #[rstest]
    fn failed_refresh_keeps_previous_overlay(mut map: SceneMap) {
        let feed = FixedTrafficFeed::default().with_segments(one_segment());
        display_traffic_status(&feed, &mut map).expect("display");

        let failing = FixedTrafficFeed::default().with_error(FeedError::Cancelled {
            url: "https://api.example.com".to_owned(),
        });
        refresh_traffic_status(&failing, &mut map).expect_err("refresh should fail");
        assert!(map.has_layer(TRAFFIC_LAYER_ID));
    }

    #[rstest]
    fn missing_closures_place_nothing(mut map: SceneMap) {
        let feed = FixedTrafficFeed::default();
        let ids = display_mountain_passes_in(&feed, &mut map, &Utc).expect("display");
        assert!(ids.is_empty());
        assert_eq!(map.marker_count(), 0);
        assert_eq!(feed.closure_requests(), 1);
    }

    #[rstest]
    fn passes_are_fetched_once_per_display(mut map: SceneMap) {
        let report = ClosureReport {
            updated_at: DateTime::from_timestamp_millis(1_700_000_000_000).expect("valid"),
            passes: vec![MountainPass {
                name: "Col de Porte".to_owned(),
                position: Coord { x: 5.77, y: 45.29 },
                state: PassState::Closed,
            }],
        };
        let feed = FixedTrafficFeed::default().with_report(report);
        let ids = display_mountain_passes_in(&feed, &mut map, &Utc).expect("display");
        assert_eq!(ids.len(), 1);
        assert_eq!(feed.closure_requests(), 1);
        assert_eq!(feed.traffic_requests(), 0);
    }
}
