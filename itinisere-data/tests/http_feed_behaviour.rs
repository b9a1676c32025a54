//! Behavioural tests for decoding traffic API responses.
//!
//! These tests use [`StubTrafficFeed`] so no traffic service is required.

use chrono::Utc;
use itinisere_core::test_support::blank_scene_map;
use itinisere_core::traffic::{TRAFFIC_LAYER_ID, TRAFFIC_SOURCE_ID};
use itinisere_core::{
    FeedError, MapSurface, OverlayError, SceneMap, TrafficOutcome, display_mountain_passes_in,
    display_traffic_status,
};
use itinisere_data::feed::test_support::StubTrafficFeed;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::json;
use std::cell::RefCell;

/// Result cell holding the outcome of a traffic display.
type ResultCell = RefCell<Option<Result<TrafficOutcome, OverlayError>>>;

#[fixture]
fn feed() -> RefCell<StubTrafficFeed> {
    RefCell::new(StubTrafficFeed::default())
}

#[fixture]
fn map() -> RefCell<SceneMap> {
    RefCell::new(blank_scene_map())
}

#[fixture]
fn result() -> ResultCell {
    RefCell::new(None)
}

// --- Given steps ---

#[given("a traffic response with one segment of type 1")]
fn one_segment(#[from(feed)] feed: &RefCell<StubTrafficFeed>) {
    feed.replace(StubTrafficFeed::default().with_traffic_body(json!({
        "Data": [{"Shape": "MULTILINESTRING ((5.0 45.0, 5.1 45.1))", "Type": 1}]
    })));
}

#[given("a traffic response whose data is not an array")]
fn not_an_array(#[from(feed)] feed: &RefCell<StubTrafficFeed>) {
    feed.replace(StubTrafficFeed::default().with_traffic_body(json!({"Data": "not-an-array"})));
}

#[given("a traffic response without data")]
fn without_data(#[from(feed)] feed: &RefCell<StubTrafficFeed>) {
    feed.replace(StubTrafficFeed::default().with_traffic_body(json!({"Status": "OK"})));
}

#[given("a closure response whose first pass has no coordinates")]
fn pass_without_coordinates(#[from(feed)] feed: &RefCell<StubTrafficFeed>) {
    feed.replace(StubTrafficFeed::default().with_closure_body(json!({
        "Data": {
            "Date": "/Date(1700000000000)/",
            "Closures": [
                {"Name": "Col de Porte", "State": 2},
                {"Name": "Col du Coq", "State": 0, "Coordinates": {"Longitude": 5.86, "Latitude": 45.32}}
            ]
        }
    })));
}

#[given("a traffic service that fails with a network error")]
fn network_error(#[from(feed)] feed: &RefCell<StubTrafficFeed>) {
    feed.replace(StubTrafficFeed::with_error(FeedError::Network {
        url: "https://traffic.example.com/api/traffic/v2/GetTrafficStatus/json".to_string(),
        message: "connection refused".to_string(),
    }));
}

// --- When steps ---

#[when("the traffic status is displayed")]
fn display_traffic(
    #[from(feed)] feed: &RefCell<StubTrafficFeed>,
    #[from(map)] map: &RefCell<SceneMap>,
    #[from(result)] result: &ResultCell,
) {
    let outcome = display_traffic_status(&*feed.borrow(), &mut *map.borrow_mut());
    result.replace(Some(outcome));
}

#[when("the mountain passes are displayed")]
fn display_passes(
    #[from(feed)] feed: &RefCell<StubTrafficFeed>,
    #[from(map)] map: &RefCell<SceneMap>,
) {
    display_mountain_passes_in(&*feed.borrow(), &mut *map.borrow_mut(), &Utc)
        .expect("display succeeds");
}

// --- Then steps ---

#[then("one traffic feature coloured #63FF00 is drawn")]
fn one_green_feature(#[from(map)] map: &RefCell<SceneMap>) {
    let map = map.borrow();
    assert!(map.has_layer(TRAFFIC_LAYER_ID));
    let source = map.source(TRAFFIC_SOURCE_ID).expect("traffic source");
    let data = serde_json::to_value(&source.data).expect("GeoJSON serialises");
    let features = data["features"].as_array().expect("feature array");
    assert_eq!(features.len(), 1);
    assert_eq!(features[0]["properties"]["color"], "#63FF00");
    assert_eq!(features[0]["geometry"]["type"], "MultiLineString");
    assert_eq!(
        features[0]["geometry"]["coordinates"],
        json!([[[5.0, 45.0], [5.1, 45.1]]])
    );
}

#[then("no traffic overlay is drawn")]
fn nothing_drawn(#[from(map)] map: &RefCell<SceneMap>, #[from(result)] result: &ResultCell) {
    let map = map.borrow();
    assert!(!map.has_source(TRAFFIC_SOURCE_ID));
    assert!(!map.has_layer(TRAFFIC_LAYER_ID));
    let borrowed = result.borrow();
    assert!(
        matches!(&*borrowed, Some(Ok(TrafficOutcome::NoData))),
        "expected NoData, got {borrowed:?}"
    );
}

#[then("1 pass marker is placed")]
fn one_marker(#[from(map)] map: &RefCell<SceneMap>) {
    let map = map.borrow();
    assert_eq!(map.marker_count(), 1);
    let marker = map.markers().next().expect("one marker");
    assert_eq!(marker.background_color, "#08d500");
    let popup = marker.popup.as_ref().expect("popup");
    assert!(popup.html.contains("<h3>Col du Coq</h3>"));
    assert!(popup.html.contains("Ouvert"));
}

#[then("a feed error is returned and nothing is drawn")]
fn feed_error(#[from(map)] map: &RefCell<SceneMap>, #[from(result)] result: &ResultCell) {
    let borrowed = result.borrow();
    assert!(
        matches!(&*borrowed, Some(Err(OverlayError::Feed(FeedError::Network { .. })))),
        "expected a network error, got {borrowed:?}"
    );
    assert!(!map.borrow().has_source(TRAFFIC_SOURCE_ID));
}

// --- Scenario registrations ---

macro_rules! register_scenario {
    ($fn_name:ident, $title:literal) => {
        #[scenario(path = "tests/features/http_feed.feature", name = $title)]
        fn $fn_name(feed: RefCell<StubTrafficFeed>, map: RefCell<SceneMap>, result: ResultCell) {
            let _ = (feed, map, result);
        }
    };
}

register_scenario!(rendering_single_segment, "rendering a single segment");
register_scenario!(ignoring_non_array, "ignoring a non-array payload");
register_scenario!(ignoring_missing_payload, "ignoring a missing payload");
register_scenario!(skipping_pass_without_coordinates, "skipping a pass without coordinates");
register_scenario!(handling_network_error, "handling a network error");
