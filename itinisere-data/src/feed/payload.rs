//! Traffic API response envelopes.
//!
//! Both endpoints wrap their payload in a `Data` member. Decoding is lenient:
//! an envelope without usable data yields `None`, and individual records
//! that do not match the expected shape are skipped with a warning.

use geo::Coord;
use itinisere_core::passes::extract_update_time;
use itinisere_core::{ClosureReport, MountainPass, PassState, TrafficSegment};
use log::warn;
use serde::Deserialize;
use serde_json::Value;

/// One element of the traffic status `Data` array.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TrafficRecord {
    shape: Option<String>,
    #[serde(rename = "Type")]
    kind: Option<Value>,
}

/// One element of the closure list `Data.Closures` array.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ClosureRecord {
    name: Option<String>,
    coordinates: Option<Coordinates>,
    state: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Coordinates {
    longitude: f64,
    latitude: f64,
}

/// Largest magnitude below which every integral `f64` is exact.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Read a numeric code, accepting integral floats such as `2.0`.
fn integer_code(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|code| code.fract() == 0.0 && code.abs() <= MAX_EXACT_INTEGER)
            .map(|code| code as i64)
    })
}

fn segment(index: usize, item: &Value) -> Option<TrafficSegment> {
    match TrafficRecord::deserialize(item) {
        Ok(TrafficRecord {
            shape: Some(shape),
            kind: Some(kind),
        }) if !shape.is_empty() => {
            let Some(code) = integer_code(&kind) else {
                warn!("skipping traffic record {index}: Type {kind} is not an integer");
                return None;
            };
            Some(TrafficSegment { shape, kind: code })
        }
        Ok(_) => {
            warn!("skipping traffic record {index}: missing Shape or Type");
            None
        }
        Err(err) => {
            warn!("skipping traffic record {index}: {err}");
            None
        }
    }
}

fn mountain_pass(index: usize, item: &Value) -> Option<MountainPass> {
    match ClosureRecord::deserialize(item) {
        Ok(ClosureRecord {
            name: Some(name),
            coordinates: Some(coordinates),
            state,
        }) if !name.is_empty() => Some(MountainPass {
            name,
            position: Coord {
                x: coordinates.longitude,
                y: coordinates.latitude,
            },
            state: PassState::from_code(state.as_ref().and_then(integer_code)),
        }),
        Ok(_) => {
            warn!("skipping closure record {index}: missing Name or Coordinates");
            None
        }
        Err(err) => {
            warn!("skipping closure record {index}: {err}");
            None
        }
    }
}

/// Decode a `GetTrafficStatus` response.
///
/// Returns `None` when `Data` is missing or not an array. Elements lacking a
/// non-empty `Shape` string or an integer `Type` are skipped.
///
/// ```
/// use itinisere_data::parse_traffic_status;
/// use serde_json::json;
///
/// let body = json!({"Data": [{"Shape": "MULTILINESTRING ((5.0 45.0, 5.1 45.1))", "Type": 1}]});
/// let segments = parse_traffic_status(&body).expect("data array");
/// assert_eq!(segments[0].kind, 1);
/// assert!(parse_traffic_status(&json!({"Data": "not-an-array"})).is_none());
/// ```
#[must_use]
pub fn parse_traffic_status(body: &Value) -> Option<Vec<TrafficSegment>> {
    let items = body.get("Data")?.as_array()?;
    Some(
        items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| segment(index, item))
            .collect(),
    )
}

/// Decode a `GetClosureList` response.
///
/// Returns `None` unless `Data.Date` holds an epoch-millisecond timestamp and
/// `Data.Closures` is an array. Closures lacking a non-empty `Name` or
/// numeric `Coordinates` are skipped.
#[must_use]
pub fn parse_closure_list(body: &Value) -> Option<ClosureReport> {
    let data = body.get("Data")?;
    let updated_at = data
        .get("Date")
        .and_then(Value::as_str)
        .and_then(extract_update_time)?;
    let items = data.get("Closures")?.as_array()?;
    Some(ClosureReport {
        updated_at,
        passes: items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| mountain_pass(index, item))
            .collect(),
    })
}
