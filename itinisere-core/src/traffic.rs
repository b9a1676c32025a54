//! Traffic overlay: colour table, feature building and rendering.

use geojson::{Feature, FeatureCollection, GeoJson, JsonObject};
use log::{info, warn};

use crate::geometry::{ShapeError, parse_shape, to_geojson_geometry};
use crate::map::{GeoJsonSource, LineColor, LineLayer, MapError, MapSurface};

/// Source id of the traffic overlay.
pub const TRAFFIC_SOURCE_ID: &str = "traffic";
/// Layer id of the traffic overlay.
pub const TRAFFIC_LAYER_ID: &str = "traffic_layer";
/// Stroke width of traffic lines.
pub const TRAFFIC_LINE_WIDTH: f64 = 3.0;
/// Feature property holding the stroke colour.
pub const COLOR_PROPERTY: &str = "color";

/// Colour per traffic category, indexed by the API `Type` field.
pub const CATEGORY_COLORS: [(i64, &str); 4] = [
    (0, "#333"),
    (1, "#63FF00"),
    (2, "#FF9000"),
    (3, "#FF000D"),
];

/// Colour used for categories missing from [`CATEGORY_COLORS`].
pub const FALLBACK_COLOR: &str = "#333";

/// Colour of a traffic category.
///
/// ```
/// use itinisere_core::traffic::category_color;
///
/// assert_eq!(category_color(2), "#FF9000");
/// assert_eq!(category_color(42), "#333");
/// ```
#[must_use]
pub fn category_color(kind: i64) -> &'static str {
    CATEGORY_COLORS
        .iter()
        .find(|(category, _)| *category == kind)
        .map_or(FALLBACK_COLOR, |(_, color)| color)
}

/// One road segment reported by the traffic API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrafficSegment {
    /// WKT `MULTILINESTRING` of the segment.
    pub shape: String,
    /// Traffic category.
    pub kind: i64,
}

impl TrafficSegment {
    /// Build a segment.
    pub fn new(shape: impl Into<String>, kind: i64) -> Self {
        Self {
            shape: shape.into(),
            kind,
        }
    }
}

/// Convert a segment into a GeoJSON feature carrying its colour.
///
/// # Errors
///
/// Returns [`ShapeError`] when the shape is not a valid `MULTILINESTRING`.
pub fn traffic_feature(segment: &TrafficSegment) -> Result<Feature, ShapeError> {
    let shape = parse_shape(&segment.shape)?;
    let mut properties = JsonObject::new();
    properties.insert(
        COLOR_PROPERTY.to_owned(),
        category_color(segment.kind).into(),
    );
    Ok(Feature {
        bbox: None,
        geometry: Some(to_geojson_geometry(&shape)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    })
}

/// Features built from a batch of segments.
#[derive(Debug, Clone, PartialEq)]
pub struct TrafficCollection {
    /// Converted features, in input order.
    pub features: FeatureCollection,
    /// Number of segments whose shape failed to convert.
    pub skipped: usize,
}

/// Convert every segment, skipping and logging those with bad shapes.
#[must_use]
pub fn build_traffic_collection(segments: &[TrafficSegment]) -> TrafficCollection {
    let mut features = Vec::with_capacity(segments.len());
    let mut skipped = 0;
    for (index, segment) in segments.iter().enumerate() {
        match traffic_feature(segment) {
            Ok(feature) => features.push(feature),
            Err(err) => {
                warn!("skipping traffic record {index}: {err}");
                skipped += 1;
            }
        }
    }
    TrafficCollection {
        features: FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        },
        skipped,
    }
}

/// Result of a traffic render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrafficOutcome {
    /// The response held no traffic array; nothing was drawn.
    NoData,
    /// The overlay was added.
    Rendered {
        /// Features drawn.
        features: usize,
        /// Records dropped because their shape was invalid.
        skipped: usize,
    },
}

/// Add the traffic source and layer for `segments`.
///
/// An empty slice still adds an empty overlay. When the layer cannot be
/// added the source is removed again so the map is left unchanged.
///
/// # Errors
///
/// Returns [`MapError`] when the overlay ids are already taken.
pub fn render_traffic<M: MapSurface>(
    map: &mut M,
    segments: &[TrafficSegment],
) -> Result<TrafficOutcome, MapError> {
    let collection = build_traffic_collection(segments);
    let features = collection.features.features.len();
    map.add_source(
        TRAFFIC_SOURCE_ID,
        GeoJsonSource::new(GeoJson::FeatureCollection(collection.features)),
    )?;
    let layer = LineLayer::new(
        TRAFFIC_LAYER_ID,
        TRAFFIC_SOURCE_ID,
        LineColor::property(COLOR_PROPERTY),
        TRAFFIC_LINE_WIDTH,
    );
    if let Err(err) = map.add_layer(layer) {
        map.remove_source(TRAFFIC_SOURCE_ID)?;
        return Err(err);
    }
    info!(
        "rendered {features} traffic segments ({} skipped)",
        collection.skipped
    );
    Ok(TrafficOutcome::Rendered {
        features,
        skipped: collection.skipped,
    })
}

/// Remove the traffic layer and source if present.
///
/// Returns `true` when anything was removed.
///
/// # Errors
///
/// Returns [`MapError::SourceInUse`] when another layer still draws the
/// traffic source.
pub fn remove_traffic_overlay<M: MapSurface>(map: &mut M) -> Result<bool, MapError> {
    let mut removed = false;
    if map.has_layer(TRAFFIC_LAYER_ID) {
        map.remove_layer(TRAFFIC_LAYER_ID)?;
        removed = true;
    }
    if map.has_source(TRAFFIC_SOURCE_ID) {
        map.remove_source(TRAFFIC_SOURCE_ID)?;
        removed = true;
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneMap;
    use crate::test_support::blank_scene_map;
    use rstest::{fixture, rstest};

    #[fixture]
    fn map() -> SceneMap {
        blank_scene_map()
    }

    #[rstest]
    #[case(0, "#333")]
    #[case(1, "#63FF00")]
    #[case(2, "#FF9000")]
    #[case(3, "#FF000D")]
    #[case(-1, "#333")]
    #[case(7, "#333")]
    fn colours_follow_the_table(#[case] kind: i64, #[case] colour: &str) {
        assert_eq!(category_color(kind), colour);
    }

    #[rstest]
    fn feature_carries_colour_property() {
        let feature = traffic_feature(&TrafficSegment::new(
            "MULTILINESTRING ((5.0 45.0, 5.1 45.1))",
            1,
        ))
        .expect("valid shape");
        assert_eq!(
            feature.property(COLOR_PROPERTY),
            Some(&serde_json::json!("#63FF00"))
        );
    }

    #[rstest]
    fn bad_shapes_are_skipped_not_fatal() {
        let collection = build_traffic_collection(&[
            TrafficSegment::new("POINT (1 2)", 1),
            TrafficSegment::new("MULTILINESTRING ((5.0 45.0, 5.1 45.1))", 3),
        ]);
        assert_eq!(collection.skipped, 1);
        assert_eq!(collection.features.features.len(), 1);
    }

    #[rstest]
    fn empty_batch_still_adds_overlay(mut map: SceneMap) {
        let outcome = render_traffic(&mut map, &[]).expect("render");
        assert_eq!(
            outcome,
            TrafficOutcome::Rendered {
                features: 0,
                skipped: 0
            }
        );
        assert!(map.has_source(TRAFFIC_SOURCE_ID));
        assert!(map.has_layer(TRAFFIC_LAYER_ID));
    }

    #[rstest]
    fn layer_conflict_rolls_back_source(mut map: SceneMap) {
        map.add_source(
            "other",
            GeoJsonSource::new(GeoJson::FeatureCollection(FeatureCollection {
                bbox: None,
                features: Vec::new(),
                foreign_members: None,
            })),
        )
        .expect("other source");
        map.add_layer(LineLayer::new(
            TRAFFIC_LAYER_ID,
            "other",
            LineColor::fixed("#000"),
            1.0,
        ))
        .expect("squatting layer");

        let err = render_traffic(&mut map, &[]).expect_err("layer id is taken");
        assert!(matches!(err, MapError::DuplicateLayer { .. }));
        assert!(!map.has_source(TRAFFIC_SOURCE_ID));
    }

    #[rstest]
    fn removal_reports_whether_anything_changed(mut map: SceneMap) {
        assert!(!remove_traffic_overlay(&mut map).expect("nothing to remove"));
        render_traffic(&mut map, &[]).expect("render");
        assert!(remove_traffic_overlay(&mut map).expect("remove"));
        assert!(!map.has_source(TRAFFIC_SOURCE_ID));
        assert!(!map.has_layer(TRAFFIC_LAYER_ID));
    }
}
