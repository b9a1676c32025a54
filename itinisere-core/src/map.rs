//! Seam between the overlays and whatever mapping engine draws them.
//!
//! The bootstrapper and the fetchers only ever talk to a [`MapSurface`]:
//! add a GeoJSON source, add a line layer, place a marker, fit the viewport.
//! [`MapEngine`] creates surfaces and [`Document`] resolves the container
//! element a map is mounted in.
//!
//! [`crate::scene::SceneMap`] is the in-tree engine; it records every command
//! and can be serialised for a browser front-end to replay.

use geo::{Coord, Rect};
use geojson::GeoJson;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Callback invoked once the map style has finished loading.
pub type StyleLoadCallback<M> = Box<dyn FnOnce(&mut M)>;

/// Options the map is constructed with.
#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    /// Style reference.
    pub style: String,
    /// Tile service token, when one is required.
    pub access_token: Option<String>,
    /// Initial centre (`x = longitude`, `y = latitude`).
    pub center: Coord<f64>,
    /// Initial zoom level.
    pub zoom: f64,
}

/// UI controls that can be attached to a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MapControl {
    /// Pan and zoom buttons.
    Navigation,
}

/// A resolved container element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    /// Element id.
    pub id: String,
}

impl Container {
    /// Wrap an element id.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// A GeoJSON data source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoJsonSource {
    /// Source payload.
    pub data: GeoJson,
}

impl GeoJsonSource {
    /// Wrap a GeoJSON document.
    #[must_use]
    pub const fn new(data: GeoJson) -> Self {
        Self { data }
    }
}

/// Stroke colour of a line layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineColor {
    /// The same colour for every feature.
    Fixed(String),
    /// Read per feature from the named property.
    Property(String),
}

impl LineColor {
    /// A fixed colour.
    pub fn fixed(color: impl Into<String>) -> Self {
        Self::Fixed(color.into())
    }

    /// A colour taken from a feature property.
    pub fn property(name: impl Into<String>) -> Self {
        Self::Property(name.into())
    }

    /// Colour as a Mapbox style expression.
    #[must_use]
    pub fn expression(&self) -> serde_json::Value {
        match self {
            Self::Fixed(color) => json!(color),
            Self::Property(name) => json!(["get", name]),
        }
    }
}

/// A line layer rendering one source.
#[derive(Debug, Clone, PartialEq)]
pub struct LineLayer {
    /// Layer identifier, unique per map.
    pub id: String,
    /// Identifier of the source the layer draws.
    pub source: String,
    /// Stroke colour.
    pub color: LineColor,
    /// Stroke width in pixels.
    pub width: f64,
}

impl LineLayer {
    /// Build a line layer.
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        color: LineColor,
        width: f64,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            color,
            width,
        }
    }

    /// Paint properties as Mapbox style JSON.
    #[must_use]
    pub fn paint(&self) -> serde_json::Value {
        json!({
            "line-color": self.color.expression(),
            "line-width": self.width,
        })
    }
}

/// Popup attached to a marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Popup {
    /// Pixel offset from the marker.
    pub offset: u32,
    /// HTML content.
    pub html: String,
}

/// A point marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// Marker position (`x = longitude`, `y = latitude`).
    pub position: Coord<f64>,
    /// CSS class of the marker element.
    pub class_name: String,
    /// Background colour of the marker element.
    pub background_color: String,
    /// Popup opened when the marker is clicked.
    pub popup: Option<Popup>,
}

/// Handle to a marker placed on a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MarkerId(u64);

impl MarkerId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Options for [`MapSurface::fit_bounds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FitBoundsOptions {
    /// Padding in pixels around the bounds.
    pub padding: u32,
}

/// Errors raised by map mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    /// A source with the same id is already registered.
    #[error("source {id:?} already exists")]
    DuplicateSource {
        /// Offending source id.
        id: String,
    },
    /// A layer with the same id is already registered.
    #[error("layer {id:?} already exists")]
    DuplicateLayer {
        /// Offending layer id.
        id: String,
    },
    /// No source with this id exists.
    #[error("source {id:?} does not exist")]
    UnknownSource {
        /// Missing source id.
        id: String,
    },
    /// No layer with this id exists.
    #[error("layer {id:?} does not exist")]
    UnknownLayer {
        /// Missing layer id.
        id: String,
    },
    /// The source is still drawn by a layer.
    #[error("source {id:?} is still used by layer {layer:?}")]
    SourceInUse {
        /// Source id.
        id: String,
        /// Layer that references it.
        layer: String,
    },
}

/// Mutable map handle the overlays draw onto.
pub trait MapSurface {
    /// Attach a UI control.
    fn add_control(&mut self, control: MapControl);

    /// Register a callback to run once the style has loaded.
    fn on_style_load(&mut self, callback: StyleLoadCallback<Self>)
    where
        Self: Sized;

    /// Register a GeoJSON source.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::DuplicateSource`] when `id` is taken.
    fn add_source(&mut self, id: &str, source: GeoJsonSource) -> Result<(), MapError>;

    /// Register a line layer.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::DuplicateLayer`] when the layer id is taken and
    /// [`MapError::UnknownSource`] when its source does not exist.
    fn add_layer(&mut self, layer: LineLayer) -> Result<(), MapError>;

    /// Remove a layer.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::UnknownLayer`] when `id` is not registered.
    fn remove_layer(&mut self, id: &str) -> Result<(), MapError>;

    /// Remove a source.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::UnknownSource`] when `id` is not registered and
    /// [`MapError::SourceInUse`] while a layer still draws it.
    fn remove_source(&mut self, id: &str) -> Result<(), MapError>;

    /// Whether a source with this id exists.
    fn has_source(&self, id: &str) -> bool;

    /// Whether a layer with this id exists.
    fn has_layer(&self, id: &str) -> bool;

    /// Place a marker and return its handle.
    fn add_marker(&mut self, marker: Marker) -> MarkerId;

    /// Remove a marker. Returns `false` when it was not on the map.
    fn remove_marker(&mut self, id: MarkerId) -> bool;

    /// Move the viewport so `bounds` is fully visible.
    fn fit_bounds(&mut self, bounds: Rect<f64>, options: FitBoundsOptions);
}

/// Creates maps inside container elements.
pub trait MapEngine {
    /// Map handle produced by this engine.
    type Map: MapSurface;

    /// Construct a map synchronously inside `container`.
    fn create_map(&self, container: &Container, options: MapOptions) -> Self::Map;
}

/// Resolves selectors to container elements.
pub trait Document {
    /// Return the single element matching `selector`, if any.
    fn query_selector(&self, selector: &str) -> Option<Container>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn fixed_colour_is_a_plain_string() {
        assert_eq!(LineColor::fixed("#ef8a64").expression(), json!("#ef8a64"));
    }

    #[rstest]
    fn property_colour_is_a_get_expression() {
        assert_eq!(
            LineColor::property("color").expression(),
            json!(["get", "color"])
        );
    }

    #[rstest]
    fn paint_carries_colour_and_width() {
        let layer = LineLayer::new("traffic_layer", "traffic", LineColor::property("color"), 3.0);
        assert_eq!(
            layer.paint(),
            json!({"line-color": ["get", "color"], "line-width": 3.0})
        );
    }
}
