//! Recording map engine.
//!
//! [`SceneMap`] implements [`MapSurface`] by keeping every source, layer,
//! marker and viewport command in memory. [`SceneMap::snapshot`] turns that
//! state into a [`Scene`] document a browser front-end can replay with its
//! own mapping library.

use geo::{Coord, Rect};
use geojson::GeoJson;
use serde::Serialize;

use crate::map::{
    Container, Document, FitBoundsOptions, GeoJsonSource, LineLayer, MapControl, MapEngine,
    MapError, MapOptions, MapSurface, Marker, MarkerId, Popup, StyleLoadCallback,
};

/// Viewport fitted by [`MapSurface::fit_bounds`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Bounds that must stay visible.
    pub bounds: Rect<f64>,
    /// Padding in pixels.
    pub padding: u32,
}

/// In-memory map that records the commands applied to it.
pub struct SceneMap {
    container: Container,
    options: MapOptions,
    controls: Vec<MapControl>,
    sources: Vec<(String, GeoJsonSource)>,
    layers: Vec<LineLayer>,
    markers: Vec<(MarkerId, Marker)>,
    viewport: Option<Viewport>,
    style_loaded: bool,
    pending: Vec<StyleLoadCallback<Self>>,
    next_marker: u64,
}

impl std::fmt::Debug for SceneMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneMap")
            .field("container", &self.container)
            .field("options", &self.options)
            .field("controls", &self.controls)
            .field("sources", &self.sources.len())
            .field("layers", &self.layers)
            .field("markers", &self.markers.len())
            .field("viewport", &self.viewport)
            .field("style_loaded", &self.style_loaded)
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl SceneMap {
    /// Create an empty map inside `container`.
    #[must_use]
    pub const fn new(container: Container, options: MapOptions) -> Self {
        Self {
            container,
            options,
            controls: Vec::new(),
            sources: Vec::new(),
            layers: Vec::new(),
            markers: Vec::new(),
            viewport: None,
            style_loaded: false,
            pending: Vec::new(),
            next_marker: 0,
        }
    }

    /// Mark the style as loaded and run the queued callbacks in order.
    ///
    /// Callbacks registered while this runs, or afterwards, execute
    /// immediately.
    pub fn load_style(&mut self) {
        self.style_loaded = true;
        for callback in std::mem::take(&mut self.pending) {
            callback(self);
        }
    }

    /// Whether [`Self::load_style`] has run.
    #[must_use]
    pub const fn style_loaded(&self) -> bool {
        self.style_loaded
    }

    /// Container the map is mounted in.
    #[must_use]
    pub const fn container(&self) -> &Container {
        &self.container
    }

    /// Construction options.
    #[must_use]
    pub const fn options(&self) -> &MapOptions {
        &self.options
    }

    /// Attached controls.
    #[must_use]
    pub fn controls(&self) -> &[MapControl] {
        &self.controls
    }

    /// Source registered under `id`.
    #[must_use]
    pub fn source(&self, id: &str) -> Option<&GeoJsonSource> {
        self.sources
            .iter()
            .find(|(source_id, _)| source_id == id)
            .map(|(_, source)| source)
    }

    /// Registered source ids in insertion order.
    pub fn source_ids(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|(id, _)| id.as_str())
    }

    /// Registered layers in drawing order.
    #[must_use]
    pub fn layers(&self) -> &[LineLayer] {
        &self.layers
    }

    /// Layer registered under `id`.
    #[must_use]
    pub fn layer(&self, id: &str) -> Option<&LineLayer> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    /// Markers currently on the map.
    pub fn markers(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter().map(|(_, marker)| marker)
    }

    /// Marker placed under `id`.
    #[must_use]
    pub fn marker(&self, id: MarkerId) -> Option<&Marker> {
        self.markers
            .iter()
            .find(|(marker_id, _)| *marker_id == id)
            .map(|(_, marker)| marker)
    }

    /// Number of markers on the map.
    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Last fitted viewport.
    #[must_use]
    pub const fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    /// Serialisable view of the current map state.
    #[must_use]
    pub fn snapshot(&self) -> Scene {
        Scene {
            container: self.container.id.clone(),
            style: self.options.style.clone(),
            access_token: self.options.access_token.clone(),
            center: coord_pair(self.options.center),
            zoom: self.options.zoom,
            controls: self.controls.clone(),
            sources: self
                .sources
                .iter()
                .map(|(id, source)| SceneSource {
                    id: id.clone(),
                    kind: "geojson",
                    data: source.data.clone(),
                })
                .collect(),
            layers: self
                .layers
                .iter()
                .map(|layer| SceneLayer {
                    id: layer.id.clone(),
                    kind: "line",
                    source: layer.source.clone(),
                    paint: layer.paint(),
                })
                .collect(),
            markers: self
                .markers
                .iter()
                .map(|(id, marker)| SceneMarker {
                    id: *id,
                    lng_lat: coord_pair(marker.position),
                    class_name: marker.class_name.clone(),
                    background_color: marker.background_color.clone(),
                    popup: marker.popup.clone(),
                })
                .collect(),
            viewport: self.viewport.map(|viewport| SceneViewport {
                bounds: [coord_pair(viewport.bounds.min()), coord_pair(viewport.bounds.max())],
                padding: viewport.padding,
            }),
        }
    }

    fn layer_using(&self, source: &str) -> Option<&LineLayer> {
        self.layers.iter().find(|layer| layer.source == source)
    }
}

const fn coord_pair(coord: Coord<f64>) -> [f64; 2] {
    [coord.x, coord.y]
}

impl MapSurface for SceneMap {
    fn add_control(&mut self, control: MapControl) {
        self.controls.push(control);
    }

    fn on_style_load(&mut self, callback: StyleLoadCallback<Self>) {
        if self.style_loaded {
            callback(self);
        } else {
            self.pending.push(callback);
        }
    }

    fn add_source(&mut self, id: &str, source: GeoJsonSource) -> Result<(), MapError> {
        if self.has_source(id) {
            return Err(MapError::DuplicateSource { id: id.to_owned() });
        }
        self.sources.push((id.to_owned(), source));
        Ok(())
    }

    fn add_layer(&mut self, layer: LineLayer) -> Result<(), MapError> {
        if self.has_layer(&layer.id) {
            return Err(MapError::DuplicateLayer { id: layer.id });
        }
        if !self.has_source(&layer.source) {
            return Err(MapError::UnknownSource { id: layer.source });
        }
        self.layers.push(layer);
        Ok(())
    }

    fn remove_layer(&mut self, id: &str) -> Result<(), MapError> {
        let position = self
            .layers
            .iter()
            .position(|layer| layer.id == id)
            .ok_or_else(|| MapError::UnknownLayer { id: id.to_owned() })?;
        self.layers.remove(position);
        Ok(())
    }

    fn remove_source(&mut self, id: &str) -> Result<(), MapError> {
        if let Some(layer) = self.layer_using(id) {
            return Err(MapError::SourceInUse {
                id: id.to_owned(),
                layer: layer.id.clone(),
            });
        }
        let position = self
            .sources
            .iter()
            .position(|(source_id, _)| source_id == id)
            .ok_or_else(|| MapError::UnknownSource { id: id.to_owned() })?;
        self.sources.remove(position);
        Ok(())
    }

    fn has_source(&self, id: &str) -> bool {
        self.sources.iter().any(|(source_id, _)| source_id == id)
    }

    fn has_layer(&self, id: &str) -> bool {
        self.layers.iter().any(|layer| layer.id == id)
    }

    fn add_marker(&mut self, marker: Marker) -> MarkerId {
        let id = MarkerId::new(self.next_marker);
        self.next_marker += 1;
        self.markers.push((id, marker));
        id
    }

    fn remove_marker(&mut self, id: MarkerId) -> bool {
        let before = self.markers.len();
        self.markers.retain(|(marker_id, _)| *marker_id != id);
        self.markers.len() != before
    }

    fn fit_bounds(&mut self, bounds: Rect<f64>, options: FitBoundsOptions) {
        self.viewport = Some(Viewport {
            bounds,
            padding: options.padding,
        });
    }
}

/// Engine producing [`SceneMap`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct SceneEngine;

impl MapEngine for SceneEngine {
    type Map = SceneMap;

    fn create_map(&self, container: &Container, options: MapOptions) -> SceneMap {
        SceneMap::new(container.clone(), options)
    }
}

/// [`Document`] holding a fixed set of element ids.
///
/// Only `#id` selectors are understood.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StaticDocument {
    ids: Vec<String>,
}

impl StaticDocument {
    /// A document with the given element ids.
    pub fn with_elements<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }
}

impl Document for StaticDocument {
    fn query_selector(&self, selector: &str) -> Option<Container> {
        let wanted = selector.trim().strip_prefix('#')?;
        self.ids
            .iter()
            .find(|id| id.as_str() == wanted)
            .map(|id| Container::new(id.clone()))
    }
}

/// Serialisable map state produced by [`SceneMap::snapshot`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    /// Container element id.
    pub container: String,
    /// Style reference.
    pub style: String,
    /// Tile service token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Initial centre as `[lon, lat]`.
    pub center: [f64; 2],
    /// Initial zoom.
    pub zoom: f64,
    /// Attached controls.
    pub controls: Vec<MapControl>,
    /// Sources in insertion order.
    pub sources: Vec<SceneSource>,
    /// Layers in drawing order.
    pub layers: Vec<SceneLayer>,
    /// Markers in placement order.
    pub markers: Vec<SceneMarker>,
    /// Fitted viewport, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewport: Option<SceneViewport>,
}

/// Source entry of a [`Scene`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneSource {
    /// Source id.
    pub id: String,
    /// Source type, always `geojson`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// GeoJSON payload.
    pub data: GeoJson,
}

/// Layer entry of a [`Scene`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneLayer {
    /// Layer id.
    pub id: String,
    /// Layer type, always `line`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Source id.
    pub source: String,
    /// Paint properties.
    pub paint: serde_json::Value,
}

/// Marker entry of a [`Scene`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneMarker {
    /// Marker handle.
    pub id: MarkerId,
    /// Position as `[lon, lat]`.
    pub lng_lat: [f64; 2],
    /// CSS class.
    pub class_name: String,
    /// Background colour.
    pub background_color: String,
    /// Popup content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popup: Option<Popup>,
}

/// Viewport entry of a [`Scene`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneViewport {
    /// `[[min_lon, min_lat], [max_lon, max_lat]]`.
    pub bounds: [[f64; 2]; 2],
    /// Padding in pixels.
    pub padding: u32,
}
