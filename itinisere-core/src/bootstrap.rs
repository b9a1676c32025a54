//! Map construction and the department outline.

use log::{debug, error};

use crate::boundary::Boundary;
use crate::config::MapConfig;
use crate::map::{
    Document, FitBoundsOptions, GeoJsonSource, LineColor, LineLayer, MapControl, MapEngine,
    MapError, MapSurface,
};

/// Source id of the department outline.
pub const BOUNDARY_SOURCE_ID: &str = "dept";
/// Layer id of the department outline.
pub const BOUNDARY_LAYER_ID: &str = "dept_boundaries";
/// Stroke colour of the outline.
pub const BOUNDARY_COLOR: &str = "#ef8a64";
/// Stroke width of the outline.
pub const BOUNDARY_LINE_WIDTH: f64 = 3.0;
/// Padding used when fitting the viewport to the outline.
pub const BOUNDARY_PADDING: u32 = 10;

/// Builds maps and draws the department outline once their style loads.
///
/// # Examples
///
/// ```
/// use itinisere_core::{MapBootstrapper, MapConfig, MapSurface};
/// use itinisere_core::scene::{SceneEngine, StaticDocument};
///
/// let document = StaticDocument::with_elements(["map"]);
/// let mut map = MapBootstrapper::new(MapConfig::default())
///     .init_map(&SceneEngine, &document, "#map", |_map| {})
///     .expect("container exists");
/// map.load_style();
/// assert!(map.has_layer("dept_boundaries"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MapBootstrapper {
    config: MapConfig,
    boundary: Boundary,
}

impl MapBootstrapper {
    /// Bootstrapper drawing the built-in Isère outline.
    #[must_use]
    pub fn new(config: MapConfig) -> Self {
        Self {
            config,
            boundary: Boundary::isere(),
        }
    }

    /// Replace the department outline.
    #[must_use]
    pub fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    /// Map configuration.
    #[must_use]
    pub const fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Department outline.
    #[must_use]
    pub const fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    /// Create a map inside the element matching `selector`.
    ///
    /// Returns `None`, creating nothing, when no element matches. Otherwise
    /// the map gets a navigation control and, once its style has loaded,
    /// the outline is drawn, the viewport fitted to it and `on_ready` called
    /// with the map. If the outline cannot be added the failure is logged
    /// and `on_ready` is not called.
    pub fn init_map<E, D, F>(
        &self,
        engine: &E,
        document: &D,
        selector: &str,
        on_ready: F,
    ) -> Option<E::Map>
    where
        E: MapEngine,
        E::Map: 'static,
        D: Document + ?Sized,
        F: FnOnce(&mut E::Map) + 'static,
    {
        let Some(container) = document.query_selector(selector) else {
            debug!("no element matches {selector}; map not created");
            return None;
        };
        let mut map = engine.create_map(&container, self.config.map_options());
        map.add_control(MapControl::Navigation);

        let boundary = self.boundary.clone();
        map.on_style_load(Box::new(move |map: &mut E::Map| {
            match apply_boundary(map, &boundary) {
                Ok(()) => on_ready(map),
                Err(err) => error!("failed to draw {} outline: {err}", boundary.name()),
            }
        }));
        Some(map)
    }
}

/// Add the outline source and layer, then fit the viewport to it.
///
/// # Errors
///
/// Returns [`MapError`] when the outline ids are already taken.
pub fn apply_boundary<M: MapSurface>(map: &mut M, boundary: &Boundary) -> Result<(), MapError> {
    map.add_source(
        BOUNDARY_SOURCE_ID,
        GeoJsonSource::new(boundary.to_geojson()),
    )?;
    map.add_layer(LineLayer::new(
        BOUNDARY_LAYER_ID,
        BOUNDARY_SOURCE_ID,
        LineColor::fixed(BOUNDARY_COLOR),
        BOUNDARY_LINE_WIDTH,
    ))?;
    if let Some(bounds) = boundary.bounds() {
        map.fit_bounds(
            bounds,
            FitBoundsOptions {
                padding: BOUNDARY_PADDING,
            },
        );
    }
    Ok(())
}
