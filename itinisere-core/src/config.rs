//! Map and API configuration shared by the bootstrapper and the feeds.
//!
//! A [`MapConfig`] is built once by the caller and passed explicitly to
//! whatever needs it; nothing in the crate reads global state.

use geo::Coord;

use crate::map::MapOptions;

/// Initial map centre, roughly the middle of Isère (`[lon, lat]`).
pub const DEFAULT_CENTER: Coord<f64> = Coord {
    x: 5.547_913,
    y: 45.349_475,
};

/// Initial zoom level.
pub const DEFAULT_ZOOM: f64 = 9.0;

/// Configuration for one map and its traffic API.
///
/// # Examples
///
/// ```
/// use itinisere_core::MapConfig;
///
/// let config = MapConfig::default()
///     .with_style("mapbox://styles/mapbox/streets-v11")
///     .with_api_host("https://traffic.example.com")
///     .with_user_key("secret");
/// assert_eq!(config.zoom, 9.0);
/// assert!(config.map_options().access_token.is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    /// Map style reference (URL or style id).
    pub style: String,
    /// Tile service access token; empty or `None` when the service needs none.
    pub access_token: Option<String>,
    /// Initial centre as `x = longitude`, `y = latitude`.
    pub center: Coord<f64>,
    /// Initial zoom level.
    pub zoom: f64,
    /// Traffic API user key, sent as the `user_key` query parameter.
    pub user_key: String,
    /// Traffic API base URL, e.g. `https://traffic.example.com`.
    pub api_host: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            style: String::new(),
            access_token: None,
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            user_key: String::new(),
            api_host: String::new(),
        }
    }
}

impl MapConfig {
    /// Set the map style reference.
    #[must_use]
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    /// Set the tile service access token.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Set the initial centre.
    #[must_use]
    pub fn with_center(mut self, center: Coord<f64>) -> Self {
        self.center = center;
        self
    }

    /// Set the initial zoom level.
    #[must_use]
    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }

    /// Set the traffic API user key.
    #[must_use]
    pub fn with_user_key(mut self, user_key: impl Into<String>) -> Self {
        self.user_key = user_key.into();
        self
    }

    /// Set the traffic API base URL.
    #[must_use]
    pub fn with_api_host(mut self, api_host: impl Into<String>) -> Self {
        self.api_host = api_host.into();
        self
    }

    /// Options used to construct the map. Blank tokens are dropped.
    #[must_use]
    pub fn map_options(&self) -> MapOptions {
        MapOptions {
            style: self.style.clone(),
            access_token: self
                .access_token
                .as_deref()
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(str::to_owned),
            center: self.center,
            zoom: self.zoom,
        }
    }
}
