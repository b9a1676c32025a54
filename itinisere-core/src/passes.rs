//! Mountain pass markers.

use std::fmt::Display;

use chrono::{DateTime, TimeZone, Utc};
use geo::Coord;
use log::info;

use crate::map::{MapSurface, Marker, MarkerId, Popup};

/// CSS class of every pass marker.
pub const MARKER_CLASS: &str = "mountain_pass_marker";
/// CSS class of the popup wrapper.
pub const POPUP_CLASS: &str = "mountain_pass_popup";
/// Popup offset in pixels.
pub const POPUP_OFFSET: u32 = 10;
/// Marker colour of a closed pass.
pub const CLOSED_COLOR: &str = "#FF000D";
/// Marker colour of an open pass.
pub const OPEN_COLOR: &str = "#08d500";
/// API `State` code meaning the pass is closed.
pub const CLOSED_STATE: i64 = 2;
/// Format of the last-update line.
pub const UPDATE_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Open or closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassState {
    /// The pass can be driven.
    Open,
    /// The pass is closed.
    Closed,
}

impl PassState {
    /// Interpret the API `State` code. Only `2` means closed; anything else,
    /// including a missing code, is open.
    #[must_use]
    pub const fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(CLOSED_STATE) => Self::Closed,
            _ => Self::Open,
        }
    }

    /// Marker background colour.
    #[must_use]
    pub const fn marker_color(self) -> &'static str {
        match self {
            Self::Open => OPEN_COLOR,
            Self::Closed => CLOSED_COLOR,
        }
    }

    /// Label shown in the popup.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "Ouvert",
            Self::Closed => "Fermé",
        }
    }

    /// CSS class of the label.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

/// A pass reported by the closure list.
#[derive(Debug, Clone, PartialEq)]
pub struct MountainPass {
    /// Display name.
    pub name: String,
    /// Position (`x = longitude`, `y = latitude`).
    pub position: Coord<f64>,
    /// Current state.
    pub state: PassState,
}

/// Closure list with its update time.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosureReport {
    /// When the list was last updated.
    pub updated_at: DateTime<Utc>,
    /// Passes in response order.
    pub passes: Vec<MountainPass>,
}

/// Extract the update time from a date string such as `/Date(1700000000000)/`.
///
/// The first run of at least twelve digits is read as epoch milliseconds.
///
/// ```
/// use itinisere_core::passes::extract_update_time;
///
/// let time = extract_update_time("/Date(1700000000000+0100)/").expect("has digits");
/// assert_eq!(time.timestamp_millis(), 1_700_000_000_000);
/// assert!(extract_update_time("yesterday").is_none());
/// ```
#[must_use]
pub fn extract_update_time(text: &str) -> Option<DateTime<Utc>> {
    text.split(|c: char| !c.is_ascii_digit())
        .find(|run| run.len() >= 12)
        .and_then(|run| run.parse::<i64>().ok())
        .and_then(DateTime::from_timestamp_millis)
}

/// Escape text for inclusion in HTML content.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Popup HTML for `pass`, with the update time rendered in `tz`.
pub fn popup_html<Tz>(pass: &MountainPass, updated_at: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let updated = updated_at.with_timezone(tz).format(UPDATE_FORMAT);
    format!(
        "<div class=\"{POPUP_CLASS}\"><h3>{name}</h3><p class=\"{class}\">{label}</p><p><em>Dernière mise à jour : {updated}</em></p></div>",
        name = escape_html(&pass.name),
        class = pass.state.css_class(),
        label = pass.state.label(),
    )
}

/// Marker for `pass`.
pub fn pass_marker<Tz>(pass: &MountainPass, updated_at: DateTime<Utc>, tz: &Tz) -> Marker
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    Marker {
        position: pass.position,
        class_name: MARKER_CLASS.to_owned(),
        background_color: pass.state.marker_color().to_owned(),
        popup: Some(Popup {
            offset: POPUP_OFFSET,
            html: popup_html(pass, updated_at, tz),
        }),
    }
}

/// Place one marker per pass and return their handles.
pub fn render_mountain_passes<M, Tz>(map: &mut M, report: &ClosureReport, tz: &Tz) -> Vec<MarkerId>
where
    M: MapSurface,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let ids: Vec<MarkerId> = report
        .passes
        .iter()
        .map(|pass| map.add_marker(pass_marker(pass, report.updated_at, tz)))
        .collect();
    info!("placed {} mountain pass markers", ids.len());
    ids
}

/// Pass markers that replace themselves on refresh.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MountainPassMarkers {
    ids: Vec<MarkerId>,
}

impl MountainPassMarkers {
    /// Tracker with no markers.
    #[must_use]
    pub const fn new() -> Self {
        Self { ids: Vec::new() }
    }

    /// Place markers for `report` and track them alongside any already placed.
    pub fn place<M, Tz>(&mut self, map: &mut M, report: &ClosureReport, tz: &Tz)
    where
        M: MapSurface,
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        self.ids.extend(render_mountain_passes(map, report, tz));
    }

    /// Track markers placed elsewhere, e.g. by
    /// [`crate::overlay::display_mountain_passes`].
    pub fn track(&mut self, ids: impl IntoIterator<Item = MarkerId>) {
        self.ids.extend(ids);
    }

    /// Remove every tracked marker.
    pub fn clear<M: MapSurface>(&mut self, map: &mut M) {
        for id in self.ids.drain(..) {
            map.remove_marker(id);
        }
    }

    /// Replace the tracked markers with markers for `report`.
    pub fn refresh<M, Tz>(&mut self, map: &mut M, report: &ClosureReport, tz: &Tz)
    where
        M: MapSurface,
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        self.clear(map);
        self.place(map, report, tz);
    }

    /// Handles of the tracked markers.
    #[must_use]
    pub fn ids(&self) -> &[MarkerId] {
        &self.ids
    }
}
