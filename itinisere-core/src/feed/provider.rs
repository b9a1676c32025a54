//! Traffic feed trait.

use crate::passes::ClosureReport;
use crate::traffic::TrafficSegment;

use super::error::FeedError;

/// Source of traffic status and mountain pass closures.
///
/// # Examples
///
/// ```rust
/// use itinisere_core::{ClosureReport, FeedError, TrafficFeed, TrafficSegment};
///
/// struct QuietFeed;
///
/// impl TrafficFeed for QuietFeed {
///     fn traffic_status(&self) -> Result<Option<Vec<TrafficSegment>>, FeedError> {
///         Ok(Some(Vec::new()))
///     }
///
///     fn closure_list(&self) -> Result<Option<ClosureReport>, FeedError> {
///         Ok(None)
///     }
/// }
///
/// assert_eq!(QuietFeed.traffic_status()?, Some(Vec::new()));
/// # Ok::<(), FeedError>(())
/// ```
pub trait TrafficFeed {
    /// Current traffic segments.
    ///
    /// Returns `Ok(None)` when the response has no `Data` array.
    fn traffic_status(&self) -> Result<Option<Vec<TrafficSegment>>, FeedError>;

    /// Current mountain pass closures.
    ///
    /// Returns `Ok(None)` when the response lacks a usable update time or
    /// closure array.
    fn closure_list(&self) -> Result<Option<ClosureReport>, FeedError>;
}

impl<T: TrafficFeed + ?Sized> TrafficFeed for &T {
    fn traffic_status(&self) -> Result<Option<Vec<TrafficSegment>>, FeedError> {
        (**self).traffic_status()
    }

    fn closure_list(&self) -> Result<Option<ClosureReport>, FeedError> {
        (**self).closure_list()
    }
}
