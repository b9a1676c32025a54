//! Fetch live traffic data.
//!
//! The `TrafficFeed` trait abstracts the two traffic API calls the overlays
//! need: the traffic status list and the mountain pass closure list. Both
//! return `Ok(None)` when the response is well formed but carries no usable
//! data, which the overlays treat as "nothing to draw".

mod error;
mod provider;

pub use error::FeedError;
pub use provider::TrafficFeed;
