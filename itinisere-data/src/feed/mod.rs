//! HTTP implementation of [`itinisere_core::TrafficFeed`].
//!
//! [`HttpTrafficFeed`] calls the traffic API's `GetTrafficStatus` and
//! `GetClosureList` endpoints. The synchronous [`TrafficFeed`] trait is
//! implemented by blocking on the async requests, and async callers can use
//! the `fetch_*` methods directly, optionally racing a cancellation token.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use itinisere_core::TrafficFeed;
//! use itinisere_data::feed::{HttpTrafficFeed, HttpTrafficFeedConfig};
//!
//! let config = HttpTrafficFeedConfig::new("https://traffic.example.com", "secret")
//!     .with_timeout(Duration::from_secs(10));
//! let feed = HttpTrafficFeed::with_config(config)?;
//!
//! if let Some(segments) = feed.traffic_status()? {
//!     println!("{} segments", segments.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! [`TrafficFeed`]: itinisere_core::TrafficFeed

mod payload;
mod provider;

#[doc(hidden)]
pub mod test_support;

pub use payload::{parse_closure_list, parse_traffic_status};
pub use provider::{
    CLOSURE_LIST_PATH, DEFAULT_USER_AGENT, FeedBuildError, HttpTrafficFeed, HttpTrafficFeedConfig,
    TRAFFIC_STATUS_PATH,
};
