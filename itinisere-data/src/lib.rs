//! Data access for the Itinisère traffic map.
//!
//! Responsibilities:
//! - Talk to the traffic API over HTTP.
//! - Decode its JSON envelopes into the domain types of `itinisere-core`.
//!
//! Boundaries:
//! - Do not encode rendering rules (live in `itinisere-core`).
//! - Never log the API user key.
//!
//! Invariants:
//! - No global mutable state; configuration is passed in explicitly.

#![forbid(unsafe_code)]

pub mod feed;

pub use feed::{
    DEFAULT_USER_AGENT, FeedBuildError, HttpTrafficFeed, HttpTrafficFeedConfig,
    parse_closure_list, parse_traffic_status,
};
