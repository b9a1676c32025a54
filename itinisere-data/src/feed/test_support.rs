//! Test utilities for traffic feeds.
//!
//! [`StubTrafficFeed`] answers from canned JSON bodies, decoded exactly as
//! [`super::HttpTrafficFeed`] decodes live responses, without making any
//! HTTP request.

use itinisere_core::{ClosureReport, FeedError, TrafficFeed, TrafficSegment};
use serde_json::{Value, json};

use super::payload::{parse_closure_list, parse_traffic_status};

/// Stub `TrafficFeed` for testing.
///
/// # Example
///
/// ```
/// use itinisere_core::TrafficFeed;
/// use itinisere_data::feed::test_support::StubTrafficFeed;
/// use serde_json::json;
///
/// let feed = StubTrafficFeed::default().with_traffic_body(json!({"Data": []}));
/// assert_eq!(feed.traffic_status().expect("stub succeeds"), Some(Vec::new()));
/// ```
#[derive(Debug, Clone)]
pub struct StubTrafficFeed {
    response: StubResponse,
}

#[derive(Debug, Clone)]
enum StubResponse {
    Bodies { traffic: Value, closures: Value },
    Error(FeedError),
}

impl Default for StubTrafficFeed {
    /// Both endpoints answer `{}`.
    fn default() -> Self {
        Self {
            response: StubResponse::Bodies {
                traffic: json!({}),
                closures: json!({}),
            },
        }
    }
}

impl StubTrafficFeed {
    /// Answer traffic requests with `body`.
    #[must_use]
    pub fn with_traffic_body(self, body: Value) -> Self {
        let closures = self.closure_body();
        Self {
            response: StubResponse::Bodies {
                traffic: body,
                closures,
            },
        }
    }

    /// Answer closure requests with `body`.
    #[must_use]
    pub fn with_closure_body(self, body: Value) -> Self {
        let traffic = self.traffic_body();
        Self {
            response: StubResponse::Bodies {
                traffic,
                closures: body,
            },
        }
    }

    /// Fail every request with `error`.
    #[must_use]
    pub fn with_error(error: FeedError) -> Self {
        Self {
            response: StubResponse::Error(error),
        }
    }

    fn traffic_body(&self) -> Value {
        match &self.response {
            StubResponse::Bodies { traffic, .. } => traffic.clone(),
            StubResponse::Error(_) => json!({}),
        }
    }

    fn closure_body(&self) -> Value {
        match &self.response {
            StubResponse::Bodies { closures, .. } => closures.clone(),
            StubResponse::Error(_) => json!({}),
        }
    }
}

impl TrafficFeed for StubTrafficFeed {
    fn traffic_status(&self) -> Result<Option<Vec<TrafficSegment>>, FeedError> {
        match &self.response {
            StubResponse::Bodies { traffic, .. } => Ok(parse_traffic_status(traffic)),
            StubResponse::Error(error) => Err(error.clone()),
        }
    }

    fn closure_list(&self) -> Result<Option<ClosureReport>, FeedError> {
        match &self.response {
            StubResponse::Bodies { closures, .. } => Ok(parse_closure_list(closures)),
            StubResponse::Error(error) => Err(error.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn default_bodies_carry_no_data() {
        let feed = StubTrafficFeed::default();
        assert_eq!(feed.traffic_status().expect("ok"), None);
        assert_eq!(feed.closure_list().expect("ok"), None);
    }

    #[rstest]
    fn bodies_are_independent() {
        let feed = StubTrafficFeed::default()
            .with_traffic_body(json!({"Data": []}))
            .with_closure_body(json!({"Data": {"Date": "/Date(1700000000000)/", "Closures": []}}));
        assert_eq!(feed.traffic_status().expect("ok"), Some(Vec::new()));
        assert!(feed.closure_list().expect("ok").is_some());
    }

    #[rstest]
    fn with_error_returns_configured_error() {
        let feed = StubTrafficFeed::with_error(FeedError::Network {
            url: "http://example.com".to_string(),
            message: "connection refused".to_string(),
        });
        let err = feed.closure_list().expect_err("should fail");
        assert!(matches!(err, FeedError::Network { .. }));
    }
}
