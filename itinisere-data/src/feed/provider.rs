//! HTTP-based `TrafficFeed` for the traffic API.
//!
//! # Architecture
//!
//! The [`TrafficFeed`] trait is synchronous so the overlays stay usable from
//! plain callbacks. This feed bridges the async HTTP calls to that interface
//! by blocking on a Tokio runtime it owns.

use std::future::Future;
use std::time::Duration;

use itinisere_core::{ClosureReport, FeedError, MapConfig, TrafficFeed, TrafficSegment};
use log::debug;
use reqwest::Client;
use serde_json::Value;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use tokio_util::sync::CancellationToken;
use url::Url;

use super::payload::{parse_closure_list, parse_traffic_status};

/// Path of the traffic status endpoint.
pub const TRAFFIC_STATUS_PATH: &str = "/api/traffic/v2/GetTrafficStatus/json";

/// Path of the mountain pass closure endpoint.
pub const CLOSURE_LIST_PATH: &str = "/api/traffic/v2/GetClosureList/json";

/// Error type for [`HttpTrafficFeed`] construction failures.
#[derive(Debug)]
pub enum FeedBuildError {
    /// Failed to build the HTTP client.
    HttpClient(reqwest::Error),
    /// Failed to build the Tokio runtime.
    Runtime(std::io::Error),
}

impl std::fmt::Display for FeedBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HttpClient(err) => write!(f, "failed to build HTTP client: {err}"),
            Self::Runtime(err) => write!(f, "failed to build Tokio runtime: {err}"),
        }
    }
}

impl std::error::Error for FeedBuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::HttpClient(err) => Some(err),
            Self::Runtime(err) => Some(err),
        }
    }
}

/// Default user agent for traffic API requests.
pub const DEFAULT_USER_AGENT: &str = "itinisere-map/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`HttpTrafficFeed`].
#[derive(Clone)]
pub struct HttpTrafficFeedConfig {
    /// Base URL of the traffic API (e.g. `"https://traffic.example.com"`).
    pub api_host: String,
    /// API key sent as the `user_key` query parameter.
    pub user_key: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Whether proxy settings are read from the environment.
    pub system_proxy: bool,
}

impl std::fmt::Debug for HttpTrafficFeedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTrafficFeedConfig")
            .field("api_host", &self.api_host)
            .field("user_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("system_proxy", &self.system_proxy)
            .finish()
    }
}

impl Default for HttpTrafficFeedConfig {
    fn default() -> Self {
        Self {
            api_host: String::new(),
            user_key: String::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            system_proxy: true,
        }
    }
}

impl HttpTrafficFeedConfig {
    /// Create a new configuration for the given host and key.
    #[must_use]
    pub fn new(api_host: impl Into<String>, user_key: impl Into<String>) -> Self {
        Self {
            api_host: api_host.into(),
            user_key: user_key.into(),
            ..Default::default()
        }
    }

    /// Take the host and key from a map configuration.
    #[must_use]
    pub fn from_map_config(config: &MapConfig) -> Self {
        Self::new(config.api_host.clone(), config.user_key.clone())
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Ignore `HTTP_PROXY` and friends.
    #[must_use]
    pub fn without_system_proxy(mut self) -> Self {
        self.system_proxy = false;
        self
    }
}

/// HTTP-based traffic feed.
///
/// # Runtime behaviour
///
/// When called from outside any Tokio runtime, the feed uses its own stored
/// runtime. When called from within a multi-threaded Tokio runtime it uses
/// that runtime's handle with [`tokio::task::block_in_place`]. A
/// `current_thread` runtime cannot be re-entered, so there the request runs
/// on the feed's own runtime in a scoped worker thread. The caller's
/// runtime stays blocked until the request finishes; async callers should
/// prefer [`HttpTrafficFeed::fetch_traffic_status`] and
/// [`HttpTrafficFeed::fetch_closure_list`].
///
/// Dropping the feed inside an async context is safe: the owned runtime is
/// shut down in the background.
pub struct HttpTrafficFeed {
    client: Client,
    config: HttpTrafficFeedConfig,
    runtime: Option<Runtime>,
}

impl std::fmt::Debug for HttpTrafficFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTrafficFeed")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl HttpTrafficFeed {
    /// Create a feed with default timeout and user agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(
        api_host: impl Into<String>,
        user_key: impl Into<String>,
    ) -> Result<Self, FeedBuildError> {
        Self::with_config(HttpTrafficFeedConfig::new(api_host, user_key))
    }

    /// Create a feed with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: HttpTrafficFeedConfig) -> Result<Self, FeedBuildError> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout);
        if !config.system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build().map_err(FeedBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(FeedBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            runtime: Some(runtime),
        })
    }

    /// Feed configuration.
    #[must_use]
    pub const fn config(&self) -> &HttpTrafficFeedConfig {
        &self.config
    }

    /// Build the request URL for `path`, with the key as a query parameter.
    fn endpoint_url(&self, path: &str) -> Result<Url, FeedError> {
        let text = format!("{}{path}", self.config.api_host.trim_end_matches('/'));
        let mut url = Url::parse(&text).map_err(|err| FeedError::InvalidUrl {
            url: text.clone(),
            message: err.to_string(),
        })?;
        url.query_pairs_mut()
            .append_pair("user_key", &self.config.user_key);
        Ok(url)
    }

    /// Fetch and decode the traffic status.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError`] when the request fails or the body is not JSON.
    pub async fn fetch_traffic_status(&self) -> Result<Option<Vec<TrafficSegment>>, FeedError> {
        let url = self.endpoint_url(TRAFFIC_STATUS_PATH)?;
        let body = self.fetch_json(url).await?;
        Ok(parse_traffic_status(&body))
    }

    /// Fetch and decode the mountain pass closure list.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError`] when the request fails or the body is not JSON.
    pub async fn fetch_closure_list(&self) -> Result<Option<ClosureReport>, FeedError> {
        let url = self.endpoint_url(CLOSURE_LIST_PATH)?;
        let body = self.fetch_json(url).await?;
        Ok(parse_closure_list(&body))
    }

    /// [`Self::fetch_traffic_status`], abandoned when `token` fires first.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Cancelled`] on cancellation, otherwise as
    /// [`Self::fetch_traffic_status`].
    pub async fn fetch_traffic_status_until_cancelled(
        &self,
        token: &CancellationToken,
    ) -> Result<Option<Vec<TrafficSegment>>, FeedError> {
        let url = self.endpoint_url(TRAFFIC_STATUS_PATH)?;
        until_cancelled(token, &url, self.fetch_traffic_status()).await
    }

    /// [`Self::fetch_closure_list`], abandoned when `token` fires first.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Cancelled`] on cancellation, otherwise as
    /// [`Self::fetch_closure_list`].
    pub async fn fetch_closure_list_until_cancelled(
        &self,
        token: &CancellationToken,
    ) -> Result<Option<ClosureReport>, FeedError> {
        let url = self.endpoint_url(CLOSURE_LIST_PATH)?;
        until_cancelled(token, &url, self.fetch_closure_list()).await
    }

    async fn fetch_json(&self, url: Url) -> Result<Value, FeedError> {
        let shown = redact(&url);
        debug!("GET {shown}");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(err, &shown))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(err, &shown))?;

        response
            .json::<Value>()
            .await
            .map_err(|err| FeedError::Parse {
                url: shown.clone(),
                message: err.without_url().to_string(),
            })
    }

    /// Convert a reqwest error to a `FeedError`, dropping the keyed URL
    /// reqwest embeds in its message.
    fn convert_reqwest_error(&self, error: reqwest::Error, url: &str) -> FeedError {
        if error.is_timeout() {
            return FeedError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return FeedError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.without_url().to_string(),
            };
        }

        FeedError::Network {
            url: url.to_owned(),
            message: error.without_url().to_string(),
        }
    }

    /// Drive `future` to completion from synchronous code.
    fn block_on<T, F>(&self, future: F) -> Result<T, FeedError>
    where
        T: Send,
        F: Future<Output = Result<T, FeedError>> + Send,
    {
        let Some(runtime) = self.runtime.as_ref() else {
            return Err(FeedError::Runtime {
                message: "runtime has shut down".to_owned(),
            });
        };
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            // A current_thread runtime cannot block on a nested runtime from
            // its own thread.
            Ok(_) => std::thread::scope(|scope| {
                scope
                    .spawn(|| runtime.block_on(future))
                    .join()
                    .unwrap_or_else(|_| {
                        Err(FeedError::Runtime {
                            message: "request thread panicked".to_owned(),
                        })
                    })
            }),
            Err(_) => runtime.block_on(future),
        }
    }
}

impl Drop for HttpTrafficFeed {
    fn drop(&mut self) {
        // Runtime::drop panics inside an async context.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

/// Race `request` against `token`.
async fn until_cancelled<T>(
    token: &CancellationToken,
    url: &Url,
    request: impl Future<Output = Result<T, FeedError>>,
) -> Result<T, FeedError> {
    tokio::select! {
        biased;
        () = token.cancelled() => {
            debug!("cancelled GET {}", redact(url));
            Err(FeedError::Cancelled { url: redact(url) })
        }
        result = request => result,
    }
}

/// The URL without its query string, safe to log.
fn redact(url: &Url) -> String {
    let mut shown = url.clone();
    shown.set_query(None);
    shown.to_string()
}

impl TrafficFeed for HttpTrafficFeed {
    fn traffic_status(&self) -> Result<Option<Vec<TrafficSegment>>, FeedError> {
        self.block_on(self.fetch_traffic_status())
    }

    fn closure_list(&self) -> Result<Option<ClosureReport>, FeedError> {
        self.block_on(self.fetch_closure_list())
    }
}
