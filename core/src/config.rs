//! Client configuration, its builder, and a serde options record.
//!
//! # Design
//! `ClientConfig` is frozen once `ClientBuilder::build` runs. Numeric
//! settings left at zero mean "use the default"; resolving them into
//! concrete transport settings happens in one place,
//! [`ClientConfig::transport_settings`], so the disable-timeouts override
//! and the defaults are applied identically for every client.
//!
//! `ClientOptions` mirrors the builder as plain data so a client can be
//! described in a JSON or TOML document.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use ureq::http::header::{HeaderMap, HeaderName, HeaderValue};

use crate::client::Client;
use crate::error::{ClientError, Result};
use crate::mock::MockRegistry;
use crate::transport::{Transport, TransportSettings};

pub const DEFAULT_MAX_IDLE_CONNECTIONS: usize = 5;
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Settings shared by every call a `Client` makes.
#[derive(Clone, Default)]
pub struct ClientConfig {
    pub(crate) headers: HeaderMap,
    pub(crate) connection_timeout: Duration,
    pub(crate) response_timeout: Duration,
    pub(crate) max_idle_connections: usize,
    pub(crate) disable_timeouts: bool,
    pub(crate) transport: Option<Arc<dyn Transport>>,
    pub(crate) user_agent: Option<String>,
    pub(crate) mocks: Option<MockRegistry>,
}

impl ClientConfig {
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    pub fn has_custom_transport(&self) -> bool {
        self.transport.is_some()
    }

    pub fn max_idle_connections(&self) -> usize {
        if self.max_idle_connections > 0 {
            return self.max_idle_connections;
        }
        DEFAULT_MAX_IDLE_CONNECTIONS
    }

    /// How long to wait for response headers. Zero means unbounded.
    pub fn response_timeout(&self) -> Duration {
        if self.disable_timeouts {
            return Duration::ZERO;
        }
        if !self.response_timeout.is_zero() {
            return self.response_timeout;
        }
        DEFAULT_RESPONSE_TIMEOUT
    }

    /// How long to wait for a new connection. Zero means unbounded.
    pub fn connection_timeout(&self) -> Duration {
        if self.disable_timeouts {
            return Duration::ZERO;
        }
        if !self.connection_timeout.is_zero() {
            return self.connection_timeout;
        }
        DEFAULT_CONNECTION_TIMEOUT
    }

    /// Settings for a transport this crate constructs. Not consulted when a
    /// caller-supplied transport is configured.
    pub fn transport_settings(&self) -> TransportSettings {
        let connect = self.connection_timeout();
        let response = self.response_timeout();
        TransportSettings {
            overall_timeout: non_zero(connect + response),
            connect_timeout: non_zero(connect),
            response_timeout: non_zero(response),
            max_idle_connections_per_host: self.max_idle_connections(),
        }
    }
}

fn non_zero(d: Duration) -> Option<Duration> {
    (!d.is_zero()).then_some(d)
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("headers", &self.headers)
            .field("connection_timeout", &self.connection_timeout)
            .field("response_timeout", &self.response_timeout)
            .field("max_idle_connections", &self.max_idle_connections)
            .field("disable_timeouts", &self.disable_timeouts)
            .field("custom_transport", &self.transport.is_some())
            .field("user_agent", &self.user_agent)
            .field("mocks", &self.mocks.is_some())
            .finish()
    }
}

/// Chaining builder for [`Client`].
///
/// ```
/// use std::time::Duration;
/// use resty_core::ClientBuilder;
///
/// let client = ClientBuilder::new()
///     .max_idle_connections(20)
///     .connection_timeout(Duration::from_secs(10))
///     .response_timeout(Duration::from_secs(10))
///     .user_agent("inventory-sync/1.0")
///     .build();
/// # let _ = client;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClientBuilder {
    config: ClientConfig,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a deserialized options record. Fails on header names or
    /// values that are not valid HTTP.
    pub fn from_options(options: ClientOptions) -> Result<Self> {
        let mut headers = HeaderMap::with_capacity(options.headers.len());
        for (name, value) in &options.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ClientError::Config(format!("invalid header name {name:?}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| ClientError::Config(format!("invalid value for header {name}")))?;
            headers.insert(name, value);
        }

        let mut builder = Self::new()
            .headers(headers)
            .connection_timeout(Duration::from_millis(options.connection_timeout_ms))
            .response_timeout(Duration::from_millis(options.response_timeout_ms))
            .max_idle_connections(options.max_idle_connections)
            .disable_timeouts(options.disable_timeouts);
        if let Some(agent) = options.user_agent {
            builder = builder.user_agent(agent);
        }
        Ok(builder)
    }

    /// Default headers sent with every call.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.config.headers = headers;
        self
    }

    /// Add one default header, replacing any earlier value for `name`.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.config.headers.insert(name, value);
        self
    }

    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.config.connection_timeout = timeout;
        self
    }

    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.config.response_timeout = timeout;
        self
    }

    pub fn max_idle_connections(mut self, connections: usize) -> Self {
        self.config.max_idle_connections = connections;
        self
    }

    /// Resolve every timeout to zero (unbounded), whatever was configured.
    pub fn disable_timeouts(mut self, disable: bool) -> Self {
        self.config.disable_timeouts = disable;
        self
    }

    /// Use a caller-owned transport. Timeout and pool settings are then not
    /// applied; the transport is used exactly as given.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.config.transport = Some(transport);
        self
    }

    /// Use a caller-built `ureq` agent, with the same caveat as
    /// [`ClientBuilder::transport`]. An agent that treats HTTP status codes
    /// as errors surfaces non-2xx responses as transport errors.
    pub fn agent(self, agent: ureq::Agent) -> Self {
        self.transport(Arc::new(agent))
    }

    /// `User-Agent` sent when neither the defaults nor the call set one.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(agent.into());
        self
    }

    /// Route calls through `registry` whenever it is started.
    pub fn mock_registry(mut self, registry: MockRegistry) -> Self {
        self.config.mocks = Some(registry);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn build(self) -> Client {
        Client::new(self.config)
    }
}

/// Deserializable mirror of [`ClientBuilder`]. Zero values fall back to the
/// defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientOptions {
    pub headers: BTreeMap<String, String>,
    pub connection_timeout_ms: u64,
    pub response_timeout_ms: u64,
    pub max_idle_connections: usize,
    pub disable_timeouts: bool,
    pub user_agent: Option<String>,
}
