//! The `Transport` capability and the per-client provisioner that picks
//! which implementation serves a call.
//!
//! # Design
//! Two implementations ship with the crate: `ureq::Agent` for the network
//! and [`MockTransport`] for tests. [`Provisioner::transport`] is the only
//! place that chooses between them. The mock check runs on every call so
//! a registry can be started and stopped between calls; the real transport
//! is built at most once per client through `OnceLock`, which serializes
//! concurrent first callers and hands every one of them the same handle.

use std::fmt;
use std::io::Read;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use ureq::http::{self, Method};
use ureq::typestate::{WithBody, WithoutBody};
use ureq::{Agent, RequestBuilder};

use crate::error::Result;
use crate::http::HttpRequest;
use crate::mock::MockTransport;

/// Response body as handed back by a transport. The executor drains it
/// and drops it.
pub type BodyStream = Box<dyn Read>;

/// Status and headers as received, plus the unread body.
pub type TransportResponse = http::Response<BodyStream>;

/// Anything that can turn an [`HttpRequest`] into a response.
///
/// Non-2xx statuses are responses, not errors.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<TransportResponse>;
}

/// Resolved settings for a transport built by this crate. `None` means
/// unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportSettings {
    /// Deadline for the whole call.
    pub overall_timeout: Option<Duration>,
    /// Deadline for establishing a new connection.
    pub connect_timeout: Option<Duration>,
    /// Deadline for the response headers once the request is sent.
    pub response_timeout: Option<Duration>,
    pub max_idle_connections_per_host: usize,
}

/// Build the `ureq` agent a client uses when no transport is supplied.
pub fn build_agent(settings: &TransportSettings) -> Agent {
    Agent::config_builder()
        .http_status_as_error(false)
        .allow_non_standard_methods(true)
        .timeout_global(settings.overall_timeout)
        .timeout_connect(settings.connect_timeout)
        .timeout_recv_response(settings.response_timeout)
        .max_idle_connections_per_host(settings.max_idle_connections_per_host)
        .build()
        .new_agent()
}

impl Transport for Agent {
    fn execute(&self, request: &HttpRequest) -> Result<TransportResponse> {
        let url = request.url.as_str();
        let body = request.body.as_slice();

        let response = match request.method {
            Method::GET => call(with_headers(self.get(url), request), body),
            Method::HEAD => call(with_headers(self.head(url), request), body),
            Method::DELETE => call(with_headers(self.delete(url), request), body),
            Method::OPTIONS => call(with_headers(self.options(url), request), body),
            Method::TRACE => call(with_headers(self.trace(url), request), body),
            Method::POST => send(with_headers(self.post(url), request), body),
            Method::PUT => send(with_headers(self.put(url), request), body),
            Method::PATCH => send(with_headers(self.patch(url), request), body),
            _ => {
                let mut builder = http::Request::builder().method(request.method.clone()).uri(url);
                for (name, value) in &request.headers {
                    builder = builder.header(name, value);
                }
                let outgoing = builder.body(body.to_vec())?;
                self.run(outgoing)
            }
        }?;

        Ok(response.map(|body| Box::new(body.into_reader()) as BodyStream))
    }
}

fn with_headers<B>(mut builder: RequestBuilder<B>, request: &HttpRequest) -> RequestBuilder<B> {
    for (name, value) in &request.headers {
        builder = builder.header(name, value);
    }
    builder
}

fn call(builder: RequestBuilder<WithoutBody>, body: &[u8]) -> std::result::Result<http::Response<ureq::Body>, ureq::Error> {
    if body.is_empty() {
        builder.call()
    } else {
        builder.force_send_body().send(body)
    }
}

fn send(builder: RequestBuilder<WithBody>, body: &[u8]) -> std::result::Result<http::Response<ureq::Body>, ureq::Error> {
    if body.is_empty() {
        builder.send_empty()
    } else {
        builder.send(body)
    }
}

/// Selects the transport for each call of one client.
pub(crate) struct Provisioner {
    settings: TransportSettings,
    custom: Option<Arc<dyn Transport>>,
    mocks: Option<MockTransport>,
    handle: OnceLock<Arc<dyn Transport>>,
}

impl Provisioner {
    pub(crate) fn new(
        settings: TransportSettings,
        custom: Option<Arc<dyn Transport>>,
        mocks: Option<MockTransport>,
    ) -> Self {
        Self {
            settings,
            custom,
            mocks,
            handle: OnceLock::new(),
        }
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        if let Some(mocks) = self.mocks.as_ref().filter(|m| m.is_enabled()) {
            return mocks;
        }
        self.get_or_build(|| match &self.custom {
            Some(custom) => Arc::clone(custom),
            None => {
                tracing::debug!(settings = ?self.settings, "building HTTP transport");
                Arc::new(build_agent(&self.settings))
            }
        })
    }

    fn get_or_build(&self, build: impl FnOnce() -> Arc<dyn Transport>) -> &dyn Transport {
        self.handle.get_or_init(build).as_ref()
    }

    pub(crate) fn is_initialized(&self) -> bool {
        self.handle.get().is_some()
    }
}

impl fmt::Debug for Provisioner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provisioner")
            .field("settings", &self.settings)
            .field("custom", &self.custom.is_some())
            .field("mocks", &self.mocks)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
