//! Verb methods and the single request-execution path behind them.
//!
//! # Design
//! Every verb funnels into `dispatch`, which runs the same fixed sequence:
//! merge headers, encode the body, validate and build the request, pick a
//! transport, execute, drain the body. Each step returns early on failure
//! and nothing is retried. A non-2xx status is a successful call.
//!
//! `Client` is a cheap handle around shared state; clones made before or
//! after the first call all use the same transport.

use std::io::Read;
use std::sync::Arc;

use serde::Serialize;
use ureq::http::{HeaderMap, Method};

use crate::config::{ClientBuilder, ClientConfig};
use crate::content::encode_body;
use crate::error::Result;
use crate::headers::merge_headers;
use crate::http::{HttpRequest, CONTENT_TYPE};
use crate::response::Response;
use crate::transport::{Provisioner, TransportResponse};

#[derive(Debug, Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    config: ClientConfig,
    provisioner: Provisioner,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub(crate) fn new(config: ClientConfig) -> Self {
        let provisioner = Provisioner::new(
            config.transport_settings(),
            config.transport.clone(),
            config.mocks.as_ref().map(|m| m.transport()),
        );
        Self {
            inner: Arc::new(ClientInner { config, provisioner }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn get(&self, url: &str, headers: &HeaderMap) -> Result<Response> {
        self.dispatch::<()>(Method::GET.as_str(), url, headers, None)
    }

    pub fn head(&self, url: &str, headers: &HeaderMap) -> Result<Response> {
        self.dispatch::<()>(Method::HEAD.as_str(), url, headers, None)
    }

    pub fn options(&self, url: &str, headers: &HeaderMap) -> Result<Response> {
        self.dispatch::<()>(Method::OPTIONS.as_str(), url, headers, None)
    }

    pub fn delete(&self, url: &str, headers: &HeaderMap) -> Result<Response> {
        self.dispatch::<()>(Method::DELETE.as_str(), url, headers, None)
    }

    pub fn post<T: Serialize + ?Sized>(&self, url: &str, headers: &HeaderMap, body: &T) -> Result<Response> {
        self.dispatch(Method::POST.as_str(), url, headers, Some(body))
    }

    pub fn put<T: Serialize + ?Sized>(&self, url: &str, headers: &HeaderMap, body: &T) -> Result<Response> {
        self.dispatch(Method::PUT.as_str(), url, headers, Some(body))
    }

    pub fn patch<T: Serialize + ?Sized>(&self, url: &str, headers: &HeaderMap, body: &T) -> Result<Response> {
        self.dispatch(Method::PATCH.as_str(), url, headers, Some(body))
    }

    /// Perform one call with an arbitrary method token. A token that is not
    /// a valid HTTP method fails with [`ClientError::InvalidRequest`](crate::ClientError::InvalidRequest).
    pub fn execute<T: Serialize + ?Sized>(
        &self,
        method: &str,
        url: &str,
        headers: &HeaderMap,
        body: Option<&T>,
    ) -> Result<Response> {
        self.dispatch(method, url, headers, body)
    }

    fn dispatch<T: Serialize + ?Sized>(
        &self,
        method: &str,
        url: &str,
        headers: &HeaderMap,
        body: Option<&T>,
    ) -> Result<Response> {
        let config = &self.inner.config;
        let headers = merge_headers(config.headers(), headers, config.user_agent());

        let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
        let payload = encode_body(content_type, body)?;

        let request = HttpRequest::new(method, url, headers, payload)?;
        tracing::trace!(method = %request.method, url = %request.url, bytes = request.body.len(), "dispatching request");

        let transport = self.inner.provisioner.transport();
        let response = transport.execute(&request)?;
        normalize(response)
    }
}

fn normalize(response: TransportResponse) -> Result<Response> {
    let (parts, mut stream) = response.into_parts();
    let mut body = Vec::new();
    stream.read_to_end(&mut body)?;
    drop(stream);

    tracing::trace!(status = parts.status.as_u16(), bytes = body.len(), "response received");
    Ok(Response::new(parts.status, parts.headers, body))
}
