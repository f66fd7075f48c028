//! In-process mock registry for tests.
//!
//! # Design
//! A `MockRegistry` is created by the test, cloned into every client under
//! test through [`ClientBuilder::mock_registry`], and driven with
//! `start`/`stop`/`flush`/`add`. Clones share one mutex-guarded state, so a
//! fixture added from the test thread is visible to calls made on any
//! other thread. Nothing is global: two tests with two registries do not
//! see each other's fixtures.
//!
//! Fixtures are keyed by method, URL and canonical body. The URL is
//! compared as the exact string the caller passed. While a registry is
//! started, a call without a matching fixture fails with
//! [`ClientError::NoMockMatch`] instead of reaching the network.
//!
//! [`ClientBuilder::mock_registry`]: crate::ClientBuilder::mock_registry

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ureq::http::header::{HeaderMap, HeaderName, HeaderValue};
use ureq::http::{self, Method, StatusCode};

use crate::error::{ClientError, Result};
use crate::http::HttpRequest;
use crate::transport::{BodyStream, Transport, TransportResponse};

/// Strip leading/trailing whitespace and every tab and newline.
pub fn canonical_body(body: &str) -> String {
    body.trim().chars().filter(|c| !matches!(c, '\t' | '\n')).collect()
}

/// A scripted outcome for one call signature.
#[derive(Debug, Clone)]
pub struct Mock {
    pub method: Method,
    pub url: String,
    /// Body the call must carry. Compared after [`canonical_body`].
    pub request_body: String,
    /// When set, the call fails with this message and no response.
    pub error: Option<String>,
    pub response_status: StatusCode,
    pub response_headers: HeaderMap,
    pub response_body: String,
}

impl Mock {
    /// A fixture answering `200 OK` with an empty body.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            request_body: String::new(),
            error: None,
            response_status: StatusCode::OK,
            response_headers: HeaderMap::new(),
            response_body: String::new(),
        }
    }

    pub fn with_request_body(mut self, body: impl Into<String>) -> Self {
        self.request_body = body.into();
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.response_status = status;
        self
    }

    pub fn with_response_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.response_headers.insert(name, value);
        self
    }

    pub fn with_response_body(mut self, body: impl Into<String>) -> Self {
        self.response_body = body.into();
        self
    }

    fn key(&self) -> MockKey {
        MockKey::new(&self.method, &self.url, &self.request_body)
    }

    fn respond(&self) -> Result<TransportResponse> {
        if let Some(message) = &self.error {
            return Err(ClientError::ScriptedMock(message.clone()));
        }
        let mut response = http::Response::new(
            Box::new(Cursor::new(self.response_body.clone().into_bytes())) as BodyStream,
        );
        *response.status_mut() = self.response_status;
        *response.headers_mut() = self.response_headers.clone();
        Ok(response)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MockKey {
    method: Method,
    url: String,
    body: String,
}

impl MockKey {
    fn new(method: &Method, url: &str, body: &str) -> Self {
        Self {
            method: method.clone(),
            url: url.to_string(),
            body: canonical_body(body),
        }
    }
}

#[derive(Debug, Default)]
struct RegistryState {
    enabled: bool,
    mocks: HashMap<MockKey, Mock>,
}

/// Shared handle to one set of fixtures and its enabled flag.
#[derive(Debug, Clone, Default)]
pub struct MockRegistry {
    state: Arc<Mutex<RegistryState>>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route calls of attached clients to the fixtures.
    pub fn start(&self) {
        self.lock().enabled = true;
    }

    /// Let attached clients reach the network again. Fixtures are kept.
    pub fn stop(&self) {
        self.lock().enabled = false;
    }

    /// Drop every fixture. The enabled flag is untouched.
    pub fn flush(&self) {
        self.lock().mocks.clear();
    }

    /// Register `mock`, replacing any fixture with the same signature.
    pub fn add(&self, mock: Mock) {
        tracing::debug!(method = %mock.method, url = %mock.url, "registering mock");
        let key = mock.key();
        self.lock().mocks.insert(key, mock);
    }

    pub fn is_enabled(&self) -> bool {
        self.lock().enabled
    }

    pub fn len(&self) -> usize {
        self.lock().mocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Transport that answers from this registry.
    pub fn transport(&self) -> MockTransport {
        MockTransport {
            registry: self.clone(),
        }
    }

    fn find(&self, request: &HttpRequest) -> Option<Mock> {
        let key = MockKey::new(&request.method, &request.url, &request.body_text());
        self.lock().mocks.get(&key).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        // A panicking test thread must not wedge every other test sharing
        // the registry.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// [`Transport`] backed by a [`MockRegistry`].
#[derive(Debug, Clone)]
pub struct MockTransport {
    registry: MockRegistry,
}

impl MockTransport {
    pub fn is_enabled(&self) -> bool {
        self.registry.is_enabled()
    }
}

impl Transport for MockTransport {
    fn execute(&self, request: &HttpRequest) -> Result<TransportResponse> {
        match self.registry.find(request) {
            Some(mock) => {
                tracing::trace!(method = %request.method, url = %request.url, "mock matched");
                mock.respond()
            }
            None => Err(ClientError::NoMockMatch {
                method: request.method.to_string(),
                url: request.url.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Read;

    fn request(method: &str, url: &str, body: &str) -> HttpRequest {
        HttpRequest::new(method, url, HeaderMap::new(), body.as_bytes().to_vec()).unwrap()
    }

    /// The error a call failed with. Response bodies are not `Debug`, so
    /// `unwrap_err` is unavailable here.
    fn failure_of(result: Result<TransportResponse>) -> ClientError {
        match result {
            Ok(response) => panic!("expected an error, got status {}", response.status()),
            Err(err) => err,
        }
    }

    fn body_of(response: TransportResponse) -> String {
        let mut text = String::new();
        response.into_body().read_to_string(&mut text).unwrap();
        text
    }

    #[test]
    fn canonical_body_strips_tabs_newlines_and_edges() {
        assert_eq!(canonical_body("  {\n\t\"foo\": \"bar\"\n}\n"), "{\"foo\": \"bar\"}");
        assert_eq!(canonical_body(""), "");
        assert_eq!(canonical_body(" \t\n "), "");
    }

    #[test]
    fn start_stop_toggle_only_the_flag() {
        let registry = MockRegistry::new();
        registry.add(Mock::new(Method::GET, "https://api.example.com"));
        assert!(!registry.is_enabled());

        registry.start();
        assert!(registry.is_enabled());
        assert_eq!(registry.len(), 1);

        registry.stop();
        assert!(!registry.is_enabled());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn flush_keeps_the_flag() {
        let registry = MockRegistry::new();
        registry.start();
        registry.add(Mock::new(Method::GET, "https://api.example.com"));
        registry.flush();
        assert!(registry.is_empty());
        assert!(registry.is_enabled());
    }

    #[test]
    fn same_signature_replaces_earlier_fixture() {
        let registry = MockRegistry::new();
        registry.add(Mock::new(Method::POST, "https://api.example.com").with_request_body("{\"a\":1}"));
        registry.add(
            Mock::new(Method::POST, "https://api.example.com")
                .with_request_body("\n{\"a\":1}\n")
                .with_status(StatusCode::CREATED),
        );
        assert_eq!(registry.len(), 1);

        let response = registry
            .transport()
            .execute(&request("POST", "https://api.example.com", "{\"a\":1}"))
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[test]
    fn matching_fixture_synthesizes_response() {
        let registry = MockRegistry::new();
        registry.add(
            Mock::new(Method::GET, "https://api.example.com")
                .with_status(StatusCode::NOT_FOUND)
                .with_response_header(HeaderName::from_static("x-mock"), HeaderValue::from_static("1"))
                .with_response_body("{\"message\":\"missing\"}"),
        );

        let response = registry
            .transport()
            .execute(&request("GET", "https://api.example.com", ""))
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()["x-mock"], "1");
        assert_eq!(body_of(response), "{\"message\":\"missing\"}");
    }

    #[test]
    fn scripted_error_replaces_response() {
        let registry = MockRegistry::new();
        registry.add(
            Mock::new(Method::GET, "https://api.example.com")
                .with_status(StatusCode::OK)
                .with_error("timeout getting into api"),
        );

        let err = failure_of(
            registry
                .transport()
                .execute(&request("GET", "https://api.example.com", "")),
        );
        assert!(matches!(&err, ClientError::ScriptedMock(m) if m == "timeout getting into api"));
    }

    #[test]
    fn any_differing_element_misses() {
        let registry = MockRegistry::new();
        registry.add(Mock::new(Method::POST, "https://api.example.com/v1").with_request_body("{\"foo\":\"bar\"}"));
        let transport = registry.transport();

        for (method, url, body) in [
            ("PUT", "https://api.example.com/v1", "{\"foo\":\"bar\"}"),
            ("POST", "https://api.example.com/v2", "{\"foo\":\"bar\"}"),
            ("POST", "https://api.example.com/v1/", "{\"foo\":\"bar\"}"),
            ("POST", "https://api.example.com/v1", "{\"foo\":\"baz\"}"),
            ("POST", "https://api.example.com/v1", "{\"foo\": \"bar\"}"),
        ] {
            let err = failure_of(transport.execute(&request(method, url, body)));
            match err {
                ClientError::NoMockMatch { method: m, url: u } => {
                    assert_eq!(m, method);
                    assert_eq!(u, url);
                }
                other => panic!("expected NoMockMatch, got {other:?}"),
            }
        }
    }

    #[test]
    fn clones_share_state_across_threads() {
        let registry = MockRegistry::new();
        std::thread::scope(|s| {
            for i in 0..8 {
                let registry = registry.clone();
                s.spawn(move || {
                    registry.start();
                    registry.add(Mock::new(Method::GET, format!("https://api.example.com/{i}")));
                });
            }
        });
        assert!(registry.is_enabled());
        assert_eq!(registry.len(), 8);
    }

    fn noise() -> impl Strategy<Value = String> {
        "[ \t\n]{0,4}"
    }

    proptest! {
        #[test]
        fn canonicalization_is_idempotent(body in "[ -~\t\n\r]{0,40}") {
            let once = canonical_body(&body);
            prop_assert_eq!(canonical_body(&once), once.clone());
        }

        #[test]
        fn tabs_newlines_and_edges_do_not_change_the_key(
            base in "[a-z0-9{}:\", ]{0,24}",
            prefix in noise(),
            suffix in noise(),
            inserts in proptest::collection::vec((any::<prop::sample::Index>(), prop_oneof![Just('\t'), Just('\n')]), 0..6),
        ) {
            let mut chars: Vec<char> = base.chars().collect();
            for (at, c) in inserts {
                let pos = at.index(chars.len() + 1);
                chars.insert(pos, c);
            }
            let noisy = format!("{prefix}{}{suffix}", chars.into_iter().collect::<String>());
            prop_assert_eq!(canonical_body(&noisy), canonical_body(&base));
        }
    }
}
