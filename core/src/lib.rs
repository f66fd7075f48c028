//! Configurable blocking HTTP client with an injectable mock registry.
//!
//! # Overview
//! [`ClientBuilder`] assembles default headers, timeouts, pool size and an
//! optional transport into a [`Client`]. Each verb call merges headers,
//! encodes the body by content type, sends it through a [`Transport`] and
//! returns a normalized [`Response`]. Non-2xx statuses are data.
//!
//! Tests attach a [`MockRegistry`] to the client; while the registry is
//! started, calls are answered from its fixtures and never hit the network.
//!
//! ```
//! use resty_core::{Client, Method, Mock, MockRegistry, StatusCode};
//! use resty_core::http::HeaderMap;
//!
//! let mocks = MockRegistry::new();
//! let client = Client::builder().mock_registry(mocks.clone()).build();
//!
//! mocks.start();
//! mocks.add(
//!     Mock::new(Method::GET, "https://api.example.com")
//!         .with_status(StatusCode::OK)
//!         .with_response_body(r#"{"a":"b"}"#),
//! );
//!
//! let response = client.get("https://api.example.com", &HeaderMap::new()).unwrap();
//! assert_eq!(response.status_code(), 200);
//! ```
//!
//! # Design
//! - The real transport is a `ureq::Agent`, built lazily and once per
//!   client, or supplied by the caller.
//! - The mock registry is an explicit object, not process state, so tests
//!   stay isolated from each other.
//! - Every failure is a [`ClientError`] value returned to the caller.
//!   Nothing retries, and failures are not logged here.

pub mod client;
pub mod config;
pub mod content;
pub mod error;
pub mod headers;
pub mod http;
pub mod mock;
pub mod response;
pub mod transport;

pub use client::Client;
pub use config::{ClientBuilder, ClientConfig, ClientOptions};
pub use error::{ClientError, Result};
pub use mock::{Mock, MockRegistry, MockTransport};
pub use response::Response;
pub use transport::{Transport, TransportResponse, TransportSettings};
pub use ureq::http::{Method, StatusCode};
