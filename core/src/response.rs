//! Normalized response returned by every verb call.
//!
//! # Design
//! Only the raw body bytes are stored. Text and structured views are
//! computed on demand, so a body that fails to decode does not turn a
//! completed call into a failed one; decoding reports its own
//! [`ClientError::Decode`].

use std::borrow::Cow;
use std::fmt;

use serde::de::DeserializeOwned;
use ureq::http::{HeaderMap, StatusCode};

use crate::error::{ClientError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: String,
    status_code: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Response {
    pub fn new(status_code: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Self {
        Self {
            status: status_line(status_code),
            status_code,
            headers,
            body,
        }
    }

    /// Status line without the protocol version, e.g. `"404 Not Found"`.
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn status_code(&self) -> u16 {
        self.status_code.as_u16()
    }

    pub fn is_success(&self) -> bool {
        self.status_code.is_success()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// Body as text. Invalid UTF-8 is replaced, never an error.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| ClientError::Decode {
            format: "json",
            message: e.to_string(),
        })
    }

    pub fn xml<T: DeserializeOwned>(&self) -> Result<T> {
        quick_xml::de::from_reader(self.body.as_slice()).map_err(|e| ClientError::Decode {
            format: "xml",
            message: e.to_string(),
        })
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

fn status_line(code: StatusCode) -> String {
    match code.canonical_reason() {
        Some(reason) => format!("{} {reason}", code.as_u16()),
        None => code.as_u16().to_string(),
    }
}
