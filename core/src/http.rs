//! Transport-level request shape and the header/media-type names the
//! pipeline consults.
//!
//! # Design
//! `HttpRequest` is plain owned data: the executor assembles it once and
//! hands a reference to whichever `Transport` the provisioner selected. The
//! constructor is the single place where the method token and URL are
//! validated, so a malformed call never reaches a transport.

use ureq::http::{Method, Uri};

use crate::error::{ClientError, Result};

pub use ureq::http::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, USER_AGENT};

pub const APPLICATION_JSON: &str = "application/json";
pub const APPLICATION_XML: &str = "application/xml";
pub const TEXT_XML: &str = "text/xml";

/// One outgoing call, ready for a transport.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// The URL exactly as the caller passed it. Mock fixtures match on
    /// this string, not on a re-serialized form.
    pub url: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpRequest {
    pub fn new(method: &str, url: &str, headers: HeaderMap, body: Vec<u8>) -> Result<Self> {
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|_| ClientError::InvalidRequest(format!("invalid method {method:?}")))?;

        let uri: Uri = url
            .parse()
            .map_err(|e| ClientError::InvalidRequest(format!("invalid url {url:?}: {e}")))?;
        if uri.scheme().is_none() || uri.host().is_none() {
            return Err(ClientError::InvalidRequest(format!(
                "url {url:?} must be absolute"
            )));
        }

        Ok(Self {
            method,
            url: url.to_string(),
            headers,
            body,
        })
    }

    /// Body as text, lossily. Used for mock matching.
    pub fn body_text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}
