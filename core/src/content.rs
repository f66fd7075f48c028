//! Request body marshalling by content type.
//!
//! Only JSON and XML are produced. An unrecognized or missing content type
//! falls back to JSON rather than failing, so a body sent with
//! `Content-Type: text/plain` still goes out JSON-encoded.

use serde::Serialize;

use crate::error::{ClientError, Result};
use crate::http::{APPLICATION_XML, TEXT_XML};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    Json,
    Xml,
}

impl BodyEncoding {
    /// Select an encoding from a `Content-Type` value. Parameters such as
    /// `charset` are ignored and the comparison is case-insensitive.
    pub fn for_content_type(content_type: Option<&str>) -> Self {
        let Some(content_type) = content_type else {
            return BodyEncoding::Json;
        };
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        // `application/json`, `+json` and everything unrecognized share the
        // JSON encoder.
        if essence == APPLICATION_XML || essence == TEXT_XML || essence.ends_with("+xml") {
            BodyEncoding::Xml
        } else {
            BodyEncoding::Json
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BodyEncoding::Json => "json",
            BodyEncoding::Xml => "xml",
        }
    }

    pub fn encode<T: Serialize + ?Sized>(self, body: &T) -> Result<Vec<u8>> {
        match self {
            BodyEncoding::Json => serde_json::to_vec(body).map_err(|e| self.error(e)),
            BodyEncoding::Xml => quick_xml::se::to_string(body)
                .map(String::into_bytes)
                .map_err(|e| self.error(e)),
        }
    }

    fn error(self, err: impl std::fmt::Display) -> ClientError {
        ClientError::Encoding {
            format: self.name(),
            message: err.to_string(),
        }
    }
}

/// Encode `body` for the given content type. No body yields an empty
/// payload whatever the content type says.
pub fn encode_body<T: Serialize + ?Sized>(content_type: Option<&str>, body: Option<&T>) -> Result<Vec<u8>> {
    match body {
        None => Ok(Vec::new()),
        Some(body) => BodyEncoding::for_content_type(content_type).encode(body),
    }
}
