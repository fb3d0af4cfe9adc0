//! HTTP helpers for the booking Lambda.

use lambda_http::http::header::CONTENT_TYPE;
use lambda_http::{Body, Request, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::{Error, Result};

pub const INVALID_BODY_MESSAGE: &str = "Invalid request body";
pub const UNSUPPORTED_CONTENT_TYPE_MESSAGE: &str = "Unsupported content type";

/// Create a JSON response with the given status code and data.
pub fn json_response<T: Serialize>(status: u16, data: &T) -> Result<Response<Body>> {
    Ok(Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Body::from(serde_json::to_string(data)?))?)
}

/// Create a plain-text response with the given status code.
pub fn text_response(status: u16, message: impl Into<String>) -> Result<Response<Body>> {
    Ok(Response::builder()
        .status(status)
        .header("content-type", "text/plain")
        .header("Access-Control-Allow-Origin", "*")
        .body(Body::from(message.into()))?)
}

/// Translate an internal error into the response the caller sees.
pub fn error_response(error: &Error) -> Result<Response<Body>> {
    text_response(error.status_code(), error.client_message())
}

/// CORS preflight answer, identical for every path.
pub fn preflight_response() -> Result<Response<Body>> {
    Ok(Response::builder()
        .status(204)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "POST, GET, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type")
        .body(Body::Empty)?)
}

/// Inbound body decoders, selected by the request's content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyDecoder {
    Json,
    Form,
}

impl BodyDecoder {
    /// Pick a decoder for a `content-type` header value.
    ///
    /// Parameters such as `charset` are ignored.
    pub fn for_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "application/json" => Some(Self::Json),
            "application/x-www-form-urlencoded" => Some(Self::Form),
            _ => None,
        }
    }

    /// Pick a decoder for a request, failing with 415 when none fits.
    pub fn for_request(request: &Request) -> Result<Self> {
        let content_type = request
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        Self::for_content_type(content_type).ok_or_else(|| {
            Error::UnsupportedMediaType(UNSUPPORTED_CONTENT_TYPE_MESSAGE.to_string())
        })
    }

    /// Decode a request body into `T`.
    pub fn decode<T: DeserializeOwned>(&self, body: &[u8]) -> Result<T> {
        let decoded = match self {
            Self::Json => serde_json::from_slice(body),
            Self::Form => serde_json::from_value(Value::Object(form_fields(body))),
        };

        decoded.map_err(|e| {
            warn!("Failed to decode {:?} body: {}", self, e);
            Error::Validation(INVALID_BODY_MESSAGE.to_string())
        })
    }
}

/// Form fields as a JSON object of strings; a repeated key keeps its last value.
fn form_fields(body: &[u8]) -> Map<String, Value> {
    url::form_urlencoded::parse(body)
        .into_owned()
        .map(|(key, value)| (key, Value::String(value)))
        .collect()
}
