#![deny(missing_docs)]

//! # Server-Side Responses
//!
//! Helpers for endpoint implementations that serve the same schema contract the
//! generated client checks:
//!
//! * [`build_response`] validates a body against the endpoint's declared response
//!   shape and renders it with the format headers the client expects.
//! * [`EndpointResponseError`] is a typed error carrying a ready-made response.
//!   It implements [`actix_web::ResponseError`], so handlers can bubble it up with `?`.
//! * [`error_to_response`] turns any error into a response, falling back to a 500.
//!
//! A body that violates its own declared shape is a programmer error, reported as
//! [`ResponseBuildError`] rather than as an HTTP failure.

use crate::definition::EndpointSchemas;
use crate::method::HttpMethod;
use crate::payload::{Payload, BINARY_FORMAT, RESPONSE_FORMAT_HEADER};
use actix_web::http::header::{self, HeaderName, HeaderValue};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use derive_more::Display;
use indexmap::IndexMap;
use serde_json::Value;
use std::panic::Location;

/// How a body is marked on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    /// `X-Response-Format: json`
    Json,
    /// `X-Response-Format: Uint8Array`
    Uint8Array,
}

impl BodyFormat {
    /// Header value.
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyFormat::Json => "json",
            BodyFormat::Uint8Array => BINARY_FORMAT,
        }
    }
}

/// The format marker headers of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseFormat {
    /// `Content-Type` value.
    pub content_type: String,
    /// `X-Response-Format` value.
    pub body_format: BodyFormat,
}

impl ResponseFormat {
    /// `application/json`, the default.
    pub fn json() -> Self {
        Self {
            content_type: "application/json".into(),
            body_format: BodyFormat::Json,
        }
    }

    /// Raw bytes with the given content type.
    pub fn binary(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            body_format: BodyFormat::Uint8Array,
        }
    }

    fn is_json(&self) -> bool {
        self.content_type
            .split(';')
            .next()
            .is_some_and(|m| m.trim().eq_ignore_ascii_case("application/json"))
    }
}

impl Default for ResponseFormat {
    fn default() -> Self {
        Self::json()
    }
}

/// A response could not be built. Indicates a bug in the endpoint, not in the request.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("{message}")]
pub struct ResponseBuildError {
    message: String,
}

impl std::error::Error for ResponseBuildError {}

impl ResponseBuildError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A validated response that can be rendered any number of times.
#[derive(Debug, Clone)]
pub struct PreparedResponse {
    status: StatusCode,
    headers: IndexMap<HeaderName, HeaderValue>,
    body: Vec<u8>,
}

impl PreparedResponse {
    /// Validates and renders; see [`build_response`].
    pub fn prepare(
        schemas: &EndpointSchemas,
        method: HttpMethod,
        status: u16,
        body: &Payload,
        headers: &[(&str, &str)],
        format: &ResponseFormat,
        validate: bool,
    ) -> Result<Self, ResponseBuildError> {
        if validate {
            let io = schemas.get(&method).ok_or_else(|| {
                ResponseBuildError::new(format!("No schemas declared for {}", method))
            })?;
            io.response.validate_payload(body).map_err(|e| {
                ResponseBuildError::new(format!(
                    "Could not validate response. Parse error: {}. Response: {}",
                    e,
                    body.describe()
                ))
            })?;
            if format.body_format == BodyFormat::Uint8Array && body.as_bytes().is_none() {
                return Err(ResponseBuildError::new(
                    "Could not validate response. Parse error: body not Uint8Array",
                ));
            }
        }

        let status = StatusCode::from_u16(status)
            .map_err(|e| ResponseBuildError::new(format!("Invalid status {}: {}", status, e)))?;

        Ok(Self {
            status,
            headers: merge_headers(headers, format)?,
            body: render_body(body, format)?,
        })
    }

    /// Status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// A header value, if set.
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = HeaderName::try_from(name).ok()?;
        self.headers.get(&name).and_then(|v| v.to_str().ok())
    }

    /// Rendered body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Produces the actix response.
    pub fn to_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status);
        for (name, value) in &self.headers {
            builder.insert_header((name.clone(), value.clone()));
        }
        builder.body(self.body.clone())
    }
}

fn merge_headers(
    headers: &[(&str, &str)],
    format: &ResponseFormat,
) -> Result<IndexMap<HeaderName, HeaderValue>, ResponseBuildError> {
    let mut merged = IndexMap::new();
    for (name, value) in headers {
        let name = HeaderName::try_from(*name)
            .map_err(|e| ResponseBuildError::new(format!("Invalid header name '{}': {}", name, e)))?;
        let value = HeaderValue::try_from(*value)
            .map_err(|e| ResponseBuildError::new(format!("Invalid value for header {}: {}", name, e)))?;
        merged.insert(name, value);
    }

    let content_type = HeaderValue::try_from(format.content_type.as_str())
        .map_err(|e| ResponseBuildError::new(format!("Invalid content type: {}", e)))?;
    merged.insert(header::CONTENT_TYPE, content_type);
    merged.insert(
        HeaderName::from_static("x-response-format"),
        HeaderValue::from_static(format.body_format.as_str()),
    );

    let existing = merged
        .get(&header::ACCESS_CONTROL_EXPOSE_HEADERS)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let mut exposed = vec![RESPONSE_FORMAT_HEADER];
    exposed.extend(
        existing
            .split(',')
            .map(str::trim)
            .filter(|h| !h.is_empty() && !h.eq_ignore_ascii_case(RESPONSE_FORMAT_HEADER)),
    );
    let exposed = HeaderValue::try_from(exposed.join(", "))
        .map_err(|e| ResponseBuildError::new(format!("Invalid expose headers: {}", e)))?;
    merged.insert(header::ACCESS_CONTROL_EXPOSE_HEADERS, exposed);

    Ok(merged)
}

fn render_body(body: &Payload, format: &ResponseFormat) -> Result<Vec<u8>, ResponseBuildError> {
    let rendered = match (body, format.is_json()) {
        (Payload::Json(value), true) => serde_json::to_vec(value),
        (Payload::Bytes(bytes), true) => serde_json::to_vec(bytes),
        (Payload::Bytes(bytes), false) => Ok(bytes.clone()),
        (Payload::Json(Value::String(text)), false) => Ok(text.clone().into_bytes()),
        (Payload::Json(value), false) => Ok(value.to_string().into_bytes()),
    };
    rendered.map_err(|e| ResponseBuildError::new(format!("Could not serialize response: {}", e)))
}

/// Builds an outgoing response for `method`.
///
/// With `validate`, the body must satisfy the declared response shape, and a
/// binary `format` requires a [`Payload::Bytes`] body. Caller headers are merged
/// first, then the format markers override them, and
/// `Access-Control-Expose-Headers` is extended with `X-Response-Format`.
pub fn build_response(
    schemas: &EndpointSchemas,
    method: HttpMethod,
    status: u16,
    body: &Payload,
    headers: &[(&str, &str)],
    format: &ResponseFormat,
    validate: bool,
) -> Result<HttpResponse, ResponseBuildError> {
    PreparedResponse::prepare(schemas, method, status, body, headers, format, validate)
        .map(|prepared| prepared.to_response())
}

/// An error that already knows the response it should become.
#[derive(Debug, Display)]
#[display("{message}")]
pub struct EndpointResponseError {
    message: String,
    response: PreparedResponse,
}

impl EndpointResponseError {
    /// Builds the JSON response (validated) and the diagnostic message.
    pub fn new(
        schemas: &EndpointSchemas,
        method: HttpMethod,
        message: &str,
        status: u16,
        body: &Payload,
        headers: &[(&str, &str)],
    ) -> Result<Self, ResponseBuildError> {
        let response = PreparedResponse::prepare(
            schemas,
            method,
            status,
            body,
            headers,
            &ResponseFormat::json(),
            true,
        )?;
        Ok(Self {
            message: format!("[{} error] {} Response: {}", status, message, body.describe()),
            response,
        })
    }

    /// The diagnostic message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The carried response.
    pub fn response(&self) -> &PreparedResponse {
        &self.response
    }
}

impl std::error::Error for EndpointResponseError {}

impl ResponseError for EndpointResponseError {
    fn status_code(&self) -> StatusCode {
        self.response.status
    }

    fn error_response(&self) -> HttpResponse {
        self.response.to_response()
    }
}

/// Converts any error into a response.
///
/// An [`EndpointResponseError`] yields its own response; anything else is logged
/// and replaced by a 500 built from `fallback_body`. With `trace_caller` the log
/// line names the calling location.
#[track_caller]
pub fn error_to_response(
    error: &(dyn std::error::Error + 'static),
    schemas: &EndpointSchemas,
    method: HttpMethod,
    fallback_body: &Payload,
    headers: &[(&str, &str)],
    trace_caller: bool,
) -> Result<HttpResponse, ResponseBuildError> {
    let location = Location::caller();
    let caller = trace_caller.then_some(location);

    if let Some(typed) = error.downcast_ref::<EndpointResponseError>() {
        match caller {
            Some(at) => tracing::warn!(error = %typed, caller = %at, "ResponseError"),
            None => tracing::warn!(error = %typed, "ResponseError"),
        }
        return Ok(typed.response.to_response());
    }

    match caller {
        Some(at) => tracing::warn!(error = %error, caller = %at, "Error"),
        None => tracing::warn!(error = %error, "Error"),
    }
    build_response(
        schemas,
        method,
        500,
        fallback_body,
        headers,
        &ResponseFormat::json(),
        true,
    )
}

/// True when `value` satisfies the request shape declared for `method`.
pub fn is_request(schemas: &EndpointSchemas, method: HttpMethod, value: &Value) -> bool {
    schemas
        .get(&method)
        .is_some_and(|io| io.request.accepts(value))
}

/// True when `value` satisfies the response shape declared for `method`.
pub fn is_response(schemas: &EndpointSchemas, method: HttpMethod, value: &Value) -> bool {
    schemas
        .get(&method)
        .is_some_and(|io| io.response.accepts(value))
}
