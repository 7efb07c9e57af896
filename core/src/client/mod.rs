#![deny(missing_docs)]

//! # Transport Wrappers
//!
//! Rust counterparts of the generated `invokeEdge` / `fetchEdge` functions.
//! Both follow the same contract:
//!
//! 1. Resolve `"name::METHOD"` against an [`EndpointSchemasMap`].
//! 2. Validate the request body and fail fast, without touching the network.
//! 3. Send through a pluggable transport.
//! 4. Validate whatever comes back against the declared response shape.
//!
//! Wrappers never panic and never return anything but a [`ResponseResult`].
//! Every failure, including validation, is folded into an [`InvokeEdgeError`].

pub mod fetch;
pub mod invoke;
pub mod transport;

use crate::aggregate::{EndpointKey, EndpointSchemasMap};
use crate::definition::IoSchema;
use crate::payload::Payload;
use derive_more::Display;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use fetch::{fetch, make_fetch_with_server, FetchServerDetails};
pub use invoke::{invoke, make_invoke_with_client, RpcClient, RpcError};
pub use transport::{EdgeFunctionsClient, HttpTransport, TransportError, UreqTransport};

/// Appended to every message that likely means the generated schemas are stale.
pub const STALE_HINT: &str =
    "Hint: this generated file might be out of date. Regenerate it with endpoint-schemas.";

/// Returned when an endpoint key has no schemas.
pub const MISSING_SCHEMA_MESSAGE: &str = "No request/response schemas found for this endpoint. Hint: they come from the endpoint's definition file, so check that first, then regenerate this file.";

/// Returned when the request body fails its declared shape.
pub const INVALID_REQUEST_MESSAGE: &str = "Could not validate request body.";

/// Message prefix the edge runtime uses when it cannot be reached.
pub const LOCAL_FUNCTIONS_DOWN_SIGNATURE: &str = "Failed to send a request to the Edge Function";

/// Returned when a successful response is neither JSON nor flagged as binary.
pub const UNSUPPORTED_CONTENT_TYPE_MESSAGE: &str = "Unsupported content type returned.";

/// Why a wrapped call did not produce validated data.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum InvokeEdgeError<T = Payload> {
    /// The server answered with an error body that matches the declared response shape.
    #[display("{message}")]
    Function {
        /// HTTP status of the error response.
        http_status: u16,
        /// Transport-level description.
        message: String,
        /// The validated error body.
        data: T,
    },
    /// Validation, transport or schema-mismatch failure.
    #[display("{message}")]
    Other {
        /// Human readable diagnostic.
        message: String,
        /// The raw payload, when one was received but failed validation.
        data: Option<T>,
    },
}

impl<T: std::fmt::Debug> std::error::Error for InvokeEdgeError<T> {}

impl<T> InvokeEdgeError<T> {
    /// Shorthand for an `Other` error without data.
    pub fn other(message: impl Into<String>) -> Self {
        InvokeEdgeError::Other {
            message: message.into(),
            data: None,
        }
    }

    /// The diagnostic message.
    pub fn message(&self) -> &str {
        match self {
            InvokeEdgeError::Function { message, .. } | InvokeEdgeError::Other { message, .. } => {
                message
            }
        }
    }

    /// The carried payload, if any.
    pub fn data(&self) -> Option<&T> {
        match self {
            InvokeEdgeError::Function { data, .. } => Some(data),
            InvokeEdgeError::Other { data, .. } => data.as_ref(),
        }
    }

    /// HTTP status for `Function` errors.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            InvokeEdgeError::Function { http_status, .. } => Some(*http_status),
            InvokeEdgeError::Other { .. } => None,
        }
    }
}

/// Exactly one of validated data or an error.
pub type ResponseResult<T = Payload> = Result<T, InvokeEdgeError<T>>;

/// Resolves the key and validates the request body.
pub(crate) fn prepare<'a>(
    schemas: &'a EndpointSchemasMap,
    endpoint: &str,
    body: &Value,
) -> Result<(EndpointKey, &'a IoSchema), InvokeEdgeError> {
    let (key, io) = schemas
        .lookup(endpoint)
        .ok_or_else(|| InvokeEdgeError::other(MISSING_SCHEMA_MESSAGE))?;
    if let Err(e) = io.request.validate(body) {
        tracing::debug!(endpoint = %key, error = %e, "request body rejected");
        return Err(InvokeEdgeError::other(INVALID_REQUEST_MESSAGE));
    }
    Ok((key, io))
}

/// Validates a received payload, keeping it in `data` on failure.
pub(crate) fn check_response(io: &IoSchema, payload: Payload) -> ResponseResult {
    match io.response.validate_payload(&payload) {
        Ok(()) => Ok(payload),
        Err(e) => Err(InvokeEdgeError::Other {
            message: format!("Could not validate the response body: {}. {}", e, STALE_HINT),
            data: Some(payload),
        }),
    }
}

/// Converts a validated JSON result into a typed value.
///
/// Errors keep their raw payload. A payload that does not deserialize into `R`
/// (including a binary one) becomes `Other` with the payload kept in `data`.
pub fn decode<R: DeserializeOwned>(result: ResponseResult) -> Result<R, InvokeEdgeError> {
    let payload = result?;
    let parsed = match &payload {
        Payload::Json(value) => R::deserialize(value).map_err(|e| e.to_string()),
        Payload::Bytes(_) => Err("binary payload cannot be decoded as JSON".to_string()),
    };
    parsed.map_err(|e| InvokeEdgeError::Other {
        message: format!("Could not decode the response body: {}. {}", e, STALE_HINT),
        data: Some(payload),
    })
}
