//! RPC-style invocation, the Rust side of the generated `invokeEdge`.

use super::{
    check_response, prepare, InvokeEdgeError, ResponseResult, LOCAL_FUNCTIONS_DOWN_SIGNATURE,
    STALE_HINT,
};
use crate::aggregate::EndpointSchemasMap;
use crate::method::HttpMethod;
use crate::payload::Payload;
use derive_more::Display;
use serde_json::Value;

/// How an RPC call failed.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum RpcError {
    /// The function answered with a non-2xx status and a body.
    #[display("{message} (status {status})")]
    Http {
        /// HTTP status.
        status: u16,
        /// Transport description of the failure.
        message: String,
        /// Raw error body.
        body: Vec<u8>,
    },
    /// No usable response at all.
    #[display("{message}")]
    Transport {
        /// Transport description of the failure.
        message: String,
    },
}

impl std::error::Error for RpcError {}

impl RpcError {
    /// The transport description.
    pub fn message(&self) -> &str {
        match self {
            RpcError::Http { message, .. } | RpcError::Transport { message } => message,
        }
    }
}

/// An authenticated handle able to call a named function.
pub trait RpcClient {
    /// Calls function `name` with `method` and a JSON body.
    fn invoke(&self, name: &str, method: HttpMethod, body: &Value) -> Result<Payload, RpcError>;
}

/// Validates, calls and validates again.
///
/// See the [module docs](super) for the contract.
pub fn invoke<C: RpcClient + ?Sized>(
    schemas: &EndpointSchemasMap,
    endpoint: &str,
    body: &Value,
    client: &C,
) -> ResponseResult {
    let (key, io) = prepare(schemas, endpoint, body)?;

    let error = match client.invoke(&key.name, key.method, body) {
        Ok(payload) => return check_response(io, payload),
        Err(error) => error,
    };

    if error.message().contains(LOCAL_FUNCTIONS_DOWN_SIGNATURE) {
        tracing::warn!(
            endpoint = %key,
            error = %error,
            "Local Edge Functions appear to have stopped. Try starting them."
        );
    }

    match error {
        RpcError::Http {
            status,
            message,
            body,
        } => {
            let parsed = match serde_json::from_slice::<Value>(&body) {
                Ok(data) => Some(data),
                Err(e) => {
                    tracing::error!(endpoint = %key, error = %e, "Could not parse the error response body");
                    None
                }
            };
            match parsed {
                Some(data) if io.response.accepts(&data) => Err(InvokeEdgeError::Function {
                    http_status: status,
                    message,
                    data: Payload::Json(data),
                }),
                _ => Err(InvokeEdgeError::other(format!(
                    "Could not validate the error's response body. {} Hint: This is an error response.",
                    STALE_HINT
                ))),
            }
        }
        RpcError::Transport { message } => Err(InvokeEdgeError::other(message)),
    }
}

/// Binds [`invoke`] to a schema map and a client.
pub fn make_invoke_with_client<'a, C: RpcClient + ?Sized>(
    schemas: &'a EndpointSchemasMap,
    client: &'a C,
) -> impl Fn(&str, &Value) -> ResponseResult + 'a {
    move |endpoint, body| invoke(schemas, endpoint, body, client)
}
