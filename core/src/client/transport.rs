//! # Transports
//!
//! The HTTP seam both wrappers send through, its blocking `ureq` implementation,
//! and [`EdgeFunctionsClient`], an [`RpcClient`] that talks to a functions
//! gateway the way the hosted client library does.

use super::invoke::{RpcClient, RpcError};
use super::LOCAL_FUNCTIONS_DOWN_SIGNATURE;
use crate::method::HttpMethod;
use crate::payload::{Payload, BINARY_FORMAT, RESPONSE_FORMAT_HEADER};
use derive_more::Display;
use serde_json::Value;
use ureq::http::{header, Request, Response};

/// No response was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("{message}")]
pub struct TransportError {
    /// What went wrong.
    pub message: String,
}

impl std::error::Error for TransportError {}

impl TransportError {
    /// Creates an error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Sends one fully buffered request.
///
/// Implementations must return non-2xx responses as `Ok`.
pub trait HttpTransport {
    /// Performs the exchange.
    fn send(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, TransportError>;
}

/// Blocking transport backed by a [`ureq::Agent`].
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// Agent with default settings, except that HTTP status codes are never errors.
    pub fn new() -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent }
    }

    /// Uses a preconfigured agent (timeouts, proxies). It should have
    /// `http_status_as_error(false)`.
    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport for UreqTransport {
    fn send(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, TransportError> {
        let response = self
            .agent
            .run(request)
            .map_err(|e| TransportError::new(e.to_string()))?;
        let (parts, mut body) = response.into_parts();
        let bytes = body
            .read_to_vec()
            .map_err(|e| TransportError::new(format!("Failed to read response body: {}", e)))?;
        Ok(Response::from_parts(parts, bytes))
    }
}

/// Lower-cased media type of a response, without parameters.
pub(crate) fn media_type<B>(response: &Response<B>) -> String {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// True when the response flags its body as binary.
pub(crate) fn is_binary<B>(response: &Response<B>) -> bool {
    response
        .headers()
        .get(RESPONSE_FORMAT_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == BINARY_FORMAT)
}

/// Authenticated handle to a functions gateway, e.g. `https://<ref>.supabase.co/functions/v1`.
#[derive(Debug, Clone)]
pub struct EdgeFunctionsClient<T: HttpTransport = UreqTransport> {
    functions_url: String,
    bearer_token: String,
    apikey: Option<String>,
    transport: T,
}

impl EdgeFunctionsClient<UreqTransport> {
    /// Client over the default [`UreqTransport`].
    pub fn new(functions_url: impl Into<String>, bearer_token: impl Into<String>) -> Self {
        Self::with_transport(functions_url, bearer_token, UreqTransport::new())
    }
}

impl<T: HttpTransport> EdgeFunctionsClient<T> {
    /// Client over any transport.
    pub fn with_transport(
        functions_url: impl Into<String>,
        bearer_token: impl Into<String>,
        transport: T,
    ) -> Self {
        Self {
            functions_url: functions_url.into(),
            bearer_token: bearer_token.into(),
            apikey: None,
            transport,
        }
    }

    /// Also sends an `apikey` header.
    pub fn apikey(mut self, apikey: impl Into<String>) -> Self {
        self.apikey = Some(apikey.into());
        self
    }

    fn function_url(&self, name: &str) -> String {
        format!("{}/{}", self.functions_url.trim_end_matches('/'), name)
    }
}

impl<T: HttpTransport> RpcClient for EdgeFunctionsClient<T> {
    fn invoke(&self, name: &str, method: HttpMethod, body: &Value) -> Result<Payload, RpcError> {
        let transport_error = |detail: String| RpcError::Transport {
            message: format!("{}: {}", LOCAL_FUNCTIONS_DOWN_SIGNATURE, detail),
        };

        let mut builder = Request::builder()
            .method(method.as_str())
            .uri(self.function_url(name))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.bearer_token));
        if let Some(apikey) = &self.apikey {
            builder = builder.header("apikey", apikey.as_str());
        }
        let payload = if body.is_null() {
            Vec::new()
        } else {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            serde_json::to_vec(body).map_err(|e| transport_error(e.to_string()))?
        };
        let request = builder
            .body(payload)
            .map_err(|e| transport_error(e.to_string()))?;

        let response = self
            .transport
            .send(request)
            .map_err(|e| transport_error(e.message))?;

        if response
            .headers()
            .get("x-relay-error")
            .is_some_and(|v| v.as_bytes() == b"true")
        {
            return Err(RpcError::Transport {
                message: "Relay Error invoking the Edge Function".into(),
            });
        }

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Http {
                status: status.as_u16(),
                message: "Edge Function returned a non-2xx status code".into(),
                body: response.into_body(),
            });
        }

        let media = media_type(&response);
        let bytes = response.into_body();
        match media.as_str() {
            "application/json" => serde_json::from_slice(&bytes)
                .map(Payload::Json)
                .map_err(|e| RpcError::Transport {
                    message: format!("Invalid JSON returned by the Edge Function: {}", e),
                }),
            "application/octet-stream" => Ok(Payload::Bytes(bytes)),
            _ => Ok(Payload::Json(Value::String(
                String::from_utf8_lossy(&bytes).into_owned(),
            ))),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::MockTransport;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_media_type_strips_parameters() {
        let response = Response::builder()
            .header("Content-Type", "Application/JSON; charset=utf-8")
            .body(())
            .unwrap();
        assert_eq!(media_type(&response), "application/json");
        assert!(!is_binary(&response));
    }

    #[test]
    fn test_client_sends_auth_and_json() {
        let transport = MockTransport::respond(
            200,
            vec![("Content-Type", "application/json")],
            r#"{"ok":true}"#,
        );
        let client = EdgeFunctionsClient::with_transport("http://localhost:54321/functions/v1/", "tok", transport)
            .apikey("anon");

        let payload = client
            .invoke("endpoint1", HttpMethod::Post, &json!({"bundle_id": 1}))
            .unwrap();
        assert_eq!(payload, Payload::Json(json!({"ok": true})));

        let requests = client.transport.requests.borrow();
        let request = &requests[0];
        assert_eq!(request.method(), "POST");
        assert_eq!(request.uri(), "http://localhost:54321/functions/v1/endpoint1");
        assert_eq!(request.headers()["authorization"], "Bearer tok");
        assert_eq!(request.headers()["apikey"], "anon");
        assert_eq!(request.headers()["content-type"], "application/json");
        assert_eq!(request.body(), br#"{"bundle_id":1}"#);
    }

    #[test]
    fn test_client_maps_failures() {
        let down = EdgeFunctionsClient::with_transport("http://x", "t", MockTransport::fail("connection refused"));
        let err = down.invoke("e", HttpMethod::Get, &Value::Null).unwrap_err();
        assert!(err.message().starts_with(LOCAL_FUNCTIONS_DOWN_SIGNATURE));

        let teapot = EdgeFunctionsClient::with_transport(
            "http://x",
            "t",
            MockTransport::respond(418, vec![], r#"{"error":"teapot"}"#),
        );
        match teapot.invoke("e", HttpMethod::Get, &Value::Null).unwrap_err() {
            RpcError::Http { status, body, .. } => {
                assert_eq!(status, 418);
                assert_eq!(body, br#"{"error":"teapot"}"#);
            }
            other => panic!("Unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_client_binary_and_text_bodies() {
        let bytes = EdgeFunctionsClient::with_transport(
            "http://x",
            "t",
            MockTransport::respond(200, vec![("Content-Type", "application/octet-stream")], vec![1u8, 2, 3]),
        );
        assert_eq!(
            bytes.invoke("e", HttpMethod::Get, &Value::Null).unwrap(),
            Payload::Bytes(vec![1, 2, 3])
        );

        let text = EdgeFunctionsClient::with_transport(
            "http://x",
            "t",
            MockTransport::respond(200, vec![("Content-Type", "text/plain")], "hello"),
        );
        assert_eq!(
            text.invoke("e", HttpMethod::Get, &Value::Null).unwrap(),
            Payload::Json(json!("hello"))
        );
    }
}
