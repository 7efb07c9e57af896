//! Direct HTTP calls, the Rust side of the generated `fetchEdge`.

use super::transport::{is_binary, media_type, HttpTransport};
use super::{check_response, prepare, InvokeEdgeError, ResponseResult, UNSUPPORTED_CONTENT_TYPE_MESSAGE};
use crate::aggregate::EndpointSchemasMap;
use crate::payload::Payload;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ureq::http::{header, Request};

/// Where and how to reach the functions server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchServerDetails {
    /// Prefix the endpoint name is appended to, usually ending in `/`.
    pub root_url: String,
    /// Sent as `Authorization: Bearer <token>`.
    pub bearer_token: String,
}

/// Validates, sends over HTTP and validates again.
pub fn fetch<T: HttpTransport + ?Sized>(
    schemas: &EndpointSchemasMap,
    endpoint: &str,
    body: &Value,
    server: &FetchServerDetails,
    transport: &T,
) -> ResponseResult {
    let (key, io) = prepare(schemas, endpoint, body)?;

    let payload = if body.is_null() {
        Vec::new()
    } else {
        serde_json::to_vec(body)
            .map_err(|e| InvokeEdgeError::other(format!("Request failed: {}", e)))?
    };
    let request = Request::builder()
        .method(key.method.as_str())
        .uri(format!("{}{}", server.root_url, key.name))
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", server.bearer_token))
        .body(payload)
        .map_err(|e| InvokeEdgeError::other(format!("Request failed: {}", e)))?;

    tracing::debug!(endpoint = %key, uri = %request.uri(), "fetching");
    let response = transport
        .send(request)
        .map_err(|e| InvokeEdgeError::other(format!("Request failed: {}", e)))?;

    if !response.status().is_success() {
        return Err(InvokeEdgeError::other(format!(
            "Server returned a non-OK response. Status: {}",
            response.status().as_u16()
        )));
    }

    let payload = if media_type(&response) == "application/json" {
        let data = serde_json::from_slice(response.body())
            .map_err(|_| InvokeEdgeError::other("Could not parse the JSON response body."))?;
        Payload::Json(data)
    } else if is_binary(&response) {
        Payload::Bytes(response.into_body())
    } else {
        return Err(InvokeEdgeError::other(UNSUPPORTED_CONTENT_TYPE_MESSAGE));
    };

    check_response(io, payload)
}

/// Binds [`fetch`] to a schema map, a server and a transport.
pub fn make_fetch_with_server<'a, T: HttpTransport + ?Sized>(
    schemas: &'a EndpointSchemasMap,
    server: FetchServerDetails,
    transport: &'a T,
) -> impl Fn(&str, &Value) -> ResponseResult + 'a {
    move |endpoint, body| fetch(schemas, endpoint, body, &server, transport)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::endpoint1;
    use crate::client::transport::test_support::MockTransport;
    use crate::client::INVALID_REQUEST_MESSAGE;
    use crate::definition::parse_definition;
    use serde_json::json;
    use std::path::Path;

    fn server() -> FetchServerDetails {
        FetchServerDetails {
            root_url: "http://localhost:54321/functions/v1/".into(),
            bearer_token: "secret".into(),
        }
    }

    fn json_ok(body: &str) -> MockTransport {
        MockTransport::respond(200, vec![("Content-Type", "application/json; charset=utf-8")], body)
    }

    #[test]
    fn test_request_shape() {
        let transport = json_ok(r#"{"success":true,"products":[4]}"#);
        let result = fetch(&endpoint1(), "endpoint1::POST", &json!({"bundle_id": 4}), &server(), &transport);
        assert_eq!(result, Ok(Payload::Json(json!({"success": true, "products": [4]}))));

        let requests = transport.requests.borrow();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.method(), "POST");
        assert_eq!(request.uri(), "http://localhost:54321/functions/v1/endpoint1");
        assert_eq!(request.headers()["authorization"], "Bearer secret");
        assert_eq!(request.headers()["content-type"], "application/json");
        assert_eq!(request.body(), br#"{"bundle_id":4}"#);
    }

    #[test]
    fn test_invalid_request_makes_no_call() {
        let transport = json_ok("{}");
        let result = fetch(
            &endpoint1(),
            "endpoint1::POST",
            &json!({"bundle_id": "not-a-number"}),
            &server(),
            &transport,
        );
        assert_eq!(result, Err(InvokeEdgeError::other(INVALID_REQUEST_MESSAGE)));
        assert!(transport.requests.borrow().is_empty());
    }

    #[test]
    fn test_non_ok_status() {
        let transport = MockTransport::respond(500, vec![], "");
        let result = fetch(&endpoint1(), "endpoint1::POST", &json!({"bundle_id": 1}), &server(), &transport);
        assert_eq!(
            result,
            Err(InvokeEdgeError::other("Server returned a non-OK response. Status: 500"))
        );
    }

    #[test]
    fn test_invalid_response_keeps_data() {
        let transport = json_ok(r#"{"success":1}"#);
        let err = fetch(&endpoint1(), "endpoint1::POST", &json!({"bundle_id": 1}), &server(), &transport)
            .unwrap_err();
        assert!(err.message().starts_with("Could not validate the response body"));
        assert_eq!(err.data(), Some(&Payload::Json(json!({"success": 1}))));
    }

    #[test]
    fn test_unsupported_content_type() {
        let transport = MockTransport::respond(200, vec![("Content-Type", "text/html")], "<p>hi</p>");
        let err = fetch(&endpoint1(), "endpoint1::POST", &json!({"bundle_id": 1}), &server(), &transport)
            .unwrap_err();
        assert_eq!(err.message(), UNSUPPORTED_CONTENT_TYPE_MESSAGE);
    }

    #[test]
    fn test_transport_failure() {
        let transport = MockTransport::fail("dns error");
        let err = fetch(&endpoint1(), "endpoint1::POST", &json!({"bundle_id": 1}), &server(), &transport)
            .unwrap_err();
        assert_eq!(err.message(), "Request failed: dns error");
    }

    #[test]
    fn test_binary_response() {
        let schemas = EndpointSchemasMap::from_endpoints([(
            "export",
            parse_definition(
                Path::new("export/endpoint.yaml"),
                "GET: { request: 'null', response: bytes }\n",
            )
            .unwrap(),
        )])
        .unwrap();
        let transport = MockTransport::respond(
            200,
            vec![("Content-Type", "application/octet-stream"), ("X-Response-Format", "Uint8Array")],
            vec![0u8, 159, 146, 150],
        );

        let call = make_fetch_with_server(&schemas, server(), &transport);
        assert_eq!(
            call("export::GET", &Value::Null),
            Ok(Payload::Bytes(vec![0, 159, 146, 150]))
        );
        assert!(transport.requests.borrow()[0].body().is_empty());
    }
}
