#![deny(missing_docs)]

//! # Endpoint Schemas Core
//!
//! Discovers endpoint definition files, aggregates their request/response
//! schemas, and emits a validated TypeScript client. Also hosts the Rust
//! transport wrappers and the server-side response helpers that honour the
//! same schema contract.

/// Shared error types.
pub mod error;

/// HTTP methods an endpoint may declare.
pub mod method;

/// Schema shapes and validation.
pub mod schema;

/// JSON or binary bodies.
pub mod payload;

/// Endpoint definition files.
pub mod definition;

/// Endpoint discovery.
pub mod discovery;

/// Aggregation into the endpoint schemas map.
pub mod aggregate;

/// TypeScript client emission.
pub mod emit;

/// Validated invoke and fetch wrappers.
pub mod client;

/// Server-side response helpers.
pub mod response;

/// The generation pipeline.
pub mod generator;

pub use aggregate::{aggregate, EndpointKey, EndpointSchemasMap};
pub use client::{
    decode, fetch, invoke, make_fetch_with_server, make_invoke_with_client, EdgeFunctionsClient,
    FetchServerDetails, HttpTransport, InvokeEdgeError, ResponseResult, RpcClient, RpcError,
    UreqTransport,
};
pub use definition::{load_definition, parse_definition, EndpointSchemas, IoSchema};
pub use discovery::{discover_endpoints, EndpointDescriptor};
pub use emit::{emit_client, ClientTemplate, OUTPUT_FILE};
pub use error::{AppError, AppResult};
pub use generator::{generate, run, AnswerMap, GenerationConfig, GenerationReport, UserInput};
pub use method::HttpMethod;
pub use payload::Payload;
pub use response::{
    build_response, error_to_response, is_request, is_response, EndpointResponseError,
    ResponseBuildError, ResponseFormat,
};
pub use schema::{CompiledShape, SchemaShape, ValidationError};
