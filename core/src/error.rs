//! # Error Handling
//!
//! Provides the unified `AppError` enum used by the generation pipeline.
//!
//! Transport wrappers never surface these; they fold every failure into an
//! [`InvokeEdgeError`](crate::client::InvokeEdgeError) instead.

use derive_more::{Display, From};
use std::path::PathBuf;

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// An endpoint definition file could not be read or is incomplete.
    #[from(ignore)]
    #[display("Endpoint Definition Error in {}: {reason}", path.display())]
    Definition {
        /// The offending definition file.
        path: PathBuf,
        /// What is wrong with it.
        reason: String,
    },

    /// Two endpoint definitions resolved to the same endpoint name.
    #[from(ignore)]
    #[display(
        "Duplicate endpoint '{name}': {} and {}",
        first.display(),
        second.display()
    )]
    DuplicateEndpoint {
        /// The derived endpoint name.
        name: String,
        /// The definition discovered first.
        first: PathBuf,
        /// The definition that collided with it.
        second: PathBuf,
    },

    /// The client template is unreadable or malformed.
    #[from(ignore)]
    #[display("Template Error: {_0}")]
    Template(String),

    /// A schema shape could not be compiled into a validator.
    #[from(ignore)]
    #[display("Schema Error: {_0}")]
    Schema(String),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_io_conversion() {
        let io_err = Error::new(ErrorKind::Other, "test");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
    }

    #[test]
    fn test_string_conversion() {
        let msg = String::from("something wrong");
        let app_err: AppError = msg.into();
        match app_err {
            AppError::General(s) => assert_eq!(s, "something wrong"),
            _ => panic!("String should convert to AppError::General"),
        }
    }

    #[test]
    fn test_duplicate_endpoint_display_names_both_files() {
        let err = AppError::DuplicateEndpoint {
            name: "orders".into(),
            first: PathBuf::from("a/orders/endpoint.yaml"),
            second: PathBuf::from("b/orders/endpoint.json"),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("'orders'"));
        assert!(rendered.contains("a/orders/endpoint.yaml"));
        assert!(rendered.contains("b/orders/endpoint.json"));
    }
}
