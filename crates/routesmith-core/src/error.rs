//! Error handling for the routesmith synthesis library.
//!
//! This module defines the main error type `Error` used throughout the library,
//! along with a convenient `Result` type alias. It uses `thiserror` for easy
//! error handling and implements conversions from common error types.
//!
//! Synthesis failures (`EmptyName`, `Collision`, `ReservedResource`,
//! `OperationBoundTwice`) always name the resource and operation that triggered
//! them so the caller can report the offending part of the model.
//!
//! # Examples
//!
//! ```
//! use routesmith_core::error::{Error, Result};
//!
//! fn might_fail() -> Result<()> {
//!     Err(Error::model("service 'Shop' not found"))
//! }
//!
//! assert!(might_fail().is_err());
//! ```

use std::fmt;

use thiserror::Error;

/// Result type for routesmith operations
pub type Result<T> = std::result::Result<T, Error>;

/// Which derived identifier two operations collided on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionKind {
    OperationName,
    FunctionId,
    Path,
}

impl fmt::Display for CollisionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::OperationName => "operation name",
            Self::FunctionId => "function id",
            Self::Path => "path",
        };
        f.write_str(label)
    }
}

/// Main error type for routesmith operations
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Template engine error
    #[error("Template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// Service model error (missing shapes, cycles, bad selectors)
    #[error("Model error: {0}")]
    Model(String),

    /// Template error
    #[error("Template error: {0}")]
    Template(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// An operation with an empty name reached the resolver
    #[error("operation '{operation_id}' in resource '{resource}' has an empty name")]
    EmptyName {
        resource: String,
        operation_id: String,
    },

    /// Two operations derived the same identifier
    #[error("{kind} collision on '{value}': '{first}' and '{second}'")]
    Collision {
        kind: CollisionKind,
        value: String,
        first: String,
        second: String,
    },

    /// A declared resource uses the name reserved for ungrouped operations
    #[error(
        "resource '{resource}' uses the reserved name 'api' while ungrouped operations exist (e.g. '{operation}')"
    )]
    ReservedResource { resource: String, operation: String },

    /// The same operation is bound by two resources
    #[error("operation '{operation}' is bound by both '{first}' and '{second}'")]
    OperationBoundTwice {
        operation: String,
        first: String,
        second: String,
    },
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new model error
    pub fn model<S: Into<String>>(msg: S) -> Self {
        Self::Model(msg.into())
    }

    /// Create a new template error
    pub fn template<S: Into<String>>(msg: S) -> Self {
        Self::Template(msg.into())
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self::Config(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::Config(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collision_message_names_both_operations() {
        let err = Error::Collision {
            kind: CollisionKind::Path,
            value: "GET /orders".to_string(),
            first: "order/ListOrders".to_string(),
            second: "api/AllOrders".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "path collision on 'GET /orders': 'order/ListOrders' and 'api/AllOrders'"
        );
    }

    #[test]
    fn test_string_conversion_is_config() {
        let err: Error = "bad flag".into();
        assert!(matches!(err, Error::Config(ref m) if m == "bad flag"));
    }
}
