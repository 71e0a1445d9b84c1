//! Error types for route-state operations.
//!
//! The bucket cache has no error conditions; everything here comes from route
//! resolution, route-map loading, or a collaborator refusing a request.

use std::path::PathBuf;

/// All errors that can occur in route-state operations.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    // ─────────────────────────────────────────────────────────────────────
    // Resolution Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Route not found: {0}")]
    RouteNotFound(String),

    #[error("Handler chain is empty")]
    EmptyHandlerChain,

    #[error("Param count mismatch for {route}: expected {expected}, got {actual}")]
    ParamCountMismatch {
        route: String,
        expected: usize,
        actual: usize,
    },

    // ─────────────────────────────────────────────────────────────────────
    // Route Map Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Invalid route name {name:?}: {reason}")]
    InvalidRouteName { name: String, reason: String },

    #[error("Route declared twice: {0}")]
    DuplicateRoute(String),

    #[error("Route {route} declared without its parent {parent}")]
    MissingParentRoute { route: String, parent: String },

    #[error("Route map malformed: {path}: {details}")]
    ConfigMalformed { path: PathBuf, details: String },

    // ─────────────────────────────────────────────────────────────────────
    // Collaborator Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Navigation to {route} failed: {details}")]
    NavigationFailed { route: String, details: String },

    // ─────────────────────────────────────────────────────────────────────
    // I/O Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parsing error: {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results using RouteError.
pub type Result<T> = std::result::Result<T, RouteError>;

impl From<RouteError> for String {
    fn from(err: RouteError) -> String {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_not_found_names_the_route() {
        let err = RouteError::RouteNotFound("posts.missing".to_string());
        assert_eq!(err.to_string(), "Route not found: posts.missing");
    }

    #[test]
    fn test_error_converts_to_string() {
        let message: String = RouteError::DuplicateRoute("posts".to_string()).into();
        assert_eq!(message, "Route declared twice: posts");
    }
}
