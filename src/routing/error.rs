//! Routing errors.

use thiserror::Error;

use crate::routing::route::Route;

/// Errors raised while registering routes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The pattern string is not a valid route pattern.
    #[error("invalid route pattern `{pattern}`: {reason}")]
    InvalidPattern {
        pattern: String,
        reason: &'static str,
    },

    /// The pattern matches exactly the same paths as one already registered.
    #[error("route pattern `{pattern}` conflicts with `{existing}`")]
    Conflict { pattern: String, existing: String },
}

/// No registered pattern matched the requested path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no route matches `{}`", .route.path())]
pub struct NotFound {
    /// The parsed URL that failed to match.
    pub route: Route,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RouteError::Conflict {
            pattern: "/users/{name}".into(),
            existing: "/users/{id}".into(),
        };
        assert_eq!(
            err.to_string(),
            "route pattern `/users/{name}` conflicts with `/users/{id}`"
        );

        let err = NotFound {
            route: Route::parse("/missing?x=1"),
        };
        assert_eq!(err.to_string(), "no route matches `/missing`");
    }
}
