//! Route registration and lookup.
//!
//! # Responsibilities
//! - Collect (pattern, handler) pairs during startup
//! - Freeze them into an immutable, precedence-ordered table
//! - Resolve a URL to a handler and its `RouteInfo`, or an explicit NotFound
//!
//! # Design Decisions
//! - `RouterBuilder` is the only mutable phase; `Router` has no setters, so
//!   it is shared across tasks without locks
//! - Precedence: most literal segments first, registration order on ties
//! - O(n) scan over patterns (acceptable for typical page counts)

use std::borrow::Cow;
use std::cmp::Reverse;
use std::fmt;

use crate::routing::error::{NotFound, RouteError};
use crate::routing::info::RouteInfo;
use crate::routing::pattern::{decode_segment, RoutePattern};
use crate::routing::route::Route;

struct Entry<H> {
    pattern: RoutePattern,
    handler: H,
}

/// Mutable registration table, consumed by [`RouterBuilder::build`].
pub struct RouterBuilder<H> {
    entries: Vec<Entry<H>>,
}

impl<H> RouterBuilder<H> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register `handler` under `pattern`.
    ///
    /// Fails if the pattern is malformed or matches exactly the same paths as
    /// a pattern already registered (e.g. `/users/{id}` and `/users/{name}`).
    pub fn register(&mut self, pattern: &str, handler: H) -> Result<&mut Self, RouteError> {
        let pattern = RoutePattern::parse(pattern)?;

        if let Some(existing) = self
            .entries
            .iter()
            .find(|entry| entry.pattern.shape() == pattern.shape())
        {
            return Err(RouteError::Conflict {
                pattern: pattern.to_string(),
                existing: existing.pattern.to_string(),
            });
        }

        tracing::debug!(pattern = %pattern, "Route registered");
        self.entries.push(Entry { pattern, handler });
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Freeze the table.
    pub fn build(mut self) -> Router<H> {
        // Stable sort keeps registration order among equal specificity.
        self.entries
            .sort_by_key(|entry| Reverse(entry.pattern.specificity()));
        Router {
            entries: self.entries,
        }
    }
}

impl<H> Default for RouterBuilder<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> fmt::Debug for RouterBuilder<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|entry| entry.pattern.to_string()))
            .finish()
    }
}

/// A successful lookup.
#[derive(Debug)]
pub struct RouteMatch<'a, H> {
    pub handler: &'a H,
    pub pattern: &'a RoutePattern,
    pub info: RouteInfo,
}

/// Immutable routing table.
pub struct Router<H> {
    entries: Vec<Entry<H>>,
}

impl<H> Router<H> {
    pub fn builder() -> RouterBuilder<H> {
        RouterBuilder::new()
    }

    /// Parse `url` and resolve it.
    pub fn resolve(&self, url: &str) -> Result<RouteMatch<'_, H>, NotFound> {
        self.resolve_route(Route::parse(url))
    }

    /// Resolve an already parsed route.
    pub fn resolve_route(&self, route: Route) -> Result<RouteMatch<'_, H>, NotFound> {
        let found = {
            let segments: Vec<Cow<'_, str>> = route.segments().map(decode_segment).collect();
            self.entries.iter().find_map(|entry| {
                entry
                    .pattern
                    .matches(segments.as_slice())
                    .map(|params| (entry, params))
            })
        };

        match found {
            Some((entry, params)) => {
                tracing::trace!(path = %route.path(), pattern = %entry.pattern, "Route matched");
                Ok(RouteMatch {
                    handler: &entry.handler,
                    pattern: &entry.pattern,
                    info: RouteInfo::new(route, params),
                })
            }
            None => {
                tracing::trace!(path = %route.path(), "No route matched");
                Err(NotFound { route })
            }
        }
    }

    /// Registered patterns in precedence order.
    pub fn patterns(&self) -> impl Iterator<Item = &RoutePattern> {
        self.entries.iter().map(|entry| &entry.pattern)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<H> fmt::Debug for Router<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.patterns().map(ToString::to_string))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router(patterns: &[&'static str]) -> Router<&'static str> {
        let mut builder = Router::builder();
        for pattern in patterns {
            builder.register(pattern, *pattern).unwrap();
        }
        builder.build()
    }

    #[test]
    fn test_dynamic_params_query_and_fragment() {
        let router = router(&["/", "/users/{id}/posts/{post}"]);
        let matched = router.resolve("/users/123/posts/11?sort=asc#top").unwrap();

        assert_eq!(*matched.handler, "/users/{id}/posts/{post}");
        assert_eq!(matched.info.dynamic_params()["id"], "123");
        assert_eq!(matched.info.dynamic_params()["post"], "11");
        assert_eq!(matched.info.query_params()["sort"], "asc");
        assert_eq!(matched.info.fragment(), Some("top"));
        assert_eq!(matched.info.params().len(), 3);
    }

    #[test]
    fn test_literal_beats_dynamic_regardless_of_order() {
        let dynamic_first = router(&["/users/{id}/posts/{post}", "/users/123/posts/11"]);
        let literal_first = router(&["/users/123/posts/11", "/users/{id}/posts/{post}"]);

        for router in [dynamic_first, literal_first] {
            let matched = router.resolve("/users/123/posts/11").unwrap();
            assert_eq!(*matched.handler, "/users/123/posts/11");
            assert!(matched.info.dynamic_params().is_empty());

            let matched = router.resolve("/users/9/posts/11").unwrap();
            assert_eq!(*matched.handler, "/users/{id}/posts/{post}");
        }
    }

    #[test]
    fn test_more_literals_win() {
        let router = router(&["/{a}/{b}", "/docs/{page}"]);
        assert_eq!(*router.resolve("/docs/intro").unwrap().handler, "/docs/{page}");
        assert_eq!(*router.resolve("/blog/intro").unwrap().handler, "/{a}/{b}");
    }

    #[test]
    fn test_equal_specificity_keeps_registration_order() {
        let a_first = router(&["/a/{x}", "/{y}/b"]);
        assert_eq!(*a_first.resolve("/a/b").unwrap().handler, "/a/{x}");

        let b_first = router(&["/{y}/b", "/a/{x}"]);
        assert_eq!(*b_first.resolve("/a/b").unwrap().handler, "/{y}/b");
    }

    #[test]
    fn test_conflicting_shape_rejected() {
        let mut builder = Router::builder();
        builder.register("/users/{id}", 1).unwrap();

        let err = builder.register("/users/{name}/", 2).unwrap_err();
        assert_eq!(
            err,
            RouteError::Conflict {
                pattern: "/users/{name}".into(),
                existing: "/users/{id}".into(),
            }
        );
        assert!(builder.register("/about", 3).is_ok());
        assert!(builder.register("/about", 4).is_err());
        assert_eq!(builder.len(), 2);
    }

    #[test]
    fn test_unregistered_path_is_not_found() {
        let router = router(&["/about"]);
        let err = router.resolve("/missing?x=1#frag").unwrap_err();
        assert_eq!(err.route.path(), "/missing");
        assert_eq!(err.route.fragment(), Some("frag"));

        assert!(router.resolve("/").is_err());
        assert!(Router::<()>::builder().build().resolve("/").is_err());
    }

    #[test]
    fn test_trailing_slash_and_empty_segments() {
        let router = router(&["/about", "/users/{id}/edit"]);
        assert!(router.resolve("/about/").is_ok());
        assert!(router.resolve("about").is_ok());
        assert!(router.resolve("/users//edit").is_err());
    }

    #[test]
    fn test_segments_are_percent_decoded() {
        let router = router(&["/users/{name}", "/café"]);
        let matched = router.resolve("/users/john%20doe").unwrap();
        assert_eq!(matched.info.dynamic_params()["name"], "john doe");
        assert_eq!(matched.info.path(), "/users/john%20doe");

        assert_eq!(*router.resolve("/caf%C3%A9").unwrap().handler, "/café");

        let matched = router.resolve("/users/%E0%A4%A").unwrap();
        assert_eq!(matched.info.dynamic_params()["name"], "%E0%A4%A");
    }

    #[test]
    fn test_patterns_listed_in_precedence_order() {
        let router = router(&["/{page}", "/", "/docs/{page}", "/docs/api"]);
        let listed: Vec<_> = router.patterns().map(ToString::to_string).collect();
        assert_eq!(listed, vec!["/docs/api", "/docs/{page}", "/{page}", "/"]);
        assert_eq!(format!("{router:?}"), r#"["/docs/api", "/docs/{page}", "/{page}", "/"]"#);
    }
}
