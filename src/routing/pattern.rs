//! Route patterns such as `/users/{id}/posts/{post}`.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use percent_encoding::percent_decode_str;

use crate::routing::error::RouteError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Segment {
    Literal(String),
    Dynamic(String),
}

/// A compiled route pattern made of literal and `{name}` segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Parse a pattern. It must start with `/`; one trailing `/` is ignored.
    pub fn parse(pattern: &str) -> Result<Self, RouteError> {
        let invalid = |reason| RouteError::InvalidPattern {
            pattern: pattern.to_string(),
            reason,
        };

        let body = pattern
            .strip_prefix('/')
            .ok_or_else(|| invalid("must start with '/'"))?;
        let body = body.strip_suffix('/').unwrap_or(body);
        if body.is_empty() {
            return Ok(Self {
                segments: Vec::new(),
            });
        }

        let mut segments = Vec::new();
        let mut names = HashSet::new();
        for raw in body.split('/') {
            if raw.is_empty() {
                return Err(invalid("empty path segment"));
            }
            let segment = match raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some("") => return Err(invalid("empty parameter name")),
                Some(name) if name.contains(['{', '}']) => {
                    return Err(invalid("nested braces in parameter"));
                }
                Some(name) => {
                    if !names.insert(name) {
                        return Err(invalid("duplicate parameter name"));
                    }
                    Segment::Dynamic(name.to_string())
                }
                None if raw.contains(['{', '}']) => {
                    return Err(invalid("parameter braces must span a whole segment"));
                }
                None => Segment::Literal(raw.to_string()),
            };
            segments.push(segment);
        }

        Ok(Self { segments })
    }

    /// Number of literal segments. Higher wins when patterns overlap.
    pub fn specificity(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Literal(_)))
            .count()
    }

    /// Names of the dynamic segments, in path order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Dynamic(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Whether the pattern has no dynamic segments.
    pub fn is_static(&self) -> bool {
        self.param_names().next().is_none()
    }

    /// The pattern with parameter names erased. Two patterns with the same
    /// shape match exactly the same set of paths.
    pub(crate) fn shape(&self) -> Vec<Option<&str>> {
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Literal(text) => Some(text.as_str()),
                Segment::Dynamic(_) => None,
            })
            .collect()
    }

    /// Match decoded path segments, returning the bound parameters.
    ///
    /// Dynamic segments only match non-empty values.
    pub fn matches<S: AsRef<str>>(&self, segments: &[S]) -> Option<BTreeMap<String, String>> {
        if segments.len() != self.segments.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (pattern, value) in self.segments.iter().zip(segments) {
            let value = value.as_ref();
            match pattern {
                Segment::Literal(text) if text == value => {}
                Segment::Dynamic(name) if !value.is_empty() => {
                    params.insert(name.clone(), value.to_string());
                }
                _ => return None,
            }
        }
        Some(params)
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => write!(f, "/{text}")?,
                Segment::Dynamic(name) => write!(f, "/{{{name}}}")?,
            }
        }
        Ok(())
    }
}

/// Percent-decode one path segment. Segments that are not valid
/// percent-encoded UTF-8 are returned unchanged.
pub fn decode_segment(segment: &str) -> Cow<'_, str> {
    percent_decode_str(segment)
        .decode_utf8()
        .unwrap_or(Cow::Borrowed(segment))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(pattern: &str) -> &'static str {
        match RoutePattern::parse(pattern) {
            Err(RouteError::InvalidPattern { reason, .. }) => reason,
            other => panic!("expected invalid pattern, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_and_display() {
        let pattern = RoutePattern::parse("/users/{id}/posts/{post}/").unwrap();
        assert_eq!(pattern.to_string(), "/users/{id}/posts/{post}");
        assert_eq!(pattern.specificity(), 2);
        assert_eq!(pattern.param_names().collect::<Vec<_>>(), vec!["id", "post"]);
        assert!(!pattern.is_static());

        let root = RoutePattern::parse("/").unwrap();
        assert_eq!(root.to_string(), "/");
        assert!(root.is_static());
        assert_eq!(root.specificity(), 0);
    }

    #[test]
    fn test_invalid_patterns() {
        assert_eq!(reason("users"), "must start with '/'");
        assert_eq!(reason("/a//b"), "empty path segment");
        assert_eq!(reason("/a/{}"), "empty parameter name");
        assert_eq!(reason("/a/{id"), "parameter braces must span a whole segment");
        assert_eq!(reason("/a/x{id}"), "parameter braces must span a whole segment");
        assert_eq!(reason("/a/{{id}}"), "nested braces in parameter");
        assert_eq!(reason("/{id}/x/{id}"), "duplicate parameter name");
    }

    #[test]
    fn test_matches_binds_params() {
        let pattern = RoutePattern::parse("/users/{id}/posts/{post}").unwrap();
        let params = pattern.matches(&["users", "123", "posts", "11"]).unwrap();
        assert_eq!(params["id"], "123");
        assert_eq!(params["post"], "11");

        assert!(pattern.matches(&["users", "123", "comments", "11"]).is_none());
        assert!(pattern.matches(&["users", "123", "posts"]).is_none());
        assert!(pattern.matches(&["users", "", "posts", "11"]).is_none());
    }

    #[test]
    fn test_root_matches_only_empty() {
        let root = RoutePattern::parse("/").unwrap();
        assert!(root.matches::<&str>(&[]).is_some());
        assert!(root.matches(&["a"]).is_none());
    }

    #[test]
    fn test_shape_ignores_param_names() {
        let a = RoutePattern::parse("/users/{id}").unwrap();
        let b = RoutePattern::parse("/users/{name}").unwrap();
        let c = RoutePattern::parse("/users/me").unwrap();
        assert_eq!(a.shape(), b.shape());
        assert_ne!(a.shape(), c.shape());
    }

    #[test]
    fn test_decode_segment() {
        assert_eq!(decode_segment("john%20doe"), "john doe");
        assert_eq!(decode_segment("caf%C3%A9"), "café");
        assert_eq!(decode_segment("100%"), "100%");
        assert_eq!(decode_segment("%FF"), "%FF");
    }
}
