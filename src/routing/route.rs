//! Parsed URL: path, query parameters and fragment.
//!
//! # Responsibilities
//! - Split a raw URL into path, query and fragment
//! - Decode query parameters
//! - Serialize back into an equivalent URL
//!
//! # Design Decisions
//! - Fragment is split off first, then the query, so `?` inside a fragment
//!   stays in the fragment
//! - Duplicate query keys: last occurrence wins
//! - Query decoding is `application/x-www-form-urlencoded` (`+` is a space)
//! - Malformed input is passed through raw, per key or value: a `%` without
//!   two hex digits stays literal, and a component whose escapes decode to
//!   invalid UTF-8 is kept as written. Path segments follow the same rule.
//! - `path` is stored in URL form; `Route::new` encodes `?`, `#` and `%`
//!   so `to_url` always re-parses to the same route

use std::collections::BTreeMap;
use std::fmt;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use serde::Serialize;
use url::form_urlencoded;

/// Bytes escaped when a decoded path is turned into URL form. `/` is kept.
const PATH_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Decoded query parameters, ordered by key.
pub type QueryParams = BTreeMap<String, String>;

/// A parsed URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Route {
    path: String,
    query_params: QueryParams,
    fragment: Option<String>,
}

impl Route {
    /// Create a route from already-decoded parts.
    ///
    /// The path is normalized to start with `/` and percent-encoded, so
    /// `Route::new("/a?b", ..)` names the single segment `a?b`.
    pub fn new(path: &str, query_params: QueryParams, fragment: Option<String>) -> Self {
        let encoded = utf8_percent_encode(path, PATH_ENCODE_SET).to_string();
        Self::from_url_parts(&encoded, query_params, fragment)
    }

    /// Create a route whose path is already in URL form.
    pub(crate) fn from_url_parts(
        path: &str,
        query_params: QueryParams,
        fragment: Option<String>,
    ) -> Self {
        Self {
            path: normalize_path(path),
            query_params,
            fragment,
        }
    }

    /// Parse a URL such as `/users/1?tab=posts#top`.
    ///
    /// Absolute URLs are accepted; their scheme and authority are ignored.
    pub fn parse(url: &str) -> Self {
        let url = strip_origin(url);

        let (rest, fragment) = match url.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment.to_string())),
            None => (url, None),
        };
        let (path, query_params) = match rest.split_once('?') {
            Some((path, query)) => (path, parse_query(query)),
            None => (rest, QueryParams::new()),
        };

        Self {
            path: normalize_path(path),
            query_params,
            fragment,
        }
    }

    /// The path, always starting with `/`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Decoded query parameters.
    pub fn query_params(&self) -> &QueryParams {
        &self.query_params
    }

    /// Text after the first `#`, if any.
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Path segments, ignoring leading and trailing slashes.
    ///
    /// Interior empty segments (`/a//b`) are preserved.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        let trimmed = self.path.trim_matches('/');
        (!trimmed.is_empty())
            .then(|| trimmed.split('/'))
            .into_iter()
            .flatten()
    }

    /// Text after the last `/` of the path.
    ///
    /// Empty for `/` and for paths ending in a slash.
    pub fn slug(&self) -> &str {
        self.path
            .rsplit_once('/')
            .map_or(self.path.as_str(), |(_, slug)| slug)
    }

    /// Serialize back into a URL. Query keys are emitted in sorted order.
    pub fn to_url(&self) -> String {
        let mut url = self.path.clone();
        if !self.query_params.is_empty() {
            url.push('?');
            url.push_str(&encode_query(&self.query_params));
        }
        if let Some(fragment) = &self.fragment {
            url.push('#');
            url.push_str(fragment);
        }
        url
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_url())
    }
}

impl From<&str> for Route {
    fn from(url: &str) -> Self {
        Self::parse(url)
    }
}

/// Decode a query string (without the leading `?`).
pub fn parse_query(query: &str) -> QueryParams {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

/// Form-decode one key or value, keeping the raw text when it does not
/// decode to UTF-8.
fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match percent_decode_str(&spaced).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}

/// Encode query parameters (without the leading `?`).
pub fn encode_query(params: &QueryParams) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish()
}

fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

fn strip_origin(url: &str) -> &str {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url;
    };
    let is_scheme = scheme
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if scheme.is_empty() || !is_scheme {
        return url;
    }
    match rest.find(['/', '?', '#']) {
        Some(start) => &rest[start..],
        None => "",
    }
}
