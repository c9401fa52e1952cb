//! Resolved route information handed to pages and API handlers.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::routing::route::{QueryParams, Route};

/// Query parameter set by the static exporter while it renders pages.
pub const EXPORT_PARAM: &str = "_exporting";

/// A matched [`Route`] plus the parameters bound by its pattern.
///
/// `params` merges dynamic and query parameters. When both define the same
/// key the query parameter wins.
///
/// Equality and hashing only consider `path`, `params` and `fragment`.
#[derive(Debug, Clone)]
pub struct RouteInfo {
    route: Route,
    dynamic_params: BTreeMap<String, String>,
    params: BTreeMap<String, String>,
}

impl RouteInfo {
    pub fn new(route: Route, dynamic_params: BTreeMap<String, String>) -> Self {
        let mut params = dynamic_params.clone();
        params.extend(
            route
                .query_params()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        Self {
            route,
            dynamic_params,
            params,
        }
    }

    /// Last path segment. For `/a/b/c/slug?x=1` this is `slug`.
    pub fn slug(&self) -> &str {
        self.route.slug()
    }

    pub fn path(&self) -> &str {
        self.route.path()
    }

    /// Dynamic and query parameters combined.
    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Convenience lookup into [`params`](Self::params).
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn dynamic_params(&self) -> &BTreeMap<String, String> {
        &self.dynamic_params
    }

    pub fn query_params(&self) -> &QueryParams {
        self.route.query_params()
    }

    pub fn fragment(&self) -> Option<&str> {
        self.route.fragment()
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Whether the page is being rendered by the static exporter.
    ///
    /// Pages use this to skip side effects such as analytics.
    pub fn is_exporting(&self) -> bool {
        self.params.contains_key(EXPORT_PARAM)
    }

    /// Copy with a new decoded `path`, keeping query, fragment and dynamic params.
    pub fn with_path(&self, path: &str) -> Self {
        self.rebuild(Route::new(
            path,
            self.route.query_params().clone(),
            self.route.fragment().map(str::to_string),
        ))
    }

    pub fn with_query_params(&self, query_params: QueryParams) -> Self {
        self.rebuild(Route::from_url_parts(
            self.route.path(),
            query_params,
            self.route.fragment().map(str::to_string),
        ))
    }

    pub fn with_fragment(&self, fragment: Option<String>) -> Self {
        self.rebuild(Route::from_url_parts(
            self.route.path(),
            self.route.query_params().clone(),
            fragment,
        ))
    }

    pub fn with_dynamic_params(&self, dynamic_params: BTreeMap<String, String>) -> Self {
        Self::new(self.route.clone(), dynamic_params)
    }

    fn rebuild(&self, route: Route) -> Self {
        Self::new(route, self.dynamic_params.clone())
    }
}

impl PartialEq for RouteInfo {
    fn eq(&self, other: &Self) -> bool {
        self.path() == other.path()
            && self.params == other.params
            && self.fragment() == other.fragment()
    }
}

impl Eq for RouteInfo {}

impl Hash for RouteInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path().hash(state);
        self.params.hash(state);
        self.fragment().hash(state);
    }
}

impl fmt::Display for RouteInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.route, f)
    }
}

impl Serialize for RouteInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("RouteInfo", 6)?;
        state.serialize_field("path", self.path())?;
        state.serialize_field("slug", self.slug())?;
        state.serialize_field("params", &self.params)?;
        state.serialize_field("dynamic_params", &self.dynamic_params)?;
        state.serialize_field("query_params", self.query_params())?;
        state.serialize_field("fragment", &self.fragment())?;
        state.end()
    }
}
