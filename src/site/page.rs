//! Page handlers.

use crate::data::Data;
use crate::routing::RouteInfo;

/// Context handed to a page while it renders.
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    route: &'a RouteInfo,
    data: &'a Data,
}

impl<'a> PageContext<'a> {
    pub fn new(route: &'a RouteInfo, data: &'a Data) -> Self {
        Self { route, data }
    }

    /// The resolved route of the page being rendered.
    pub fn route(&self) -> &'a RouteInfo {
        self.route
    }

    /// Values stored by init functions.
    pub fn data(&self) -> &'a Data {
        self.data
    }
}

/// A page registered under a route pattern.
pub trait Page: Send + Sync {
    /// Render the page body as HTML.
    fn render(&self, ctx: &PageContext<'_>) -> String;
}

impl<F> Page for F
where
    F: Fn(&PageContext<'_>) -> String + Send + Sync,
{
    fn render(&self, ctx: &PageContext<'_>) -> String {
        self(ctx)
    }
}

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
