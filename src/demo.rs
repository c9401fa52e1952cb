//! Hello-world site served by `site-server`.

use std::sync::atomic::{AtomicU64, Ordering};

use axum::http::{Method, StatusCode};
use serde_json::json;

use crate::data::DataKey;
use crate::routing::RouteError;
use crate::site::{
    escape_html, ApiContext, ApiError, ApiResponse, InitApiContext, InitError, PageContext,
    SiteBuilder,
};

/// Greeting shown on the index page and returned by `/api/hello`.
pub struct Greeting;

impl DataKey for Greeting {
    type Value = String;

    fn name() -> &'static str {
        "greeting"
    }
}

/// Number of `/api/hello` calls served.
pub struct VisitCounter;

impl DataKey for VisitCounter {
    type Value = AtomicU64;

    fn name() -> &'static str {
        "visit-counter"
    }
}

/// Register every page, API route and init function of the demo site.
pub fn site() -> Result<SiteBuilder, RouteError> {
    let mut builder = SiteBuilder::new();
    builder
        .init("greeting", init_data)
        .page("/", index)?
        .page("/about", about)?
        .page("/users/{user}/posts/{post}", user_post)?
        .api("/hello", hello)?
        .api("/users/{id}", user)?;
    Ok(builder)
}

fn init_data(ctx: &InitApiContext<'_>) -> Result<(), InitError> {
    let title = ctx.config().site.title.trim();
    if title.is_empty() {
        return Err(InitError::new("site title must not be empty"));
    }
    ctx.data().set::<Greeting>(title.to_string());
    ctx.data().set::<VisitCounter>(AtomicU64::new(0));
    Ok(())
}

/// Wrap page content in the shared layout.
pub fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body>\n<h1>{title}</h1>\n{body}\n</body>\n</html>\n",
        title = escape_html(title),
    )
}

fn index(ctx: &PageContext<'_>) -> String {
    let greeting = ctx.data().get::<Greeting>();
    let greeting = greeting.as_deref().map_or("Hello World", String::as_str);
    layout(
        greeting,
        "<p>Welcome!</p>\n<p><a href=\"/about\">Go to About</a></p>",
    )
}

fn about(_: &PageContext<'_>) -> String {
    layout(
        "ABOUT",
        "<p>This is a skeleton app used to showcase a basic site.</p>\n\
         <p><a href=\"/\">Go Home</a></p>",
    )
}

fn user_post(ctx: &PageContext<'_>) -> String {
    let route = ctx.route();
    let user = escape_html(route.param("user").unwrap_or_default());
    let post = escape_html(route.param("post").unwrap_or_default());
    let sort = route
        .param("sort")
        .map(|sort| format!("\n<p>Sorted: {}</p>", escape_html(sort)))
        .unwrap_or_default();

    layout(
        &format!("Post {post}"),
        &format!("<p>User {user}, post {post}</p>{sort}"),
    )
}

fn hello(ctx: &ApiContext<'_>) -> Result<ApiResponse, ApiError> {
    let greeting = ctx.data().get_value::<Greeting>()?;
    let counter = ctx.data().get_value::<VisitCounter>()?;

    // Static export renders every route once; those hits are not visits.
    let visits = if ctx.route().is_exporting() {
        counter.load(Ordering::Relaxed)
    } else {
        counter.fetch_add(1, Ordering::Relaxed) + 1
    };
    let name = ctx.route().param("name").unwrap_or("world");

    ApiResponse::ok(&json!({
        "site": greeting.as_str(),
        "message": format!("Hello, {name}!"),
        "visits": visits,
    }))
}

fn user(ctx: &ApiContext<'_>) -> Result<ApiResponse, ApiError> {
    let route = ctx.route();
    let method = ctx.method();

    if method == Method::GET {
        ApiResponse::ok(route)
    } else if method == Method::POST {
        let body: serde_json::Value = ctx.json()?;
        let id = route.param("id").unwrap_or_default();
        ApiResponse::json(StatusCode::CREATED, &json!({ "id": id, "received": body }))
    } else {
        Err(ApiError::MethodNotAllowed(method.clone()))
    }
}
