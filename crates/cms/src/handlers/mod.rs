//! HTTP handlers.

pub mod documents;
pub mod users;

use std::fmt::Display;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::html;
use crate::session::Session;

/// Render a full page, consuming the pending flash message.
fn page(session: &mut Session, title: &str, body: &str) -> Html<String> {
    let flash = session.take_flash();
    Html(html::layout(title, flash.as_deref(), body))
}

/// Log an unexpected storage failure and answer with a bare 500.
fn internal_error(context: &str, error: impl Display) -> Response {
    tracing::error!("{}: {}", context, error);
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}
