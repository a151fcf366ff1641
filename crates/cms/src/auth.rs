//! Sign-in gate.
//!
//! Handlers that require a signed-in user take [`SignedIn`] instead of a
//! plain [`Session`]. When nobody is signed in the extractor rejects before
//! the handler body runs: it remembers the requested path, sets a flash
//! message, and redirects to the sign-in form.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::session::Session;
use crate::AppState;

pub const SIGNIN_PATH: &str = "/users/signin";

/// A session with a signed-in user.
pub struct SignedIn {
    pub username: String,
    pub session: Session,
}

impl FromRequestParts<AppState> for SignedIn {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Ok(mut session) = Session::from_request_parts(parts, state).await;

        if let Some(username) = session.username().map(str::to_string) {
            return Ok(Self { username, session });
        }

        let path = parts.uri.path().to_string();
        tracing::debug!("Rejected signed-out request to {}", path);

        session.flash("You must be signed in to do that.");
        session.set_return_to(path);
        Err((session, redirect(SIGNIN_PATH)).into_response())
    }
}

/// Mark the session signed in and send the user where they were headed.
pub fn sign_in_and_redirect(mut session: Session, username: &str) -> Response {
    session.sign_in(username);
    session.flash("Welcome!");
    let target = session.take_return_to().unwrap_or_else(|| "/".to_string());

    tracing::info!("User {} signed in", username);
    (session, redirect(&target)).into_response()
}

/// `302 Found` redirect.
pub fn redirect(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}
