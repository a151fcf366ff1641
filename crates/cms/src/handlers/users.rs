//! Sign-in, sign-out, and account registration endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Form,
};
use serde::Deserialize;

use crate::auth::{redirect, sign_in_and_redirect, SignedIn, SIGNIN_PATH};
use crate::credentials::{CredentialError, CredentialStore};
use crate::html;
use crate::session::Session;
use crate::AppState;

use super::{internal_error, page};

/// GET /users/signin - Show the sign-in form
pub async fn signin_form(mut session: Session) -> Response {
    if session.is_signed_in() {
        session.flash("You are already signed in.");
        return (session, redirect("/")).into_response();
    }

    let view = page(&mut session, "Sign In", &html::signin_body(""));
    (session, view).into_response()
}

#[derive(Debug, Deserialize)]
pub struct SigninForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// POST /users/signin - Check credentials and start a signed-in session
pub async fn signin(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<SigninForm>,
) -> Response {
    let username = form.username.clone();
    let verified =
        with_credentials(&state, move |store| store.verify(&form.username, &form.password)).await;

    match verified {
        Ok(true) => sign_in_and_redirect(session, &username),
        Ok(false) => {
            tracing::warn!("Failed sign-in attempt for {:?}", username);
            session.flash("Invalid Credentials");
            let view = page(&mut session, "Sign In", &html::signin_body(&username));
            (StatusCode::UNPROCESSABLE_ENTITY, session, view).into_response()
        }
        Err(e) => internal_error("Failed to verify credentials", e),
    }
}

/// POST /users/signout - End the signed-in session
pub async fn signout(SignedIn { username, mut session }: SignedIn) -> Response {
    session.sign_out();
    session.flash("You have been signed out.");

    tracing::info!("User {} signed out", username);
    (session, redirect(SIGNIN_PATH)).into_response()
}

/// GET /users/new - Show the registration form
pub async fn signup_form(mut session: Session) -> Response {
    let view = page(&mut session, "Create an Account", &html::create_account_body(""));
    (session, view).into_response()
}

#[derive(Debug, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

/// POST /users/new - Register an account and sign it in
pub async fn signup(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<SignupForm>,
) -> Response {
    let username = form.username.clone();

    let rejection = if form.password1 != form.password2 {
        Some("Passwords do not match. Try again.")
    } else if username.trim().is_empty() {
        Some("A username is required.")
    } else {
        None
    };

    if let Some(message) = rejection {
        session.flash(message);
        let view = page(&mut session, "Create an Account", &html::create_account_body(&username));
        return (StatusCode::UNPROCESSABLE_ENTITY, session, view).into_response();
    }

    let registered =
        with_credentials(&state, move |store| store.register(&form.username, &form.password1))
            .await;

    match registered {
        Ok(()) => sign_in_and_redirect(session, &username),
        Err(CredentialError::Conflict { .. }) => {
            session.flash("That username already exists. Try again.");
            let view = page(&mut session, "Create an Account", &html::create_account_body(&username));
            (StatusCode::UNPROCESSABLE_ENTITY, session, view).into_response()
        }
        Err(e) => internal_error("Failed to register account", e),
    }
}

/// Run a credential store operation on the blocking pool (Argon2 is CPU-bound).
async fn with_credentials<T, F>(state: &AppState, op: F) -> Result<T, CredentialError>
where
    T: Send + 'static,
    F: FnOnce(&CredentialStore) -> Result<T, CredentialError> + Send + 'static,
{
    let store = Arc::clone(&state.credentials);
    tokio::task::spawn_blocking(move || op(&store))
        .await
        .map_err(|e| CredentialError::Io(std::io::Error::other(e)))?
}
