//! Flat-file document CMS
//!
//! Signed-in users create, edit, view, and delete documents stored as plain
//! files in one directory. Accounts live in a YAML credential file with
//! Argon2 password hashes; sign-in state rides in a signed session cookie.

pub mod auth;
pub mod config;
pub mod credentials;
pub mod documents;
pub mod handlers;
pub mod html;
pub mod session;

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use axum::{
    extract::FromRef,
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::Key;
use tower_http::trace::TraceLayer;

pub use crate::config::Config;
use crate::credentials::CredentialStore;
use crate::documents::{DocumentStore, FileStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub documents: Arc<dyn DocumentStore>,
    pub credentials: Arc<CredentialStore>,
    key: Key,
}

impl AppState {
    /// Build state from config, creating the document directory if needed.
    pub fn new(config: Config) -> Result<Self> {
        std::fs::create_dir_all(&config.data_path).with_context(|| {
            format!("Failed to create data directory: {:?}", config.data_path)
        })?;

        let key = match config.cookie_secret_bytes()? {
            Some(bytes) => Key::try_from(bytes.as_slice())
                .map_err(|e| anyhow!("cookie_secret must be at least 64 bytes: {:?}", e))?,
            None => {
                tracing::warn!("No cookie_secret configured, sessions won't survive restarts");
                Key::generate()
            }
        };

        let documents = Arc::new(FileStore::new(config.data_path.clone()));
        let credentials = Arc::new(CredentialStore::new(config.credential_path.clone()));

        Ok(Self {
            config: Arc::new(config),
            documents,
            credentials,
            key,
        })
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.key.clone()
    }
}

/// Build the router for the full HTTP surface.
pub fn app(state: AppState) -> Router {
    use handlers::{documents, users};

    Router::new()
        .route("/", get(documents::index))
        // Accounts
        .route("/users/signin", get(users::signin_form).post(users::signin))
        .route("/users/signout", post(users::signout))
        .route("/users/new", get(users::signup_form).post(users::signup))
        // Documents
        .route("/new", get(documents::new_form).post(documents::create))
        .route("/{filename}", get(documents::show).post(documents::update))
        .route("/{filename}/edit", get(documents::edit_form))
        .route("/{filename}/delete", post(documents::delete))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
