//! Document listing, viewing, and editing endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Form,
};
use serde::Deserialize;

use crate::auth::{redirect, SignedIn};
use crate::documents::{DocumentError, DocumentKind, UpdateOutcome};
use crate::html;
use crate::session::Session;
use crate::AppState;

use super::{internal_error, page};

/// GET / - List documents
pub async fn index(State(state): State<AppState>, mut session: Session) -> Response {
    let mut names = match state.documents.list().await {
        Ok(names) => names,
        Err(e) => return internal_error("Failed to list documents", e),
    };
    names.sort();

    let body = html::index_body(&names, session.username());
    let view = page(&mut session, "Documents", &body);
    (session, view).into_response()
}

/// GET /new - Show the new document form
pub async fn new_form(SignedIn { mut session, .. }: SignedIn) -> Response {
    let view = page(&mut session, "New Document", &html::new_document_body(""));
    (session, view).into_response()
}

#[derive(Debug, Deserialize)]
pub struct NewDocumentForm {
    #[serde(default)]
    pub new_name: String,
}

/// POST /new - Create an empty document
pub async fn create(
    State(state): State<AppState>,
    SignedIn { mut session, .. }: SignedIn,
    Form(form): Form<NewDocumentForm>,
) -> Response {
    let name = form.new_name;

    if name.trim().is_empty() {
        session.flash("A name is required.");
        let view = page(&mut session, "New Document", &html::new_document_body(&name));
        return (StatusCode::UNPROCESSABLE_ENTITY, session, view).into_response();
    }

    match state.documents.create(&name, b"").await {
        Ok(()) => {
            session.flash(format!("{} was created.", name));
            (session, redirect("/")).into_response()
        }
        Err(DocumentError::AlreadyExists { .. }) => {
            session.flash(format!("{} already exists.", name));
            let view = page(&mut session, "New Document", &html::new_document_body(&name));
            (session, view).into_response()
        }
        Err(DocumentError::InvalidName { .. }) => {
            session.flash(format!("{} is not a valid name.", name));
            let view = page(&mut session, "New Document", &html::new_document_body(&name));
            (StatusCode::UNPROCESSABLE_ENTITY, session, view).into_response()
        }
        Err(e) => internal_error("Failed to create document", e),
    }
}

/// GET /{filename} - Render a document
pub async fn show(
    State(state): State<AppState>,
    SignedIn { mut session, .. }: SignedIn,
    Path(filename): Path<String>,
) -> Response {
    match state.documents.read(&filename).await {
        Ok(content) => {
            let rendered = DocumentKind::from_name(&filename).render(&content);
            let view = page(&mut session, &filename, &html::document_body(&rendered));
            (session, view).into_response()
        }
        Err(DocumentError::NotFound { .. } | DocumentError::InvalidName { .. }) => {
            does_not_exist(session, &filename)
        }
        Err(e) => internal_error("Failed to read document", e),
    }
}

/// GET /{filename}/edit - Show the edit form
pub async fn edit_form(
    State(state): State<AppState>,
    SignedIn { mut session, .. }: SignedIn,
    Path(filename): Path<String>,
) -> Response {
    match state.documents.read(&filename).await {
        Ok(content) => {
            let contents = String::from_utf8_lossy(&content);
            let title = format!("Edit {}", filename);
            let view = page(&mut session, &title, &html::edit_body(&filename, &contents));
            (session, view).into_response()
        }
        Err(DocumentError::NotFound { .. } | DocumentError::InvalidName { .. }) => {
            does_not_exist(session, &filename)
        }
        Err(e) => internal_error("Failed to read document", e),
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateForm {
    #[serde(default)]
    pub new_contents: String,
}

/// POST /{filename} - Replace a document's content
pub async fn update(
    State(state): State<AppState>,
    SignedIn { mut session, .. }: SignedIn,
    Path(filename): Path<String>,
    Form(form): Form<UpdateForm>,
) -> Response {
    let message = match state
        .documents
        .update(&filename, form.new_contents.as_bytes())
        .await
    {
        Ok(UpdateOutcome::Updated) => format!("{} has been updated.", filename),
        Ok(UpdateOutcome::Unchanged) => format!("No changes made to {}.", filename),
        Err(DocumentError::Unwritable { .. }) => {
            tracing::warn!("Document {} is not writable", filename);
            format!("Unable to save {}.", filename)
        }
        Err(DocumentError::NotFound { .. } | DocumentError::InvalidName { .. }) => {
            format!("{} does not exist.", filename)
        }
        Err(e) => return internal_error("Failed to update document", e),
    };

    session.flash(message);
    (session, redirect("/")).into_response()
}

/// POST /{filename}/delete - Delete a document
pub async fn delete(
    State(state): State<AppState>,
    SignedIn { mut session, .. }: SignedIn,
    Path(filename): Path<String>,
) -> Response {
    let message = match state.documents.delete(&filename).await {
        Ok(()) => format!("{} was deleted.", filename),
        Err(DocumentError::NotFound { .. } | DocumentError::InvalidName { .. }) => {
            format!("{} does not exist.", filename)
        }
        Err(e) => return internal_error("Failed to delete document", e),
    };

    session.flash(message);
    (session, redirect("/")).into_response()
}

fn does_not_exist(mut session: Session, filename: &str) -> Response {
    session.flash(format!("{} does not exist.", filename));
    (session, redirect("/")).into_response()
}
