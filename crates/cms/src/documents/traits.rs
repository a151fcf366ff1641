//! Storage trait definition and error types.

use thiserror::Error;

/// Errors that can occur during document operations.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The requested document was not found
    #[error("{name} does not exist")]
    NotFound { name: String },
    /// A document with this name already exists (for create operations)
    #[error("{name} already exists")]
    AlreadyExists { name: String },
    /// The name is empty or would leave the document directory
    #[error("invalid document name '{name}'")]
    InvalidName { name: String },
    /// The document exists but may not be written
    #[error("{name} is not writable")]
    Unwritable { name: String },
    /// I/O error during storage operation
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of an update that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// New content was written
    Updated,
    /// Content was byte-for-byte identical; nothing was written
    Unchanged,
}

/// Abstract storage backend for documents.
///
/// Names are bare file names. Ordering of [`DocumentStore::list`] is
/// backend-defined; callers that need a stable order sort the result.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// List the names of all documents.
    async fn list(&self) -> Result<Vec<String>, DocumentError>;

    /// Check if a document exists.
    async fn exists(&self, name: &str) -> Result<bool, DocumentError>;

    /// Read a document's full content.
    async fn read(&self, name: &str) -> Result<Vec<u8>, DocumentError>;

    /// Create a new document.
    ///
    /// Fails with `AlreadyExists` rather than overwriting.
    async fn create(&self, name: &str, content: &[u8]) -> Result<(), DocumentError>;

    /// Replace a document's content.
    ///
    /// Returns `Unchanged` without touching the file when `content` matches
    /// what is already stored.
    async fn update(&self, name: &str, content: &[u8]) -> Result<UpdateOutcome, DocumentError>;

    /// Delete a document.
    async fn delete(&self, name: &str) -> Result<(), DocumentError>;
}
