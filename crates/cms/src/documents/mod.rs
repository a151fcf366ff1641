//! Document storage.
//!
//! Documents are flat files in a single directory, identified by file name.
//! The [`DocumentStore`] trait abstracts the backend; [`FileStore`] is the
//! filesystem implementation used by the server.

mod file;
mod kind;
mod traits;

pub use file::FileStore;
pub use kind::DocumentKind;
pub use traits::{DocumentError, DocumentStore, UpdateOutcome};
