//! Filesystem storage implementation.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rand::Rng;
use tokio::fs;

use super::traits::{DocumentError, DocumentStore, UpdateOutcome};

/// Filesystem document store.
///
/// Every regular file directly inside `data_path` is a document.
pub struct FileStore {
    data_path: PathBuf,
}

impl FileStore {
    /// Create a new FileStore for the given directory.
    pub fn new(data_path: PathBuf) -> Self {
        Self { data_path }
    }

    /// Convert a document name to a filesystem path.
    ///
    /// Rejects names that are empty or that could resolve outside the
    /// document directory.
    fn name_to_path(&self, name: &str) -> Result<PathBuf, DocumentError> {
        let invalid = name.trim().is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\', '\0']);

        if invalid {
            return Err(DocumentError::InvalidName {
                name: name.to_string(),
            });
        }

        Ok(self.data_path.join(name))
    }

    /// Generate a random hex string for temp file names.
    fn random_hex() -> String {
        let bytes: [u8; 16] = rand::rng().random();
        hex::encode(bytes)
    }

    /// Atomic write using temp file + rename.
    async fn atomic_write(path: &Path, content: &[u8]) -> Result<(), std::io::Error> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let temp_path = path.with_file_name(format!(".{}.{}.tmp", file_name, Self::random_hex()));

        if let Err(e) = fs::write(&temp_path, content).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }

        if let Err(e) = fs::rename(&temp_path, path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }

        Ok(())
    }

    fn not_found(name: &str) -> DocumentError {
        DocumentError::NotFound {
            name: name.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl DocumentStore for FileStore {
    async fn list(&self) -> Result<Vec<String>, DocumentError> {
        let mut entries = match fs::read_dir(&self.data_path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();

            // Skip hidden files (including in-flight temp files)
            if file_name.starts_with('.') {
                continue;
            }

            if entry.file_type().await?.is_file() {
                names.push(file_name.into_owned());
            }
        }

        Ok(names)
    }

    async fn exists(&self, name: &str) -> Result<bool, DocumentError> {
        let path = match self.name_to_path(name) {
            Ok(path) => path,
            Err(DocumentError::InvalidName { .. }) => return Ok(false),
            Err(e) => return Err(e),
        };
        Ok(fs::try_exists(&path).await?)
    }

    async fn read(&self, name: &str) -> Result<Vec<u8>, DocumentError> {
        let path = self.name_to_path(name)?;

        fs::read(&path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                Self::not_found(name)
            } else {
                DocumentError::from(e)
            }
        })
    }

    async fn create(&self, name: &str, content: &[u8]) -> Result<(), DocumentError> {
        let path = self.name_to_path(name)?;

        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(DocumentError::AlreadyExists {
                    name: name.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        if !content.is_empty() {
            use tokio::io::AsyncWriteExt;
            file.write_all(content).await?;
            file.flush().await?;
        }

        tracing::info!("Created document {}", name);
        Ok(())
    }

    async fn update(&self, name: &str, content: &[u8]) -> Result<UpdateOutcome, DocumentError> {
        let path = self.name_to_path(name)?;

        let metadata = fs::metadata(&path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                Self::not_found(name)
            } else {
                DocumentError::from(e)
            }
        })?;

        if metadata.permissions().readonly() {
            return Err(DocumentError::Unwritable {
                name: name.to_string(),
            });
        }

        let current = fs::read(&path).await?;
        if current == content {
            return Ok(UpdateOutcome::Unchanged);
        }

        Self::atomic_write(&path, content).await.map_err(|e| {
            if e.kind() == ErrorKind::PermissionDenied {
                DocumentError::Unwritable {
                    name: name.to_string(),
                }
            } else {
                DocumentError::from(e)
            }
        })?;

        tracing::info!("Updated document {} ({} bytes)", name, content.len());
        Ok(UpdateOutcome::Updated)
    }

    async fn delete(&self, name: &str) -> Result<(), DocumentError> {
        let path = self.name_to_path(name)?;

        fs::remove_file(&path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                Self::not_found(name)
            } else {
                DocumentError::from(e)
            }
        })?;

        tracing::info!("Deleted document {}", name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, FileStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().to_path_buf());
        (temp_dir, store)
    }

    #[tokio::test]
    async fn test_exists_returns_false_for_nonexistent() {
        let (_temp, store) = create_test_store();
        assert!(!store.exists("nonexistent.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_and_read() {
        let (temp, store) = create_test_store();

        store.create("notes.md", b"# Notes").await.unwrap();

        assert!(temp.path().join("notes.md").exists());
        assert_eq!(store.read("notes.md").await.unwrap(), b"# Notes");
    }

    #[tokio::test]
    async fn test_create_defaults_to_empty_file() {
        let (_temp, store) = create_test_store();

        store.create("empty.txt", b"").await.unwrap();

        assert!(store.exists("empty.txt").await.unwrap());
        assert!(store.read("empty.txt").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_existing_fails() {
        let (_temp, store) = create_test_store();

        store.create("about.md", b"original").await.unwrap();
        let result = store.create("about.md", b"replacement").await;

        assert!(matches!(result, Err(DocumentError::AlreadyExists { .. })));
        assert_eq!(store.read("about.md").await.unwrap(), b"original");
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_names() {
        let (_temp, store) = create_test_store();

        for name in ["", "   ", ".", "..", "../escape.txt", "nested/file.md"] {
            let result = store.create(name, b"").await;
            assert!(
                matches!(result, Err(DocumentError::InvalidName { .. })),
                "expected InvalidName for {:?}",
                name
            );
        }
    }

    #[tokio::test]
    async fn test_read_nonexistent_returns_not_found() {
        let (_temp, store) = create_test_store();

        let result = store.read("missing.txt").await;
        assert!(matches!(result, Err(DocumentError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_replaces_content() {
        let (_temp, store) = create_test_store();
        store.create("test.txt", b"1234").await.unwrap();

        let outcome = store.update("test.txt", b"5678").await.unwrap();

        assert_eq!(outcome, UpdateOutcome::Updated);
        assert_eq!(store.read("test.txt").await.unwrap(), b"5678");
    }

    #[tokio::test]
    async fn test_update_identical_content_is_unchanged() {
        let (temp, store) = create_test_store();
        store.create("same.txt", b"content").await.unwrap();
        let path = temp.path().join("same.txt");
        let before = std::fs::metadata(&path).unwrap().modified().unwrap();

        let outcome = store.update("same.txt", b"content").await.unwrap();

        assert_eq!(outcome, UpdateOutcome::Unchanged);
        let after = std::fs::metadata(&path).unwrap().modified().unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_update_nonexistent_returns_not_found() {
        let (temp, store) = create_test_store();

        let result = store.update("ghost.txt", b"boo").await;

        assert!(matches!(result, Err(DocumentError::NotFound { .. })));
        assert!(!temp.path().join("ghost.txt").exists());
    }

    #[tokio::test]
    async fn test_update_readonly_is_unwritable() {
        let (temp, store) = create_test_store();
        store.create("locked.txt", b"old").await.unwrap();
        let path = temp.path().join("locked.txt");
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_readonly(true);
        std::fs::set_permissions(&path, perms).unwrap();

        let result = store.update("locked.txt", b"new").await;

        assert!(matches!(result, Err(DocumentError::Unwritable { .. })));
        assert_eq!(std::fs::read(&path).unwrap(), b"old");
    }

    #[tokio::test]
    async fn test_delete_then_read_is_not_found() {
        let (_temp, store) = create_test_store();
        store.create("to-delete.txt", b"bye").await.unwrap();

        store.delete("to-delete.txt").await.unwrap();

        assert!(!store.exists("to-delete.txt").await.unwrap());
        let result = store.read("to-delete.txt").await;
        assert!(matches!(result, Err(DocumentError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_nonexistent_returns_not_found() {
        let (_temp, store) = create_test_store();

        let result = store.delete("nonexistent.txt").await;
        assert!(matches!(result, Err(DocumentError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_list() {
        let (temp, store) = create_test_store();
        store.create("about.md", b"").await.unwrap();
        store.create("changes.txt", b"").await.unwrap();
        std::fs::create_dir(temp.path().join("subdir")).unwrap();
        std::fs::write(temp.path().join(".hidden"), "x").unwrap();

        let mut names = store.list().await.unwrap();
        names.sort();

        assert_eq!(names, vec!["about.md", "changes.txt"]);
    }

    #[tokio::test]
    async fn test_list_missing_directory_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path().join("does-not-exist"));

        assert!(store.list().await.unwrap().is_empty());
    }
}
