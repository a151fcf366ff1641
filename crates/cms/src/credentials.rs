//! Persistent credential store: username -> Argon2 password hash.
//!
//! The whole mapping lives in one YAML file. Reads go straight to disk so
//! external edits are picked up; registrations serialize through a mutex and
//! replace the file atomically, so concurrent sign-ups cannot drop each other.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::Rng;
use thiserror::Error;

/// Username -> PHC-encoded password hash.
pub type Credentials = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("user {username} already exists")]
    Conflict { username: String },
    #[error("failed to access credential file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse credential file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("password hashing failed: {0}")]
    Hash(String),
}

pub struct CredentialStore {
    path: PathBuf,
    /// Held across read-modify-write of the file
    write_lock: Mutex<()>,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    /// Load the full mapping. A missing file is an empty store.
    pub fn load(&self) -> Result<Credentials, CredentialError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Credentials::new()),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(Credentials::new());
        }

        Ok(serde_yaml::from_str(&content)?)
    }

    pub fn user_exists(&self, username: &str) -> Result<bool, CredentialError> {
        Ok(self.load()?.contains_key(username))
    }

    /// Check a sign-in attempt. Unknown users and malformed hashes are `false`.
    pub fn verify(&self, username: &str, password: &str) -> Result<bool, CredentialError> {
        let credentials = self.load()?;
        let Some(stored) = credentials.get(username) else {
            return Ok(false);
        };

        let parsed = match PasswordHash::new(stored) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Stored hash for {} is malformed: {}", username, e);
                return Ok(false);
            }
        };

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// Add a new account and persist the mapping immediately.
    pub fn register(&self, username: &str, password: &str) -> Result<(), CredentialError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut credentials = self.load()?;
        if credentials.contains_key(username) {
            return Err(CredentialError::Conflict {
                username: username.to_string(),
            });
        }

        credentials.insert(username.to_string(), hash_password(password)?);
        self.save(&credentials)?;

        tracing::info!("Registered user {}", username);
        Ok(())
    }

    fn save(&self, credentials: &Credentials) -> Result<(), CredentialError> {
        let content = serde_yaml::to_string(credentials)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.path.with_extension(format!("{}.tmp", random_hex()));
        if let Err(e) = std::fs::write(&temp_path, content) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(e.into());
        }
        if let Err(e) = std::fs::rename(&temp_path, &self.path) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(e.into());
        }

        Ok(())
    }
}

/// Hash a password with Argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    let salt_bytes: [u8; 16] = rand::rng().random();
    let salt =
        SaltString::encode_b64(&salt_bytes).map_err(|e| CredentialError::Hash(e.to_string()))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CredentialError::Hash(e.to_string()))
}

fn random_hex() -> String {
    let bytes: [u8; 8] = rand::rng().random();
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, CredentialStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = CredentialStore::new(temp_dir.path().join("users.yaml"));
        (temp_dir, store)
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let (_temp, store) = create_test_store();
        assert!(store.load().unwrap().is_empty());
        assert!(!store.user_exists("admin").unwrap());
    }

    #[test]
    fn test_register_then_verify() {
        let (temp, store) = create_test_store();

        store.register("admin", "secret").unwrap();

        assert!(temp.path().join("users.yaml").exists());
        assert!(store.user_exists("admin").unwrap());
        assert!(store.verify("admin", "secret").unwrap());
        assert!(!store.verify("admin", "Secret").unwrap());
        assert!(!store.verify("admin", "").unwrap());
    }

    #[test]
    fn test_verify_unknown_user() {
        let (_temp, store) = create_test_store();
        store.register("admin", "secret").unwrap();

        assert!(!store.verify("nobody", "secret").unwrap());
    }

    #[test]
    fn test_hash_is_not_plaintext() {
        let (temp, store) = create_test_store();
        store.register("admin", "secret").unwrap();

        let raw = std::fs::read_to_string(temp.path().join("users.yaml")).unwrap();
        assert!(raw.contains("admin"));
        assert!(!raw.contains("secret"));
        assert!(store.load().unwrap()["admin"].starts_with("$argon2"));
    }

    #[test]
    fn test_register_duplicate_conflicts() {
        let (_temp, store) = create_test_store();
        store.register("admin", "first").unwrap();

        let result = store.register("admin", "second");

        assert!(matches!(result, Err(CredentialError::Conflict { .. })));
        assert!(store.verify("admin", "first").unwrap());
        assert!(!store.verify("admin", "second").unwrap());
    }

    #[test]
    fn test_malformed_hash_does_not_verify() {
        let (temp, store) = create_test_store();
        std::fs::write(temp.path().join("users.yaml"), "admin: not-a-hash\n").unwrap();

        assert!(store.user_exists("admin").unwrap());
        assert!(!store.verify("admin", "not-a-hash").unwrap());
    }

    #[test]
    fn test_unparseable_file_is_an_error() {
        let (temp, store) = create_test_store();
        std::fs::write(temp.path().join("users.yaml"), "- just\n- a list\n").unwrap();

        assert!(matches!(store.load(), Err(CredentialError::Parse(_))));
    }

    #[test]
    fn test_concurrent_registrations_are_all_kept() {
        let (_temp, store) = create_test_store();
        let store = Arc::new(store);

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.register(&format!("user{}", i), "pw").unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.load().unwrap().len(), 4);
    }
}
