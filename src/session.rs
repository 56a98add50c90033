// Session store: the signed-in user and bearer token, persisted in a durable key-value store

use crate::models::User;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";
pub const DEFAULT_STATE_FILE: &str = ".car_rental_session.json";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStorage + ?Sized> KeyValueStorage for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: DashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Key-value entries kept as one JSON object in a file. Every write rewrites
/// the whole file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Uses `CAR_RENTAL_STATE_FILE` when set, otherwise a file in the working directory.
    pub fn from_env() -> Self {
        let path = std::env::var("CAR_RENTAL_STATE_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_STATE_FILE));
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock();
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock();
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}

/// Token and user only ever exist together.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticated {
        user: User,
        token: String,
    },
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated { .. })
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated { user, .. } => Some(user),
            SessionState::Anonymous => None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            SessionState::Authenticated { token, .. } => Some(token),
            SessionState::Anonymous => None,
        }
    }
}

pub struct SessionStore {
    storage: Box<dyn KeyValueStorage>,
    state: RwLock<SessionState>,
}

impl SessionStore {
    /// Restore whatever session the storage holds. Missing, partial, or
    /// unreadable entries all start the store signed out.
    pub fn hydrate(storage: Box<dyn KeyValueStorage>) -> Self {
        let state = match Self::read_persisted(storage.as_ref()) {
            Ok(Some((user, token))) => {
                info!(user_id = user.user_id, "restored session");
                SessionState::Authenticated { user, token }
            }
            Ok(None) => SessionState::Anonymous,
            Err(e) => {
                warn!(error = %e, "could not restore session, starting signed out");
                SessionState::Anonymous
            }
        };

        Self {
            storage,
            state: RwLock::new(state),
        }
    }

    pub fn in_memory() -> Self {
        Self::hydrate(Box::new(MemoryStorage::new()))
    }

    fn read_persisted(
        storage: &dyn KeyValueStorage,
    ) -> Result<Option<(User, String)>, StorageError> {
        let user = storage.get(USER_KEY)?;
        let token = storage.get(TOKEN_KEY)?;

        match (user, token) {
            (Some(user), Some(token)) if !token.is_empty() => {
                let user: User = serde_json::from_str(&user)?;
                Ok(Some((user, token)))
            }
            (None, None) => Ok(None),
            _ => {
                debug!("ignoring half-written session");
                Ok(None)
            }
        }
    }

    pub fn login(&self, user: User, token: String) {
        if let Err(e) = self.persist(&user, &token) {
            warn!(error = %e, "session not persisted, it will not survive a restart");
        }

        info!(user_id = user.user_id, "signed in");
        *self.state.write() = SessionState::Authenticated { user, token };
    }

    fn persist(&self, user: &User, token: &str) -> Result<(), StorageError> {
        let user_json = serde_json::to_string(user)?;
        self.storage.set(TOKEN_KEY, token)?;
        self.storage.set(USER_KEY, &user_json)?;
        Ok(())
    }

    pub fn logout(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key) {
                warn!(key, error = %e, "could not clear stored session entry");
            }
        }

        let previous = std::mem::take(&mut *self.state.write());
        if let Some(user) = previous.user() {
            info!(user_id = user.user_id, "signed out");
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().is_authenticated()
    }

    pub fn user(&self) -> Option<User> {
        self.state.read().user().cloned()
    }

    pub fn token(&self) -> Option<String> {
        self.state.read().token().map(str::to_string)
    }

    pub fn state(&self) -> SessionState {
        self.state.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            user_id: 5,
            email: "ann@example.com".to_string(),
            username: "ann".to_string(),
            role: "customer".to_string(),
            status: "active".to_string(),
            created_at: None,
        }
    }

    struct BrokenStorage;

    impl KeyValueStorage for BrokenStorage {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into())
        }
        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into())
        }
        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into())
        }
    }

    #[test]
    fn test_login_persists_token_and_user() {
        let storage = Arc::new(MemoryStorage::new());
        let store = SessionStore::hydrate(Box::new(storage.clone()));
        assert!(!store.is_authenticated());

        store.login(user(), "abc".to_string());

        assert!(store.is_authenticated());
        assert_eq!(store.token().as_deref(), Some("abc"));
        assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("abc"));
        let stored: User = serde_json::from_str(&storage.get(USER_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(stored, user());
    }

    #[test]
    fn test_session_survives_reload() {
        let storage = Arc::new(MemoryStorage::new());
        SessionStore::hydrate(Box::new(storage.clone())).login(user(), "abc".to_string());

        let reloaded = SessionStore::hydrate(Box::new(storage));
        assert!(reloaded.is_authenticated());
        assert_eq!(reloaded.user(), Some(user()));
    }

    #[test]
    fn test_logout_is_idempotent() {
        let storage = Arc::new(MemoryStorage::new());
        let store = SessionStore::hydrate(Box::new(storage.clone()));
        store.login(user(), "abc".to_string());

        store.logout();
        let after_first = store.state();
        store.logout();

        assert_eq!(store.state(), after_first);
        assert_eq!(store.state(), SessionState::Anonymous);
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(storage.get(USER_KEY).unwrap(), None);
    }

    #[test]
    fn test_malformed_user_starts_signed_out() {
        let storage = MemoryStorage::new();
        storage.set(USER_KEY, "{not json").unwrap();
        storage.set(TOKEN_KEY, "abc").unwrap();

        let store = SessionStore::hydrate(Box::new(storage));
        assert!(!store.is_authenticated());
        assert_eq!(store.token(), None);
    }

    #[test]
    fn test_half_written_session_is_ignored() {
        let storage = MemoryStorage::new();
        storage.set(USER_KEY, &serde_json::to_string(&user()).unwrap()).unwrap();

        let store = SessionStore::hydrate(Box::new(storage));
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_broken_storage_degrades_without_failing() {
        let store = SessionStore::hydrate(Box::new(BrokenStorage));
        assert!(!store.is_authenticated());

        store.login(user(), "abc".to_string());
        assert!(store.is_authenticated());

        store.logout();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = SessionStore::hydrate(Box::new(FileStorage::new(&path)));
        store.login(user(), "file-token".to_string());
        assert!(path.exists());

        let reloaded = SessionStore::hydrate(Box::new(FileStorage::new(&path)));
        assert_eq!(reloaded.token().as_deref(), Some("file-token"));

        reloaded.logout();
        let after = SessionStore::hydrate(Box::new(FileStorage::new(&path)));
        assert!(!after.is_authenticated());
    }

    #[test]
    fn test_corrupt_file_starts_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "garbage").unwrap();

        let store = SessionStore::hydrate(Box::new(FileStorage::new(&path)));
        assert!(!store.is_authenticated());

        store.login(user(), "t".to_string());
        assert!(store.is_authenticated());
    }
}
