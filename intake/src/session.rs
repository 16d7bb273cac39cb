//! Session token storage for the doctor and patient roles.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every authenticated request and every navigation check reads the current
//! role token through [`Session`]. The session is injected into client
//! constructors and the navigator instead of being read ad hoc from a global
//! store; only login/logout flows write it.
//!
//! Tokens are plain strings under fixed keys (`doctorToken`, `userToken`).
//! An empty stored string is treated as absent.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub const DOCTOR_TOKEN_KEY: &str = "doctorToken";
pub const PATIENT_TOKEN_KEY: &str = "userToken";

// =============================================================================
// ROLE
// =============================================================================

/// End-user role. Each role owns one token and one route partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Doctor,
    Patient,
}

impl Role {
    /// Key the role's token is stored under.
    #[must_use]
    pub fn storage_key(self) -> &'static str {
        match self {
            Self::Doctor => DOCTOR_TOKEN_KEY,
            Self::Patient => PATIENT_TOKEN_KEY,
        }
    }

    /// Path prefix of the role's route partition.
    #[must_use]
    pub fn path_prefix(self) -> &'static str {
        match self {
            Self::Doctor => "/doctor",
            Self::Patient => "/patient",
        }
    }

    /// Login route the guard redirects to.
    #[must_use]
    pub fn login_path(self) -> &'static str {
        match self {
            Self::Doctor => "/doctor/login",
            Self::Patient => "/patient/login",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Doctor => "doctor",
            Self::Patient => "patient",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// KEY-VALUE STORE
// =============================================================================

/// Errors produced by a persisted key-value store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("token store I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("token store at {path} is not a JSON string map: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// String key-value storage with `localStorage` semantics.
pub trait KeyValueStore: Send + Sync {
    /// Read `key`, returning `None` when unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write `value` under `key`, replacing any prior value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete `key`. Deleting an unset key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn remove_item(&self, key: &str) -> Result<(), StoreError>;
}

/// Process-lifetime store used by tests and embedded callers.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let items = self.items.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut items = self.items.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        items.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        let mut items = self.items.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        items.remove(key);
        Ok(())
    }
}

/// JSON-file store persisting a flat `{ key: value }` map across processes.
///
/// A missing file reads as an empty map. Writes go to a sibling temp file that
/// is renamed over the target.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => return Err(StoreError::Io { path: self.path.clone(), source }),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|source| StoreError::Json { path: self.path.clone(), source })
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let rendered =
            serde_json::to_string_pretty(map).map_err(|source| StoreError::Json { path: self.path.clone(), source })?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, rendered).map_err(|source| StoreError::Io { path: tmp.clone(), source })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| StoreError::Io { path: self.path.clone(), source })
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(self.read_map()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut map = self.read_map()?;
        map.insert(key.to_owned(), value.to_owned());
        self.write_map(&map)
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut map = self.read_map()?;
        if map.remove(key).is_none() {
            return Ok(());
        }
        self.write_map(&map)
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// Point-in-time copy of both role tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSnapshot {
    pub doctor: Option<String>,
    pub patient: Option<String>,
}

impl TokenSnapshot {
    #[must_use]
    pub fn get(&self, role: Role) -> Option<&str> {
        match role {
            Role::Doctor => self.doctor.as_deref(),
            Role::Patient => self.patient.as_deref(),
        }
    }
}

/// Shared handle over the token store. Cloning shares the same store.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn KeyValueStore>,
}

impl Session {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Session over a fresh [`MemoryStore`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Current token for `role`. Unreadable storage reads as no token.
    #[must_use]
    pub fn token(&self, role: Role) -> Option<String> {
        match self.store.get_item(role.storage_key()) {
            Ok(value) => value.filter(|token| !token.is_empty()),
            Err(e) => {
                tracing::warn!(role = %role, error = %e, "token read failed; treating as absent");
                None
            }
        }
    }

    /// Store `token` for `role`, replacing the previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn set_token(&self, role: Role, token: &str) -> Result<(), StoreError> {
        self.store.set_item(role.storage_key(), token)?;
        tracing::info!(role = %role, "session token stored");
        Ok(())
    }

    /// Remove the token for `role` (logout).
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn clear_token(&self, role: Role) -> Result<(), StoreError> {
        self.store.remove_item(role.storage_key())?;
        tracing::info!(role = %role, "session token cleared");
        Ok(())
    }

    #[must_use]
    pub fn snapshot(&self) -> TokenSnapshot {
        TokenSnapshot { doctor: self.token(Role::Doctor), patient: self.token(Role::Patient) }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}
