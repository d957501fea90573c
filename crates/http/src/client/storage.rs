//! Key/value storage backing the dashboard session
//!
//! Two stores hold the session: a local store read by client code and a
//! cookie jar the edge middleware sees. Both sit on [`StorageBackend`] so
//! they can live in memory (tests, embedded use) or on disk (the CLI).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

/// Paths every session cookie is written at
pub const COOKIE_PATHS: [&str; 2] = ["/", "/dashboard"];

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Synchronous key/value store
pub trait StorageBackend: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    fn keys(&self) -> Vec<String>;
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}

/// Store persisted as a single JSON object on disk.
///
/// Every mutation rewrites the file through a temporary sibling and a rename,
/// so a crash never leaves a half-written session behind.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open (or lazily create) the store at `path`
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match std::fs::read(&path) {
            Ok(bytes) if bytes.is_empty() => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}

/// Path-scoped cookies over a [`StorageBackend`]
#[derive(Clone)]
pub struct CookieJar {
    store: Arc<dyn StorageBackend>,
}

impl std::fmt::Debug for CookieJar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // values are credentials
        f.debug_struct("CookieJar")
            .field("cookies", &self.store.keys())
            .finish()
    }
}

impl CookieJar {
    pub fn new(store: Arc<dyn StorageBackend>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Set a cookie at every session path
    pub fn set(&self, name: &str, value: &str) -> Result<(), StorageError> {
        for path in COOKIE_PATHS {
            self.store.set(&cookie_key(name, path), value)?;
        }
        Ok(())
    }

    /// Remove a cookie from every path it was stored at
    pub fn remove(&self, name: &str) -> Result<(), StorageError> {
        for key in self.store.keys() {
            if split_key(&key).is_some_and(|(n, _)| n == name) {
                self.store.remove(&key)?;
            }
        }
        Ok(())
    }

    /// Value of `name` as a request to `request_path` would see it
    pub fn get(&self, name: &str, request_path: &str) -> Option<String> {
        self.visible(request_path)
            .into_iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    /// Value of `name` at a specific cookie path
    pub fn get_at(&self, name: &str, path: &str) -> Option<String> {
        self.store.get(&cookie_key(name, path))
    }

    /// `Cookie` header value for a request to `request_path`
    pub fn header_for(&self, request_path: &str) -> Option<String> {
        let cookies = self.visible(request_path);
        if cookies.is_empty() {
            return None;
        }

        Some(
            cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.store.keys().is_empty()
    }

    /// Cookies visible to `request_path`, most specific path winning per name
    fn visible(&self, request_path: &str) -> Vec<(String, String)> {
        let mut chosen: BTreeMap<String, (usize, String)> = BTreeMap::new();

        for key in self.store.keys() {
            let Some((name, path)) = split_key(&key) else {
                continue;
            };
            if !path_matches(path, request_path) {
                continue;
            }
            let Some(value) = self.store.get(&key) else {
                continue;
            };
            let specificity = path.len();
            match chosen.get(name) {
                Some((existing, _)) if *existing >= specificity => {}
                _ => {
                    chosen.insert(name.to_string(), (specificity, value));
                }
            }
        }

        chosen
            .into_iter()
            .map(|(name, (_, value))| (name, value))
            .collect()
    }
}

fn cookie_key(name: &str, path: &str) -> String {
    format!("{name};path={path}")
}

fn split_key(key: &str) -> Option<(&str, &str)> {
    key.split_once(";path=")
}

/// Cookie path matching as browsers do it
fn path_matches(cookie_path: &str, request_path: &str) -> bool {
    if cookie_path == "/" || cookie_path == request_path {
        return true;
    }

    request_path
        .strip_prefix(cookie_path)
        .is_some_and(|rest| cookie_path.ends_with('/') || rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_set_get_remove() {
        let storage = MemoryStorage::new();
        storage.set("authToken", "abc").unwrap();
        assert_eq!(storage.get("authToken").as_deref(), Some("abc"));

        storage.remove("authToken").unwrap();
        assert_eq!(storage.get("authToken"), None);
        // removing twice is fine
        storage.remove("authToken").unwrap();
    }

    #[test]
    fn file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let storage = FileStorage::open(&path).unwrap();
        storage.set("userRole", "admin").unwrap();
        drop(storage);

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get("userRole").as_deref(), Some("admin"));
        assert_eq!(reopened.keys(), vec!["userRole".to_string()]);
    }

    #[test]
    fn file_storage_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            FileStorage::open(&path),
            Err(StorageError::Serialization(_))
        ));
    }

    #[test]
    fn cookies_are_written_at_both_paths() {
        let jar = CookieJar::in_memory();
        jar.set("authToken", "t1").unwrap();

        assert_eq!(jar.get_at("authToken", "/").as_deref(), Some("t1"));
        assert_eq!(jar.get_at("authToken", "/dashboard").as_deref(), Some("t1"));
    }

    #[test]
    fn most_specific_path_wins() {
        let store = Arc::new(MemoryStorage::new());
        store.set(&cookie_key("authToken", "/"), "root").unwrap();
        store
            .set(&cookie_key("authToken", "/dashboard"), "scoped")
            .unwrap();
        let jar = CookieJar::new(store);

        assert_eq!(jar.get("authToken", "/dashboard/news").as_deref(), Some("scoped"));
        assert_eq!(jar.get("authToken", "/api/news").as_deref(), Some("root"));
        assert_eq!(jar.get("authToken", "/dashboardx").as_deref(), Some("root"));
    }

    #[test]
    fn header_lists_each_cookie_once() {
        let jar = CookieJar::in_memory();
        jar.set("authToken", "a").unwrap();
        jar.set("refreshToken", "r").unwrap();

        assert_eq!(
            jar.header_for("/dashboard").as_deref(),
            Some("authToken=a; refreshToken=r")
        );
    }

    #[test]
    fn remove_clears_every_path() {
        let jar = CookieJar::in_memory();
        jar.set("authToken", "a").unwrap();
        jar.remove("authToken").unwrap();

        assert!(jar.is_empty());
        assert_eq!(jar.header_for("/"), None);
    }
}
