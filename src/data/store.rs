//! Type-keyed value store shared between init functions and request handlers.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;

/// A typed key into a [`DataStore`].
///
/// Implement this on a marker type to declare a slot in the store:
///
/// ```
/// use site_router::data::{DataKey, DataStore};
///
/// struct Greeting;
///
/// impl DataKey for Greeting {
///     type Value = String;
/// }
///
/// let store = DataStore::new();
/// store.set::<Greeting>("hello".to_string());
/// assert_eq!(store.get::<Greeting>().as_deref().map(String::as_str), Some("hello"));
/// ```
pub trait DataKey: 'static {
    /// Type of the value stored under this key.
    type Value: Send + Sync + 'static;

    /// Human-readable key name used in errors and logs.
    fn name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Errors returned by assert-present lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    /// Nothing usable is stored under the key.
    #[error("no value stored for data key `{key}`")]
    Missing { key: &'static str },
}

struct Entry {
    name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

/// Thread-safe store holding at most one value per [`DataKey`].
#[derive(Default)]
pub struct DataStore {
    entries: Mutex<HashMap<TypeId, Entry>>,
}

impl DataStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave the map half-written, so a
    // poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, HashMap<TypeId, Entry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Store `value` under `K`, replacing and returning any previous value.
    pub fn set<K: DataKey>(&self, value: K::Value) -> Option<Arc<K::Value>> {
        let entry = Entry {
            name: K::name(),
            value: Arc::new(value),
        };
        let previous = self.lock().insert(TypeId::of::<K>(), entry);

        if previous.is_some() {
            tracing::debug!(key = K::name(), "Data value overwritten");
        } else {
            tracing::debug!(key = K::name(), "Data value stored");
        }
        previous.and_then(|entry| entry.value.downcast::<K::Value>().ok())
    }

    /// Look up the value stored under `K`.
    ///
    /// Returns `None` when nothing was stored, or when the stored value is not
    /// a `K::Value`.
    pub fn get<K: DataKey>(&self) -> Option<Arc<K::Value>> {
        let value = Arc::clone(&self.lock().get(&TypeId::of::<K>())?.value);
        value.downcast::<K::Value>().ok()
    }

    /// Look up a value the caller knows must be present.
    pub fn get_value<K: DataKey>(&self) -> Result<Arc<K::Value>, DataError> {
        self.get::<K>()
            .ok_or(DataError::Missing { key: K::name() })
    }

    /// Whether a value is stored under `K`.
    pub fn contains<K: DataKey>(&self) -> bool {
        self.get::<K>().is_some()
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Names of all stored keys, sorted.
    pub fn keys(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.lock().values().map(|entry| entry.name).collect();
        names.sort_unstable();
        names
    }

    /// Read-only view of this store for request handlers.
    pub fn read_only(self: &Arc<Self>) -> Data {
        Data {
            store: Arc::clone(self),
        }
    }
}

impl fmt::Debug for DataStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataStore")
            .field("keys", &self.keys())
            .finish()
    }
}

/// Read-only handle to a [`DataStore`].
///
/// Cheap to clone. Writes made to the underlying store after the view was
/// created are visible through it.
#[derive(Clone, Debug)]
pub struct Data {
    store: Arc<DataStore>,
}

impl Data {
    /// See [`DataStore::get`].
    pub fn get<K: DataKey>(&self) -> Option<Arc<K::Value>> {
        self.store.get::<K>()
    }

    /// See [`DataStore::get_value`].
    pub fn get_value<K: DataKey>(&self) -> Result<Arc<K::Value>, DataError> {
        self.store.get_value::<K>()
    }

    /// See [`DataStore::contains`].
    pub fn contains<K: DataKey>(&self) -> bool {
        self.store.contains::<K>()
    }

    /// See [`DataStore::len`].
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// See [`DataStore::is_empty`].
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PoolSize;
    impl DataKey for PoolSize {
        type Value = u32;
    }

    struct DatabaseUrl;
    impl DataKey for DatabaseUrl {
        type Value = String;
        fn name() -> &'static str {
            "database-url"
        }
    }

    #[test]
    fn test_set_then_get() {
        let store = DataStore::new();
        assert!(store.set::<PoolSize>(8).is_none());
        assert_eq!(store.get::<PoolSize>().as_deref(), Some(&8));
    }

    #[test]
    fn test_last_write_wins() {
        let store = DataStore::new();
        store.set::<PoolSize>(8);
        let previous = store.set::<PoolSize>(16);

        assert_eq!(previous.as_deref(), Some(&8));
        assert_eq!(store.get::<PoolSize>().as_deref(), Some(&16));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_keys_are_independent() {
        let store = DataStore::new();
        store.set::<PoolSize>(4);
        store.set::<DatabaseUrl>("postgres://localhost".into());
        store.set::<PoolSize>(5);

        assert_eq!(
            store.get::<DatabaseUrl>().as_deref().map(String::as_str),
            Some("postgres://localhost")
        );
        assert_eq!(store.keys().len(), 2);
    }

    #[test]
    fn test_get_absent_is_none() {
        let store = DataStore::new();
        assert!(store.get::<PoolSize>().is_none());
        assert!(!store.contains::<PoolSize>());
        assert!(store.is_empty());
    }

    #[test]
    fn test_get_value_absent_is_error() {
        let store = DataStore::new();
        let err = store.get_value::<DatabaseUrl>().unwrap_err();
        assert_eq!(err, DataError::Missing { key: "database-url" });
        assert_eq!(err.to_string(), "no value stored for data key `database-url`");
    }

    #[test]
    fn test_type_mismatch_is_absent() {
        let store = DataStore::new();
        // Only reachable by bypassing `set`; lookups must still not panic.
        store.lock().insert(
            TypeId::of::<PoolSize>(),
            Entry {
                name: "pool",
                value: Arc::new("not a number".to_string()),
            },
        );

        assert!(store.get::<PoolSize>().is_none());
        assert!(store.get_value::<PoolSize>().is_err());
    }

    #[test]
    fn test_read_only_view_sees_later_writes() {
        let store = Arc::new(DataStore::new());
        let data = store.read_only();
        assert!(data.get::<PoolSize>().is_none());

        store.set::<PoolSize>(3);
        assert_eq!(data.get_value::<PoolSize>().unwrap().as_ref(), &3);
        assert_eq!(data.len(), 1);
    }
}
