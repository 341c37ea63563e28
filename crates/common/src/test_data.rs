//! Test data: inputs used to build fixtures
//!
//! Test data is a second registry of named collections, independent from the
//! mental model. It also carries a copy of the process-wide defaults, so a
//! test may tweak its defaults without leaking the change into other tests.

use std::path::Path;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use crate::collection::Collection;
use crate::error::{Error, Result};
use crate::value::Value;

static DEFAULTS: Lazy<RwLock<IndexMap<String, Value>>> = Lazy::new(|| RwLock::new(IndexMap::new()));
static SEEDED: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(false));

/// Per-test registry of input collections plus a private copy of the defaults
#[derive(Debug, Clone)]
pub struct TestData {
    collections: IndexMap<String, Collection>,
    defaults: IndexMap<String, Value>,
}

impl TestData {
    /// Create test data holding a deep copy of the current defaults
    pub fn new() -> Self {
        Self {
            collections: IndexMap::new(),
            defaults: DEFAULTS.read().clone(),
        }
    }

    /// Register a process-wide default; later instances will see it
    pub fn register_default(key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        debug!(%key, "Registering test data default");
        DEFAULTS.write().insert(key, value.into());
    }

    /// Register a batch of defaults the first time this is called in the process.
    ///
    /// Returns `true` if the batch was registered, `false` if defaults were
    /// already seeded.
    pub fn seed_defaults<K, V, I>(pairs: I) -> bool
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut seeded = SEEDED.lock();
        if *seeded {
            return false;
        }

        let mut defaults = DEFAULTS.write();
        for (k, v) in pairs {
            defaults.insert(k.into(), v.into());
        }
        *seeded = true;
        info!(count = defaults.len(), "Seeded test data defaults");
        true
    }

    /// Register every top-level key of a TOML file as a default
    pub fn load_defaults(path: &Path) -> Result<usize> {
        let content = std::fs::read_to_string(path)?;
        let table: IndexMap<String, Value> = toml::from_str(&content)?;
        let count = table.len();

        let mut defaults = DEFAULTS.write();
        for (k, v) in table {
            defaults.insert(k, v);
        }

        info!("Loaded {} test data default(s) from {}", count, path.display());
        Ok(count)
    }

    /// Get (creating if needed) the collection called `name`
    pub fn collection(&mut self, name: &str) -> &mut Collection {
        self.collections
            .entry(name.to_string())
            .or_insert_with(|| Collection::new(name))
    }

    pub fn peek(&self, name: &str) -> Option<&Collection> {
        self.collections.get(name)
    }

    /// This instance's copy of the default registered under `key`
    pub fn default(&self, key: &str) -> Result<&Value> {
        self.defaults.get(key).ok_or_else(|| Error::MissingDefault {
            key: key.to_string(),
        })
    }

    pub fn default_mut(&mut self, key: &str) -> Result<&mut Value> {
        self.defaults.get_mut(key).ok_or_else(|| Error::MissingDefault {
            key: key.to_string(),
        })
    }
}

impl Default for TestData {
    fn default() -> Self {
        Self::new()
    }
}
