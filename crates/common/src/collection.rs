//! Named fixture collections with delete tracking

use indexmap::IndexMap;
use once_cell::unsync::OnceCell;
use tracing::trace;

use crate::error::{Error, Result};
use crate::value::Value;

/// Entries of a collection, in insertion order
pub type Entries = IndexMap<String, Value>;

/// A named mapping from key to [`Value`] that remembers what was deleted.
///
/// Deleting a key moves its entry into [`Collection::deleted`], a nested
/// collection of the same shape, so matchers can check that removed
/// fixtures do not reappear.
#[derive(Debug, Clone)]
pub struct Collection {
    name: String,
    entries: Entries,
    deleted: OnceCell<Box<Collection>>,
}

impl Collection {
    /// Create an empty collection
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Entries::new(),
            deleted: OnceCell::new(),
        }
    }

    /// Name used in diagnostics
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read the value stored under `key`
    pub fn get(&self, key: &str) -> Result<&Value> {
        self.entries
            .get(key)
            .ok_or_else(|| Error::unknown_key(&self.name, key))
    }

    pub fn get_mut(&mut self, key: &str) -> Result<&mut Value> {
        let name = &self.name;
        self.entries
            .get_mut(key)
            .ok_or_else(|| Error::unknown_key(name, key))
    }

    /// Insert or replace the value under `key`, returning the previous value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        trace!(collection = %self.name, %key, "set");
        self.entries.insert(key, value.into())
    }

    /// Remove `key` and record it in the deleted collection
    pub fn delete(&mut self, key: &str) -> Result<Value> {
        let value = self
            .entries
            .shift_remove(key)
            .ok_or_else(|| Error::unknown_key(&self.name, key))?;

        trace!(collection = %self.name, %key, "delete");
        self.deleted_mut().set(key, value.clone());
        Ok(value)
    }

    /// Delete every entry for which `predicate` holds, returning the survivors.
    ///
    /// The predicate sees each entry once, in insertion order.
    pub fn delete_where<F>(&mut self, mut predicate: F) -> &Entries
    where
        F: FnMut(&str, &Value) -> bool,
    {
        let doomed: Vec<String> = self
            .entries
            .iter()
            .filter(|(k, v)| predicate(k.as_str(), v))
            .map(|(k, _)| k.clone())
            .collect();

        for key in doomed {
            if let Some(value) = self.entries.shift_remove(&key) {
                trace!(collection = %self.name, %key, "delete_where");
                self.deleted_mut().set(key, value);
            }
        }

        &self.entries
    }

    /// Deep copy of entries and deleted entries
    pub fn duplicate(&self) -> Self {
        self.clone()
    }

    /// Entries restricted to `keys`; missing keys are skipped
    pub fn slice<I, S>(&self, keys: I) -> Entries
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        keys.into_iter()
            .filter_map(|k| {
                let k = k.as_ref();
                self.entries.get(k).map(|v| (k.to_string(), v.clone()))
            })
            .collect()
    }

    /// Entries other than `keys`; missing keys are ignored
    pub fn except<I, S>(&self, keys: I) -> Entries
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let excluded: Vec<S> = keys.into_iter().collect();
        self.entries
            .iter()
            .filter(|(k, _)| !excluded.iter().any(|e| e.as_ref() == k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Entries removed from this collection
    pub fn deleted(&self) -> &Collection {
        self.deleted.get_or_init(|| self.empty_deleted())
    }

    pub fn deleted_mut(&mut self) -> &mut Collection {
        if self.deleted.get().is_none() {
            self.deleted = OnceCell::with_value(self.empty_deleted());
        }
        match self.deleted.get_mut() {
            Some(nested) => nested,
            None => unreachable!("deleted collection initialized above"),
        }
    }

    fn empty_deleted(&self) -> Box<Collection> {
        Box::new(Collection::new(format!("deleted {}", self.name)))
    }

    pub fn entries(&self) -> &Entries {
        &self.entries
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn deleted_entries(&self) -> Option<&Entries> {
        self.deleted.get().map(|d| &d.entries)
    }
}

impl PartialEq for Collection {
    fn eq(&self, other: &Self) -> bool {
        let empty = Entries::new();
        self.name == other.name
            && self.entries == other.entries
            && self.deleted_entries().unwrap_or(&empty) == other.deleted_entries().unwrap_or(&empty)
    }
}
