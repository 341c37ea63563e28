//! The mental model: the tester's expected view of application state

use indexmap::IndexMap;
use tracing::debug;

use crate::collection::Collection;

/// Registry of named collections, created on first use.
///
/// Any name is valid. Asking for a name the first time yields an empty
/// collection; asking again yields the same stored collection for the
/// lifetime of the model.
#[derive(Debug, Clone, Default)]
pub struct MentalModel {
    collections: IndexMap<String, Collection>,
}

impl MentalModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get (creating if needed) the collection called `name`
    pub fn collection(&mut self, name: &str) -> &mut Collection {
        if !self.collections.contains_key(name) {
            debug!(collection = name, "Creating mental model collection");
        }
        self.collections
            .entry(name.to_string())
            .or_insert_with(|| Collection::new(name))
    }

    /// Read a collection without creating it
    pub fn peek(&self, name: &str) -> Option<&Collection> {
        self.collections.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}
