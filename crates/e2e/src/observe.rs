//! Observed state: where matchers read what the application actually shows

use std::fmt;

use indexmap::IndexMap;
use lockstep_common::Value;

use crate::error::{E2eError, E2eResult};

/// A live view of application state, such as a page object or an API client.
///
/// Sources publish collections under accessor names. A matcher re-reads the
/// accessor on every retry, so implementations should fetch fresh state on
/// each call to [`Observe::observe`].
pub trait Observe {
    /// Whether this source can produce the collection called `accessor`
    fn exposes(&self, accessor: &str) -> bool;

    /// Read the current items of the collection called `accessor`
    fn observe(&mut self, accessor: &str) -> E2eResult<Vec<Value>>;
}

/// What a matcher is compared against
pub enum Actual<'a> {
    /// A fixed list, compared exactly once
    Items(Vec<Value>),

    /// A live source, polled until it matches or the wait window closes
    Source(&'a mut dyn Observe),
}

impl fmt::Debug for Actual<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Actual::Items(items) => f.debug_tuple("Items").field(items).finish(),
            Actual::Source(_) => f.write_str("Source(..)"),
        }
    }
}

impl From<Vec<Value>> for Actual<'_> {
    fn from(items: Vec<Value>) -> Self {
        Actual::Items(items)
    }
}

impl From<&[Value]> for Actual<'_> {
    fn from(items: &[Value]) -> Self {
        Actual::Items(items.to_vec())
    }
}

impl<'a, T: Observe + 'a> From<&'a mut T> for Actual<'a> {
    fn from(source: &'a mut T) -> Self {
        Actual::Source(source)
    }
}

type Accessor<'a> = Box<dyn FnMut() -> E2eResult<Vec<Value>> + 'a>;

/// An [`Observe`] source assembled from closures, one per accessor.
///
/// ```ignore
/// let mut page = Probe::new().expose("widgets", || Ok(read_widget_rows()));
/// ```
#[derive(Default)]
pub struct Probe<'a> {
    accessors: IndexMap<String, Accessor<'a>>,
}

impl<'a> Probe<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `read` under `accessor`
    pub fn expose<F>(mut self, accessor: impl Into<String>, read: F) -> Self
    where
        F: FnMut() -> E2eResult<Vec<Value>> + 'a,
    {
        self.accessors.insert(accessor.into(), Box::new(read));
        self
    }
}

impl Observe for Probe<'_> {
    fn exposes(&self, accessor: &str) -> bool {
        self.accessors.contains_key(accessor)
    }

    fn observe(&mut self, accessor: &str) -> E2eResult<Vec<Value>> {
        match self.accessors.get_mut(accessor) {
            Some(read) => read(),
            None => Err(E2eError::MissingAccessor {
                collection: accessor.to_string(),
                accessor: accessor.to_string(),
            }),
        }
    }
}
