//! Matching observed state against the mental model
//!
//! A [`Matcher`] snapshots one mental-model collection when it is built: the
//! live entries become *expected* items and the deleted entries become
//! *unexpected* items. Matching then checks two things about the observed
//! items:
//!
//! - every expected item is present (one observed item per expected item,
//!   so duplicates must be observed as often as they are expected)
//! - no unexpected item is present
//!
//! Observed items the model knows nothing about are ignored.
//!
//! ```ignore
//! let mut matcher = Matcher::new(&mut model, "widgets").only(["foo"]);
//! assert!(matcher.matches(&mut page)?, "{}", matcher.failure_message().unwrap_or_default());
//! ```

use std::fmt;
use std::time::Duration;

use lockstep_common::{Entries, MentalModel, Value};
use tracing::{debug, info, trace};

use crate::config::RetryPolicy;
use crate::diff::{multiset_difference, multiset_intersection};
use crate::error::{E2eError, E2eResult};
use crate::observe::Actual;

/// Pending comparison between one mental-model collection and observed state
#[derive(Debug, Clone)]
pub struct Matcher {
    collection_key: String,
    expected: Entries,
    unexpected: Entries,
    accessor: Option<String>,
    policy: RetryPolicy,
    last: Option<MatchOutcome>,
}

impl Matcher {
    /// Snapshot `collection_key` from `model` with the default retry policy
    pub fn new(model: &mut MentalModel, collection_key: &str) -> Self {
        Self::with_policy(model, collection_key, RetryPolicy::default())
    }

    pub fn with_policy(model: &mut MentalModel, collection_key: &str, policy: RetryPolicy) -> Self {
        let snapshot = model.collection(collection_key).duplicate();
        let expected = snapshot.entries().clone();
        let unexpected = snapshot.deleted().entries().clone();

        debug!(
            collection = collection_key,
            expected = expected.len(),
            unexpected = unexpected.len(),
            "Built matcher"
        );

        Self {
            collection_key: collection_key.to_string(),
            expected,
            unexpected,
            accessor: None,
            policy,
            last: None,
        }
    }

    /// Expect only `keys`; every other expected entry becomes unexpected
    pub fn only<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keep: Vec<String> = keys.into_iter().map(|k| k.as_ref().to_string()).collect();
        let (kept, dropped): (Entries, Entries) = std::mem::take(&mut self.expected)
            .into_iter()
            .partition(|(k, _)| keep.contains(k));

        trace!(
            collection = %self.collection_key,
            kept = kept.len(),
            dropped = dropped.len(),
            "Restricted expected items"
        );
        self.expected = kept;
        self.unexpected.extend(dropped);
        self
    }

    /// Expect every tracked item to be absent
    pub fn expecting_nothing(self) -> Self {
        self.only(std::iter::empty::<&str>())
    }

    /// Replace every expected and unexpected value with `transform(value)`
    pub fn mapped_by<F>(mut self, mut transform: F) -> Self
    where
        F: FnMut(Value) -> Value,
    {
        for value in self.expected.values_mut().chain(self.unexpected.values_mut()) {
            *value = transform(std::mem::take(value));
        }
        self
    }

    /// Keep expecting only the entries whose value satisfies `predicate`;
    /// the rest become unexpected
    pub fn filtered_by<F>(self, mut predicate: F) -> Self
    where
        F: FnMut(&Value) -> bool,
    {
        let keys: Vec<String> = self
            .expected
            .iter()
            .filter(|(_, v)| predicate(v))
            .map(|(k, _)| k.clone())
            .collect();
        self.only(keys)
    }

    /// Read observed items through `accessor` instead of the collection key
    pub fn using(mut self, accessor: impl Into<String>) -> E2eResult<Self> {
        let accessor = accessor.into();
        if accessor.trim().is_empty() {
            return Err(E2eError::Configuration(format!(
                "empty accessor name for collection `{}`",
                self.collection_key
            )));
        }
        self.accessor = Some(accessor);
        Ok(self)
    }

    /// Override how long live sources are retried
    pub fn wait_for(mut self, wait_for: Duration) -> Self {
        self.policy.wait_for_ms = wait_for.as_millis() as u64;
        self
    }

    pub fn collection_key(&self) -> &str {
        &self.collection_key
    }

    /// Accessor name read from live sources
    pub fn accessor(&self) -> &str {
        self.accessor.as_deref().unwrap_or(&self.collection_key)
    }

    pub fn expected(&self) -> &Entries {
        &self.expected
    }

    pub fn unexpected(&self) -> &Entries {
        &self.unexpected
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Compare against `actual`.
    ///
    /// A plain list is compared once. A live source is re-read until it
    /// matches or the wait window closes; on timeout the last comparison
    /// stands. Errors only come from the source itself or from a source that
    /// does not expose the accessor.
    pub fn matches<'a>(&mut self, actual: impl Into<Actual<'a>>) -> E2eResult<bool> {
        let outcome = match actual.into() {
            Actual::Items(items) => self.compare(&items, 1),
            Actual::Source(source) => {
                let accessor = self.accessor().to_string();
                if !source.exposes(&accessor) {
                    return Err(E2eError::MissingAccessor {
                        collection: self.collection_key.clone(),
                        accessor,
                    });
                }

                let polled = self.policy.poll(|| {
                    let observed = source.observe(&accessor)?;
                    let outcome = self.compare(&observed, 0);
                    let done = outcome.is_match();
                    Ok((outcome, done))
                })?;

                MatchOutcome {
                    attempts: polled.attempts,
                    ..polled.value
                }
            }
        };

        if outcome.is_match() {
            debug!(collection = %self.collection_key, attempts = outcome.attempts, "Matched");
        } else {
            info!(
                collection = %self.collection_key,
                attempts = outcome.attempts,
                missing = outcome.missing.len(),
                unexpected = outcome.unexpected_found.len(),
                "Mismatch"
            );
        }

        let matched = outcome.is_match();
        self.last = Some(outcome);
        Ok(matched)
    }

    /// Like [`Matcher::matches`], but a mismatch becomes `AssertionFailed`
    pub fn assert<'a>(&mut self, actual: impl Into<Actual<'a>>) -> E2eResult<()> {
        if self.matches(actual)? {
            return Ok(());
        }
        Err(E2eError::AssertionFailed(
            self.failure_message().unwrap_or_default(),
        ))
    }

    /// Result of the most recent comparison
    pub fn outcome(&self) -> Option<&MatchOutcome> {
        self.last.as_ref()
    }

    /// Diagnostic for the most recent comparison, if it failed
    pub fn failure_message(&self) -> Option<String> {
        self.last
            .as_ref()
            .filter(|o| !o.is_match())
            .map(MatchOutcome::failure_message)
    }

    fn compare(&self, observed: &[Value], attempts: u32) -> MatchOutcome {
        let expected: Vec<Value> = self.expected.values().cloned().collect();
        let unexpected: Vec<Value> = self.unexpected.values().cloned().collect();

        MatchOutcome {
            collection: self.collection_key.clone(),
            missing: multiset_difference(&expected, observed),
            unexpected_found: multiset_intersection(&unexpected, observed),
            attempts,
        }
    }
}

/// Result of comparing observed items against a matcher's expectations
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    pub collection: String,
    /// Expected items that were not observed
    pub missing: Vec<Value>,
    /// Unexpected items that were observed
    pub unexpected_found: Vec<Value>,
    /// Number of observations made
    pub attempts: u32,
}

impl MatchOutcome {
    pub fn is_match(&self) -> bool {
        self.missing.is_empty() && self.unexpected_found.is_empty()
    }

    /// Multi-line diagnostic with items sorted for stable output
    pub fn failure_message(&self) -> String {
        let mut msg = format!(
            "expected collection `{}` to match the mental model",
            self.collection
        );
        push_block(&mut msg, "expected items not found", &self.missing);
        push_block(&mut msg, "unexpected items found", &self.unexpected_found);
        msg
    }
}

impl fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_match() {
            write!(f, "collection `{}` matches the mental model", self.collection)
        } else {
            f.write_str(&self.failure_message())
        }
    }
}

fn push_block(msg: &mut String, title: &str, items: &[Value]) {
    if items.is_empty() {
        return;
    }

    let mut sorted: Vec<&Value> = items.iter().collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    msg.push_str("\n  ");
    msg.push_str(title);
    msg.push(':');
    for item in sorted {
        msg.push_str("\n    - ");
        msg.push_str(&item.to_string());
    }
}
