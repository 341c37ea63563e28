//! Harness configuration

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{E2eError, E2eResult};

/// Harness configuration, usually read from `lockstep.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Retry window used by matchers against live sources
    pub retry: RetryPolicy,

    /// Web-service API settings
    pub api: ApiConfig,

    /// TOML file of test data defaults
    pub defaults_path: Option<PathBuf>,
}

impl HarnessConfig {
    /// Load configuration from file, falling back to defaults when absent
    pub fn load(path: &Path) -> E2eResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            config.retry.validate()?;
            Ok(config)
        } else {
            debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Apply `LOCKSTEP_*` environment overrides
    pub fn apply_env(self) -> E2eResult<Self> {
        self.apply_overrides(|var| std::env::var(var).ok())
    }

    /// Apply `LOCKSTEP_*` overrides read through `lookup`
    fn apply_overrides<F>(mut self, lookup: F) -> E2eResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(ms) = millis_var(&lookup, "LOCKSTEP_WAIT_FOR_MS")? {
            self.retry.wait_for_ms = ms;
        }
        if let Some(ms) = millis_var(&lookup, "LOCKSTEP_POLL_INTERVAL_MS")? {
            self.retry.poll_interval_ms = ms;
        }
        if let Some(url) = lookup("LOCKSTEP_API_BASE_URL") {
            debug!(%url, "API base URL overridden from environment");
            self.api.base_url = url;
        }
        self.retry.validate()?;
        Ok(self)
    }
}

fn millis_var<F>(lookup: &F, var: &str) -> E2eResult<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| E2eError::Configuration(format!("{} must be milliseconds, got {:?}", var, raw))),
        None => Ok(None),
    }
}

/// Bounded polling used while waiting for a UI or API to catch up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total time to keep retrying
    pub wait_for_ms: u64,

    /// Pause between attempts
    pub poll_interval_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            wait_for_ms: 2000,
            poll_interval_ms: 50,
        }
    }
}

/// Outcome of [`RetryPolicy::poll`]
#[derive(Debug, Clone)]
pub struct Polled<T> {
    /// Result of the final attempt
    pub value: T,
    pub attempts: u32,
    /// Whether the final attempt reported success
    pub settled: bool,
}

impl RetryPolicy {
    pub fn new(wait_for: Duration) -> Self {
        Self {
            wait_for_ms: wait_for.as_millis() as u64,
            ..Self::default()
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn wait_for(&self) -> Duration {
        Duration::from_millis(self.wait_for_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn validate(&self) -> E2eResult<()> {
        if self.poll_interval_ms == 0 {
            return Err(E2eError::Configuration(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        if self.wait_for_ms > 0 && self.poll_interval_ms > self.wait_for_ms {
            return Err(E2eError::Configuration(format!(
                "poll interval ({} ms) exceeds wait window ({} ms)",
                self.poll_interval_ms, self.wait_for_ms
            )));
        }
        Ok(())
    }

    /// Run `attempt` until it reports done or the wait window closes.
    ///
    /// There is always at least one attempt. When the window closes the last
    /// attempt's value is returned with `settled == false`; running out of
    /// time is not an error. Errors from `attempt` end the loop immediately.
    /// An invalid policy is rejected before the first attempt.
    pub fn poll<T, F>(&self, mut attempt: F) -> E2eResult<Polled<T>>
    where
        F: FnMut() -> E2eResult<(T, bool)>,
    {
        self.validate()?;
        let deadline = Instant::now() + self.wait_for();
        let mut attempts = 0;

        loop {
            attempts += 1;
            let (value, done) = attempt()?;
            if done {
                return Ok(Polled {
                    value,
                    attempts,
                    settled: true,
                });
            }

            let now = Instant::now();
            if now >= deadline {
                debug!(attempts, "Retry window of {:?} elapsed", self.wait_for());
                return Ok(Polled {
                    value,
                    attempts,
                    settled: false,
                });
            }

            std::thread::sleep(self.poll_interval().min(deadline - now));
        }
    }
}

/// Web-service API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the application under test
    pub base_url: String,

    /// Per-request timeout
    pub timeout_ms: u64,

    /// Collection name -> resource path (e.g. `widgets = "/api/widgets"`)
    pub routes: IndexMap<String, String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            timeout_ms: 5000,
            routes: IndexMap::new(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        if self.timeout_ms == 0 {
            warn!("API timeout of 0 ms disables request timeouts");
        }
        Duration::from_millis(self.timeout_ms)
    }
}
