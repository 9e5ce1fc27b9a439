//! Polling waits for elements and page conditions.
//!
//! Every wait is bounded: it polls until the condition holds or the
//! timeout expires, then fails with [`ProofError::Timeout`], which
//! callers report as a skip.

use crate::config::RunConfig;
use crate::driver::{ElementHandle, Locator, PageDriver};
use crate::result::{ProofError, ProofResult};
use std::time::{Duration, Instant};

/// Default wait timeout in milliseconds
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Options for waiting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create default wait options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options matching a run's element timeout
    #[must_use]
    pub fn from_config(config: &RunConfig) -> Self {
        Self::default().with_timeout(config.timeout_secs.saturating_mul(1000))
    }

    /// Set timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Result of a successful wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitResult {
    /// Time spent waiting
    pub elapsed: Duration,
    /// What was waited for
    pub waited_for: String,
}

/// Poll `predicate` until it returns `true` or the timeout expires.
///
/// The predicate runs at least once. Errors from the predicate end the
/// wait immediately.
pub fn wait_until<F>(description: &str, options: &WaitOptions, mut predicate: F) -> ProofResult<WaitResult>
where
    F: FnMut() -> ProofResult<bool>,
{
    let start = Instant::now();
    loop {
        if predicate()? {
            return Ok(WaitResult {
                elapsed: start.elapsed(),
                waited_for: description.to_string(),
            });
        }
        if start.elapsed() >= options.timeout() {
            tracing::debug!(waited_for = description, timeout_ms = options.timeout_ms, "wait timed out");
            return Err(ProofError::Timeout {
                ms: options.timeout_ms,
                waited_for: description.to_string(),
            });
        }
        std::thread::sleep(options.poll_interval());
    }
}

/// Wait until `locator` matches an element
pub fn wait_for_element<D: PageDriver + ?Sized>(
    driver: &D,
    locator: &Locator,
    options: &WaitOptions,
) -> ProofResult<ElementHandle> {
    let mut found = None;
    wait_until(&format!("element {locator}"), options, || {
        found = driver.find_element(locator)?;
        Ok(found.is_some())
    })?;
    found.ok_or_else(|| ProofError::ElementNotFound {
        locator: locator.to_string(),
    })
}

/// Wait until the current URL contains `fragment`
pub fn wait_for_url_contains<D: PageDriver + ?Sized>(
    driver: &D,
    fragment: &str,
    options: &WaitOptions,
) -> ProofResult<WaitResult> {
    wait_until(&format!("URL containing {fragment:?}"), options, || {
        Ok(driver.current_url()?.contains(fragment))
    })
}

/// Fixed pause between interactions (prefer condition waits)
pub fn pause(duration_ms: u64) {
    std::thread::sleep(Duration::from_millis(duration_ms));
}
