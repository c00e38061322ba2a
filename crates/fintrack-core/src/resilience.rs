//! Timeout-and-fallback wrapper for external calls
//!
//! [`ResilientCaller::call`] races a primary future against a deadline. Any
//! error or timeout is logged and replaced by the fallback value, so the
//! caller always gets a `T`.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::Result;

/// Default deadline for prediction service calls
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Default)]
struct Counters {
    primary: AtomicU64,
    fallback: AtomicU64,
}

/// Snapshot of call outcomes since startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallStats {
    pub primary: u64,
    pub fallback: u64,
}

#[derive(Debug, Clone)]
pub struct ResilientCaller {
    timeout: Duration,
    counters: Arc<Counters>,
}

impl Default for ResilientCaller {
    fn default() -> Self {
        Self::new(DEFAULT_CALL_TIMEOUT)
    }
}

impl ResilientCaller {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn stats(&self) -> CallStats {
        CallStats {
            primary: self.counters.primary.load(Ordering::Relaxed),
            fallback: self.counters.fallback.load(Ordering::Relaxed),
        }
    }

    /// Await `primary` within the deadline, else return `fallback()`.
    ///
    /// The primary future is dropped on timeout; a late response is never
    /// observed.
    pub async fn call<T, Fut, F>(&self, service: &'static str, primary: Fut, fallback: F) -> T
    where
        Fut: Future<Output = Result<T>>,
        F: FnOnce() -> T,
    {
        let started = Instant::now();

        let failure = match tokio::time::timeout(self.timeout, primary).await {
            Ok(Ok(value)) => {
                self.counters.primary.fetch_add(1, Ordering::Relaxed);
                debug!(
                    service,
                    outcome = "primary",
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "External call succeeded"
                );
                return value;
            }
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("timed out after {}ms", self.timeout.as_millis()),
        };

        self.counters.fallback.fetch_add(1, Ordering::Relaxed);
        warn!(
            service,
            error = %failure,
            outcome = "fallback",
            elapsed_ms = started.elapsed().as_millis() as u64,
            "External call failed, using fallback"
        );
        fallback()
    }
}
