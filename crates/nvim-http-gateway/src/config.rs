//! Start options for the gateway

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default bound on a single remote call
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Options the gateway is started with.
///
/// Keys are snake_case and unknown keys are ignored, so the record the
/// editor sends along with its start request can be deserialized directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartOptions {
    /// TCP port to listen on
    pub port: u16,

    /// Worker threads (defaults to available parallelism)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_count: Option<usize>,

    /// Externally visible base URL, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_url: Option<String>,

    /// Timeout for each remote call in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,
}

impl StartOptions {
    /// Options with defaults for everything but the port
    pub fn new(port: u16) -> Self {
        Self {
            port,
            thread_count: None,
            root_url: None,
            request_timeout_ms: None,
        }
    }

    /// Parse options from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Set the worker thread count
    pub fn thread_count(mut self, threads: usize) -> Self {
        self.thread_count = Some(threads);
        self
    }

    /// Set the advertised root URL
    pub fn root_url(mut self, url: impl Into<String>) -> Self {
        self.root_url = Some(url.into());
        self
    }

    /// Set the per-call timeout
    pub fn request_timeout_ms(mut self, ms: u64) -> Self {
        self.request_timeout_ms = Some(ms);
        self
    }

    /// Effective per-call timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS))
    }

    /// Effective worker thread count, never zero
    pub fn worker_threads(&self) -> usize {
        self.thread_count
            .filter(|n| *n > 0)
            .or_else(|| std::thread::available_parallelism().ok().map(|n| n.get()))
            .unwrap_or(1)
    }
}
