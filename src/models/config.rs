//! Configuration module for the analysis client
//!
//! Defaults come from utils/constants.rs; every field can be overridden
//! through `FORENSICS_*` environment variables.

use eyre::{eyre, Result};
use std::collections::HashSet;
use std::time::Duration;
use tracing::info;

use crate::utils::constants::{
    DEFAULT_ANALYZE_PATH, DEFAULT_BACKEND_URL, DEFAULT_CACHED_ADDRESSES,
    DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL_SECS, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_RESULTS_PATH, SOLANA_ADDRESS_LENGTH,
};

/// Configuration for the analysis client and session
#[derive(Debug, Clone)]
pub struct ForensicsConfig {
    /// Base URL of the analysis backend
    pub backend_url: String,
    /// Job submission path (POST)
    pub analyze_path: String,
    /// Job result path (GET, `?job_id=`)
    pub results_path: String,
    /// Wait between result polls
    pub poll_interval: Duration,
    /// Poll attempts before the client stops waiting
    pub max_poll_attempts: u32,
    /// Timeout of a single HTTP request
    pub request_timeout: Duration,
    /// Required address length
    pub address_length: usize,
    /// Pre-seeded addresses whose results are fetched without submission
    pub cached_addresses: HashSet<String>,
}

impl Default for ForensicsConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            analyze_path: DEFAULT_ANALYZE_PATH.to_string(),
            results_path: DEFAULT_RESULTS_PATH.to_string(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            address_length: SOLANA_ADDRESS_LENGTH,
            cached_addresses: DEFAULT_CACHED_ADDRESSES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ForensicsConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup (testable)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("FORENSICS_BACKEND_URL").filter(|v| !v.trim().is_empty()) {
            config.backend_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(path) = lookup("FORENSICS_ANALYZE_PATH") {
            config.analyze_path = path;
        }
        if let Some(path) = lookup("FORENSICS_RESULTS_PATH") {
            config.results_path = path;
        }
        if let Some(secs) = lookup("FORENSICS_POLL_INTERVAL_SECS") {
            config.poll_interval = Duration::from_secs(parse_num("FORENSICS_POLL_INTERVAL_SECS", &secs)?);
        }
        if let Some(n) = lookup("FORENSICS_MAX_POLL_ATTEMPTS") {
            config.max_poll_attempts = parse_num("FORENSICS_MAX_POLL_ATTEMPTS", &n)?;
        }
        if let Some(secs) = lookup("FORENSICS_REQUEST_TIMEOUT_SECS") {
            config.request_timeout =
                Duration::from_secs(parse_num("FORENSICS_REQUEST_TIMEOUT_SECS", &secs)?);
        }
        if let Some(list) = lookup("FORENSICS_CACHED_ADDRESSES") {
            config.cached_addresses = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }

        if config.max_poll_attempts == 0 {
            return Err(eyre!("FORENSICS_MAX_POLL_ATTEMPTS must be at least 1"));
        }

        info!(
            "⚙️ Backend {} (poll every {:?}, max {} attempts, {} cached addresses)",
            config.backend_url,
            config.poll_interval,
            config.max_poll_attempts,
            config.cached_addresses.len()
        );

        Ok(config)
    }

    pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend_url = url.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_max_poll_attempts(mut self, attempts: u32) -> Self {
        self.max_poll_attempts = attempts;
        self
    }

    pub fn with_cached_addresses<I, S>(mut self, addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cached_addresses = addresses.into_iter().map(Into::into).collect();
        self
    }

    pub fn analyze_url(&self) -> String {
        format!("{}{}", self.backend_url, self.analyze_path)
    }

    pub fn results_url(&self) -> String {
        format!("{}{}", self.backend_url, self.results_path)
    }

    #[inline]
    pub fn is_cached(&self, address: &str) -> bool {
        self.cached_addresses.contains(address)
    }
}

fn parse_num<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| eyre!("{} has invalid value {:?}", key, raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ForensicsConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.max_poll_attempts, 12);
        assert_eq!(config.address_length, 44);
        assert_eq!(config.cached_addresses.len(), 3);
        assert_eq!(config.analyze_url(), "http://127.0.0.1:5025/api/analyze_address");
    }

    #[test]
    fn test_env_overrides() {
        let config = ForensicsConfig::from_lookup(lookup(&[
            ("FORENSICS_BACKEND_URL", "https://backend.example/"),
            ("FORENSICS_POLL_INTERVAL_SECS", "2"),
            ("FORENSICS_MAX_POLL_ATTEMPTS", "3"),
            ("FORENSICS_CACHED_ADDRESSES", " a, ,b "),
        ]))
        .unwrap();
        assert_eq!(config.results_url(), "https://backend.example/api/get_results");
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.max_poll_attempts, 3);
        assert!(config.is_cached("a") && config.is_cached("b"));
        assert_eq!(config.cached_addresses.len(), 2);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(ForensicsConfig::from_lookup(lookup(&[("FORENSICS_MAX_POLL_ATTEMPTS", "x")])).is_err());
        assert!(ForensicsConfig::from_lookup(lookup(&[("FORENSICS_MAX_POLL_ATTEMPTS", "0")])).is_err());
    }
}
