//! Configuration loading and representation.
//!
//! Read once at startup from `VAXTRACK_*` environment variables.

use std::time::Duration;

use thiserror::Error;

use vaxtrack_inventory::view::DEFAULT_LOW_STOCK_THRESHOLD;

pub const ENV_STORE: &str = "VAXTRACK_STORE";
pub const ENV_PROVIDER_URL: &str = "VAXTRACK_PROVIDER_URL";
pub const ENV_PROVIDER_PROJECT_ID: &str = "VAXTRACK_PROVIDER_PROJECT_ID";
pub const ENV_PROVIDER_PUBLIC_KEY: &str = "VAXTRACK_PROVIDER_PUBLIC_KEY";
pub const ENV_PROVIDER_TIMEOUT_SECS: &str = "VAXTRACK_PROVIDER_TIMEOUT_SECS";
pub const ENV_STORE_LATENCY_MS: &str = "VAXTRACK_STORE_LATENCY_MS";
pub const ENV_LOW_STOCK_THRESHOLD: &str = "VAXTRACK_LOW_STOCK_THRESHOLD";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set when VAXTRACK_STORE=remote")]
    Missing(&'static str),

    #[error("invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

/// Connection settings for the remote provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub base_url: String,
    pub project_id: String,
    pub public_key: String,
    pub timeout: Duration,
}

impl ProviderConfig {
    pub fn new(base_url: impl Into<String>, project_id: impl Into<String>, public_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            project_id: project_id.into(),
            public_key: public_key.into(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Local,
    Remote(ProviderConfig),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Delay injected before every store call.
    pub latency: Duration,
    pub low_stock_threshold: i64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Local,
            latency: Duration::ZERO,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }
}

fn parse<T: core::str::FromStr>(var: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { var, value: raw }),
    }
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (environment, test map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |var: &'static str| {
            lookup(var)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(var))
        };

        let backend = match lookup(ENV_STORE).as_deref().map(str::trim) {
            None | Some("") | Some("local") => StoreBackend::Local,
            Some("remote") => {
                let mut provider = ProviderConfig::new(
                    required(ENV_PROVIDER_URL)?,
                    required(ENV_PROVIDER_PROJECT_ID)?,
                    required(ENV_PROVIDER_PUBLIC_KEY)?,
                );
                let secs = parse(ENV_PROVIDER_TIMEOUT_SECS, lookup(ENV_PROVIDER_TIMEOUT_SECS), 30u64)?;
                provider.timeout = Duration::from_secs(secs);
                StoreBackend::Remote(provider)
            }
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: ENV_STORE,
                    value: other.to_string(),
                });
            }
        };

        let latency_ms = parse(ENV_STORE_LATENCY_MS, lookup(ENV_STORE_LATENCY_MS), 0u64)?;
        let low_stock_threshold = parse(
            ENV_LOW_STOCK_THRESHOLD,
            lookup(ENV_LOW_STOCK_THRESHOLD),
            DEFAULT_LOW_STOCK_THRESHOLD,
        )?;
        if low_stock_threshold < 0 {
            return Err(ConfigError::Invalid {
                var: ENV_LOW_STOCK_THRESHOLD,
                value: low_stock_threshold.to_string(),
            });
        }

        Ok(Self {
            backend,
            latency: Duration::from_millis(latency_ms),
            low_stock_threshold,
        })
    }
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
    fn defaults_to_local_without_latency() {
        let config = StoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn remote_requires_provider_settings() {
        let err = StoreConfig::from_lookup(lookup(&[(ENV_STORE, "remote")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing(ENV_PROVIDER_URL));

        let config = StoreConfig::from_lookup(lookup(&[
            (ENV_STORE, "remote"),
            (ENV_PROVIDER_URL, "https://provider.example"),
            (ENV_PROVIDER_PROJECT_ID, "proj"),
            (ENV_PROVIDER_PUBLIC_KEY, "key"),
            (ENV_STORE_LATENCY_MS, "300"),
        ]))
        .unwrap();

        assert_eq!(config.latency, Duration::from_millis(300));
        match config.backend {
            StoreBackend::Remote(p) => {
                assert_eq!(p.base_url, "https://provider.example");
                assert_eq!(p.timeout, Duration::from_secs(30));
            }
            StoreBackend::Local => panic!("expected remote backend"),
        }
    }

    #[test]
    fn rejects_garbage() {
        assert!(StoreConfig::from_lookup(lookup(&[(ENV_STORE, "sqlite")])).is_err());
        assert!(StoreConfig::from_lookup(lookup(&[(ENV_STORE_LATENCY_MS, "soon")])).is_err());
        assert!(StoreConfig::from_lookup(lookup(&[(ENV_LOW_STOCK_THRESHOLD, "-1")])).is_err());
    }
}
