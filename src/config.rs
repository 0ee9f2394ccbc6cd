//! Process Configuration
//!
//! Both services read the same environment. The three addresses are required;
//! everything else has a default matching the production deployment.

use std::time::Duration;
use thiserror::Error;

pub const INTAKE_ADDR: &str = "INTAKE_ADDR";
pub const COMPUTE_ADDR: &str = "COMPUTE_ADDR";
pub const CACHE_ADDR: &str = "CACHE_ADDR";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("failed to get {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// `host:port` the intake service binds to and the compute service reports to.
    pub intake_addr: String,
    /// `host:port` the compute service binds to and the intake service submits to.
    pub compute_addr: String,
    /// Cache backend address, see `cache::backend_from_addr`.
    pub cache_addr: String,

    pub queue_capacity: usize,
    pub worker_count: usize,
    pub admission_timeout: Duration,
    pub http_timeout: Duration,
    pub report_attempts: usize,
    pub result_cache_ttl: Duration,
    pub status_cache_ttl: Duration,
    pub reconcile_after: Duration,
    pub reconcile_interval: Duration,
    pub reconcile_max_attempts: u32,
    pub shutdown_grace: Duration,
}

impl Config {
    /// Defaults for every tunable, with the given addresses.
    pub fn new(
        intake_addr: impl Into<String>,
        compute_addr: impl Into<String>,
        cache_addr: impl Into<String>,
    ) -> Self {
        Self {
            intake_addr: intake_addr.into(),
            compute_addr: compute_addr.into(),
            cache_addr: cache_addr.into(),
            queue_capacity: 100,
            worker_count: 5,
            admission_timeout: Duration::from_secs(5),
            http_timeout: Duration::from_secs(10),
            report_attempts: 3,
            result_cache_ttl: Duration::from_secs(10 * 60),
            status_cache_ttl: Duration::from_secs(5 * 60),
            reconcile_after: Duration::from_secs(60),
            reconcile_interval: Duration::from_secs(15),
            reconcile_max_attempts: 3,
            shutdown_grace: Duration::from_secs(5),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));

        let mut config = Self::new(
            required(INTAKE_ADDR)?,
            required(COMPUTE_ADDR)?,
            required(CACHE_ADDR)?,
        );

        let number = |name: &'static str| -> Result<Option<u64>, ConfigError> {
            match lookup(name) {
                None => Ok(None),
                Some(value) => value
                    .trim()
                    .parse::<u64>()
                    .map(Some)
                    .map_err(|_| ConfigError::Invalid { name, value }),
            }
        };

        if let Some(capacity) = number("QUEUE_CAPACITY")? {
            if capacity == 0 {
                return Err(ConfigError::Invalid {
                    name: "QUEUE_CAPACITY",
                    value: capacity.to_string(),
                });
            }
            config.queue_capacity = capacity as usize;
        }
        if let Some(workers) = number("WORKER_COUNT")? {
            if workers == 0 {
                return Err(ConfigError::Invalid {
                    name: "WORKER_COUNT",
                    value: workers.to_string(),
                });
            }
            config.worker_count = workers as usize;
        }
        if let Some(ms) = number("ADMISSION_TIMEOUT_MS")? {
            config.admission_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = number("HTTP_TIMEOUT_MS")? {
            config.http_timeout = Duration::from_millis(ms);
        }
        if let Some(attempts) = number("REPORT_ATTEMPTS")? {
            config.report_attempts = (attempts as usize).max(1);
        }
        if let Some(secs) = number("RESULT_CACHE_TTL_SECS")? {
            config.result_cache_ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = number("STATUS_CACHE_TTL_SECS")? {
            config.status_cache_ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = number("RECONCILE_AFTER_SECS")? {
            config.reconcile_after = Duration::from_secs(secs);
        }
        if let Some(secs) = number("RECONCILE_INTERVAL_SECS")? {
            config.reconcile_interval = Duration::from_secs(secs.max(1));
        }
        if let Some(attempts) = number("RECONCILE_MAX_ATTEMPTS")? {
            config.reconcile_max_attempts = attempts as u32;
        }
        if let Some(ms) = number("SHUTDOWN_GRACE_MS")? {
            config.shutdown_grace = Duration::from_millis(ms);
        }

        // Submit waits on the compute side's admission window; a shorter client
        // timeout turns a 429 into a transport error
        if config.http_timeout <= config.admission_timeout {
            return Err(ConfigError::Invalid {
                name: "HTTP_TIMEOUT_MS",
                value: config.http_timeout.as_millis().to_string(),
            });
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    const ADDRS: [(&str, &str); 3] = [
        (INTAKE_ADDR, "127.0.0.1:8080"),
        (COMPUTE_ADDR, "127.0.0.1:8081"),
        (CACHE_ADDR, "127.0.0.1:6379"),
    ];

    #[test]
    fn test_defaults_with_required_addresses() {
        let config = Config::from_lookup(lookup_from(&ADDRS)).unwrap();

        assert_eq!(config.intake_addr, "127.0.0.1:8080");
        assert_eq!(config.compute_addr, "127.0.0.1:8081");
        assert_eq!(config.cache_addr, "127.0.0.1:6379");
        assert_eq!(config.queue_capacity, 100);
        assert_eq!(config.worker_count, 5);
        assert_eq!(config.admission_timeout, Duration::from_secs(5));
        assert!(config.http_timeout > config.admission_timeout);
        assert_eq!(config.result_cache_ttl, Duration::from_secs(600));
        assert_eq!(config.status_cache_ttl, Duration::from_secs(300));
    }

    #[test]
    fn test_each_address_is_required() {
        for missing in [INTAKE_ADDR, COMPUTE_ADDR, CACHE_ADDR] {
            let pairs: Vec<(&str, &str)> = ADDRS
                .iter()
                .copied()
                .filter(|(name, _)| *name != missing)
                .collect();

            let result = Config::from_lookup(lookup_from(&pairs));

            assert_eq!(result.unwrap_err(), ConfigError::Missing(missing));
        }
    }

    #[test]
    fn test_overrides() {
        let mut pairs = ADDRS.to_vec();
        pairs.extend([
            ("QUEUE_CAPACITY", "8"),
            ("WORKER_COUNT", "2"),
            ("ADMISSION_TIMEOUT_MS", "250"),
            ("REPORT_ATTEMPTS", "0"),
            ("RECONCILE_MAX_ATTEMPTS", "7"),
        ]);

        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();

        assert_eq!(config.queue_capacity, 8);
        assert_eq!(config.worker_count, 2);
        assert_eq!(config.admission_timeout, Duration::from_millis(250));
        assert_eq!(config.report_attempts, 1, "at least one attempt is always made");
        assert_eq!(config.reconcile_max_attempts, 7);
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        let mut pairs = ADDRS.to_vec();
        pairs.push(("WORKER_COUNT", "many"));
        assert!(matches!(
            Config::from_lookup(lookup_from(&pairs)),
            Err(ConfigError::Invalid { name: "WORKER_COUNT", .. })
        ));

        let mut pairs = ADDRS.to_vec();
        pairs.push(("QUEUE_CAPACITY", "0"));
        assert!(matches!(
            Config::from_lookup(lookup_from(&pairs)),
            Err(ConfigError::Invalid { name: "QUEUE_CAPACITY", .. })
        ));

        let mut pairs = ADDRS.to_vec();
        pairs.push(("WORKER_COUNT", "0"));
        assert!(matches!(
            Config::from_lookup(lookup_from(&pairs)),
            Err(ConfigError::Invalid { name: "WORKER_COUNT", .. })
        ));
    }

    #[test]
    fn test_http_timeout_must_exceed_admission_window() {
        let mut pairs = ADDRS.to_vec();
        pairs.push(("HTTP_TIMEOUT_MS", "5000"));
        assert!(matches!(
            Config::from_lookup(lookup_from(&pairs)),
            Err(ConfigError::Invalid { name: "HTTP_TIMEOUT_MS", .. })
        ));

        let mut pairs = ADDRS.to_vec();
        pairs.extend([("ADMISSION_TIMEOUT_MS", "1000"), ("HTTP_TIMEOUT_MS", "3000")]);
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.http_timeout, Duration::from_secs(3));
    }
}
