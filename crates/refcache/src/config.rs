use std::{env, str::FromStr, time::Duration};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base TTL in seconds for cached entries (default: 900)
    pub cache_ttl_seconds: u64,
    /// Interval between expiry sweeps of the memory cache (default: 300)
    pub sweep_interval_seconds: u64,
    /// Individual entries cached per repository during warm-up (default: 100)
    pub warm_limit: usize,
    /// Warm every cache before serving (default: true)
    pub warm_on_startup: bool,
    /// Interval between refreshes of the hottest reference tables (default: 600)
    pub refresh_interval_seconds: u64,
    /// Redis connection URL (default: "redis://localhost:6379")
    /// Note: Only used when the `redis` feature is enabled.
    #[allow(dead_code)]
    pub redis_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CACHE_TTL_SECONDS` - Base cache TTL in seconds (default: 900)
    /// - `CACHE_SWEEP_INTERVAL_SECONDS` - Expiry sweep interval (default: 300)
    /// - `CACHE_WARM_LIMIT` - Entries per repository on warm-up (default: 100)
    /// - `CACHE_WARM_ON_STARTUP` - Warm caches at startup (default: true)
    /// - `CACHE_REFRESH_INTERVAL_SECONDS` - Hot data refresh interval (default: 600)
    /// - `REDIS_URL` - Redis connection URL (default: "redis://localhost:6379")
    ///
    /// Values that fail to parse fall back to the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            cache_ttl_seconds: parse_or(lookup("CACHE_TTL_SECONDS"), 900),
            sweep_interval_seconds: parse_or(lookup("CACHE_SWEEP_INTERVAL_SECONDS"), 300),
            warm_limit: parse_or(lookup("CACHE_WARM_LIMIT"), 100),
            warm_on_startup: lookup("CACHE_WARM_ON_STARTUP")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(true),
            refresh_interval_seconds: parse_or(lookup("CACHE_REFRESH_INTERVAL_SECONDS"), 600),
            redis_url: lookup("REDIS_URL")
                .unwrap_or_else(|| "redis://localhost:6379".to_string()),
        }
    }

    /// Get cache TTL as a Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    /// Sweep interval as a Duration. Never zero.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds.max(1))
    }

    /// Refresh interval as a Duration. Never zero.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_seconds.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
