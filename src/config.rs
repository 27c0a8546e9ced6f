use std::env;
use std::time::Duration;

use crate::eligibility::EligibilityThreshold;

pub const DEFAULT_BASE_URL: &str = "https://fbref.com";

/// Runtime knobs, read once at startup and passed down by value.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base_url: String,
    pub fetch_parallelism: usize,
    pub request_timeout: Duration,
    /// `None` disables the on-disk page cache.
    pub page_cache_ttl: Option<Duration>,
    pub threshold: EligibilityThreshold,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            fetch_parallelism: 6,
            request_timeout: Duration::from_secs(10),
            page_cache_ttl: Some(Duration::from_secs(3600)),
            threshold: EligibilityThreshold::default(),
        }
    }
}

impl Settings {
    /// Load `.env.local` / `.env` if present, then read the environment.
    pub fn load() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_env()
    }

    pub fn from_env() -> Self {
        let defaults = Settings::default();
        let base_url = env::var("FBREF_BASE_URL")
            .ok()
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.base_url);
        let fetch_parallelism = env_parse::<usize>("FETCH_PARALLELISM")
            .unwrap_or(defaults.fetch_parallelism)
            .clamp(2, 32);
        let request_timeout = env_parse::<u64>("REQUEST_TIMEOUT_SECS")
            .map(|secs| Duration::from_secs(secs.clamp(1, 120)))
            .unwrap_or(defaults.request_timeout);
        let page_cache_ttl = match env_parse::<u64>("PAGE_CACHE_TTL_SECS") {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => defaults.page_cache_ttl,
        };
        let threshold = EligibilityThreshold {
            min_appearances: env_parse::<f64>("MIN_APPEARANCES")
                .unwrap_or(defaults.threshold.min_appearances),
            min_minutes: env_parse::<f64>("MIN_MINUTES").unwrap_or(defaults.threshold.min_minutes),
        };
        Self {
            base_url,
            fetch_parallelism,
            request_timeout,
            page_cache_ttl,
            threshold,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|val| val.trim().parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let settings = Settings::default();
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.fetch_parallelism, 6);
        assert_eq!(settings.request_timeout, Duration::from_secs(10));
        assert_eq!(settings.page_cache_ttl, Some(Duration::from_secs(3600)));
        assert_eq!(settings.threshold.min_appearances, 5.0);
        assert_eq!(settings.threshold.min_minutes, 150.0);
    }

    #[test]
    fn unset_keys_do_not_parse() {
        assert_eq!(env_parse::<u64>("FBREF_EXPLORER_UNSET_TEST_KEY"), None);
    }
}
