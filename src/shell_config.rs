use std::{env, time::Duration};

use url::Url;

use crate::{
    BACKEND_TIMEOUT_ENV, BACKEND_TIMEOUT_MAX_MS, BACKEND_TIMEOUT_MIN_MS, BACKEND_URL_ENV,
    DEFAULT_BACKEND_TIMEOUT_MS, DEFAULT_BACKEND_URL, DEFAULT_HEALTH_PATH,
    DEFAULT_READY_POLL_INTERVAL_MS, DEFAULT_READY_PROBE_TIMEOUT_MS, HEALTH_PATH_ENV,
    READY_POLL_INTERVAL_ENV, READY_POLL_INTERVAL_MAX_MS, READY_POLL_INTERVAL_MIN_MS,
    READY_PROBE_TIMEOUT_ENV, READY_PROBE_TIMEOUT_MAX_MS, READY_PROBE_TIMEOUT_MIN_MS,
};

/// Endpoints and timing for one application run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ShellConfig {
    pub(crate) backend_url: String,
    pub(crate) health_url: String,
    pub(crate) backend_timeout: Duration,
    pub(crate) poll_interval: Duration,
    pub(crate) probe_timeout: Duration,
}

impl ShellConfig {
    pub(crate) fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend_url = normalize_backend_url(
            lookup(BACKEND_URL_ENV).as_deref().unwrap_or(DEFAULT_BACKEND_URL),
            DEFAULT_BACKEND_URL,
        );
        let health_url = resolve_health_url(
            &backend_url,
            lookup(HEALTH_PATH_ENV).as_deref().unwrap_or(DEFAULT_HEALTH_PATH),
        );

        Self {
            backend_url,
            health_url,
            backend_timeout: parse_clamped_duration_ms(
                lookup(BACKEND_TIMEOUT_ENV).as_deref(),
                DEFAULT_BACKEND_TIMEOUT_MS,
                BACKEND_TIMEOUT_MIN_MS,
                BACKEND_TIMEOUT_MAX_MS,
            ),
            poll_interval: parse_clamped_duration_ms(
                lookup(READY_POLL_INTERVAL_ENV).as_deref(),
                DEFAULT_READY_POLL_INTERVAL_MS,
                READY_POLL_INTERVAL_MIN_MS,
                READY_POLL_INTERVAL_MAX_MS,
            ),
            probe_timeout: parse_clamped_duration_ms(
                lookup(READY_PROBE_TIMEOUT_ENV).as_deref(),
                DEFAULT_READY_PROBE_TIMEOUT_MS,
                READY_PROBE_TIMEOUT_MIN_MS,
                READY_PROBE_TIMEOUT_MAX_MS,
            ),
        }
    }
}

pub(crate) fn normalize_backend_url(raw: &str, fallback: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return fallback.to_string();
    }

    match Url::parse(trimmed) {
        Ok(mut parsed) if matches!(parsed.scheme(), "http" | "https") => {
            if parsed.path().is_empty() {
                parsed.set_path("/");
            }
            parsed.to_string()
        }
        _ => fallback.to_string(),
    }
}

pub(crate) fn resolve_health_url(backend_url: &str, raw_path: &str) -> String {
    let trimmed = raw_path.trim();
    let path = if trimmed.is_empty() {
        DEFAULT_HEALTH_PATH
    } else {
        trimmed
    };
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };

    match Url::parse(backend_url).and_then(|base| base.join(&path)) {
        Ok(url) => url.to_string(),
        Err(_) => format!("{}{}", backend_url.trim_end_matches('/'), path),
    }
}

pub(crate) fn parse_clamped_duration_ms(
    raw: Option<&str>,
    default_ms: u64,
    min_ms: u64,
    max_ms: u64,
) -> Duration {
    let parsed = raw
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(default_ms);
    Duration::from_millis(parsed.clamp(min_ms, max_ms))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> ShellConfig {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        ShellConfig::from_lookup(|key| values.get(key).cloned())
    }

    #[test]
    fn defaults_point_at_local_backend() {
        let config = config_from(&[]);
        assert_eq!(config.backend_url, "http://127.0.0.1:8080/");
        assert_eq!(
            config.health_url,
            "http://127.0.0.1:8080/api/presets"
        );
        assert_eq!(config.backend_timeout, Duration::from_secs(20));
        assert_eq!(config.poll_interval, Duration::from_millis(400));
    }

    #[test]
    fn normalize_backend_url_adds_root_path_and_rejects_other_schemes() {
        assert_eq!(
            normalize_backend_url("http://localhost:9000", DEFAULT_BACKEND_URL),
            "http://localhost:9000/"
        );
        assert_eq!(
            normalize_backend_url("file:///tmp/index.html", DEFAULT_BACKEND_URL),
            DEFAULT_BACKEND_URL
        );
        assert_eq!(
            normalize_backend_url("   ", DEFAULT_BACKEND_URL),
            DEFAULT_BACKEND_URL
        );
    }

    #[test]
    fn health_path_override_is_joined_onto_backend_origin() {
        let config = config_from(&[
            (BACKEND_URL_ENV, "http://127.0.0.1:9100/app/"),
            (HEALTH_PATH_ENV, "healthz"),
        ]);
        assert_eq!(config.health_url, "http://127.0.0.1:9100/healthz");
    }

    #[test]
    fn timing_overrides_are_clamped() {
        let config = config_from(&[
            (BACKEND_TIMEOUT_ENV, "10"),
            (READY_POLL_INTERVAL_ENV, "999999"),
            (READY_PROBE_TIMEOUT_ENV, "not-a-number"),
        ]);
        assert_eq!(
            config.backend_timeout,
            Duration::from_millis(BACKEND_TIMEOUT_MIN_MS)
        );
        assert_eq!(
            config.poll_interval,
            Duration::from_millis(READY_POLL_INTERVAL_MAX_MS)
        );
        assert_eq!(
            config.probe_timeout,
            Duration::from_millis(DEFAULT_READY_PROBE_TIMEOUT_MS)
        );
    }
}
