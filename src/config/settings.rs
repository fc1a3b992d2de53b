// src/config/settings.rs
//! Runtime settings for the binary, read from the environment (`.env` supported).

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_OUTPUT_PATH: &str = "CLEAN_NEWS_OUTPUT_PATH";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "CLEAN_NEWS_FETCH_TIMEOUT_SECS";
pub const ENV_SERVE_ADDR: &str = "CLEAN_NEWS_SERVE_ADDR";
pub const ENV_REFRESH_SECS: &str = "CLEAN_NEWS_REFRESH_SECS";
pub const ENV_LOG_JSON: &str = "CLEAN_NEWS_LOG_JSON";

pub const DEFAULT_OUTPUT_PATH: &str = "index.html";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_SERVE_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_REFRESH_SECS: u64 = 1800;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub output_path: PathBuf,
    pub fetch_timeout: Duration,
    pub serve_addr: SocketAddr,
    pub refresh_interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Invalid values fall back to defaults with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let output_path = lookup(ENV_OUTPUT_PATH)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH));

        let fetch_timeout = Duration::from_secs(parse_secs(
            ENV_FETCH_TIMEOUT_SECS,
            lookup(ENV_FETCH_TIMEOUT_SECS),
            DEFAULT_FETCH_TIMEOUT_SECS,
        ));
        let refresh_interval = Duration::from_secs(parse_secs(
            ENV_REFRESH_SECS,
            lookup(ENV_REFRESH_SECS),
            DEFAULT_REFRESH_SECS,
        ));

        let default_addr: SocketAddr = ([127, 0, 0, 1], 8080).into();
        let serve_addr = match lookup(ENV_SERVE_ADDR) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "invalid {ENV_SERVE_ADDR}, using {DEFAULT_SERVE_ADDR}");
                default_addr
            }),
            None => default_addr,
        };

        Self {
            output_path,
            fetch_timeout,
            serve_addr,
            refresh_interval,
        }
    }
}

/// `CLEAN_NEWS_LOG_JSON=1` selects JSON log lines. Read on its own so tracing
/// can be up before `Settings` parsing has anything to warn about.
pub fn log_json_from_env() -> bool {
    log_json_from(std::env::var(ENV_LOG_JSON).ok())
}

fn log_json_from(raw: Option<String>) -> bool {
    raw.is_some_and(|v| v.trim() == "1")
}

// positive integer seconds; zero or garbage → default
fn parse_secs(key: &str, raw: Option<String>, default: u64) -> u64 {
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse::<u64>() {
        Ok(v) if v > 0 => v,
        _ => {
            tracing::warn!(value = %raw, "invalid {key}, using {default}");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let m: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| m.get(k).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let s = Settings::default();
        assert_eq!(s.output_path, PathBuf::from("index.html"));
        assert_eq!(s.fetch_timeout, Duration::from_secs(15));
        assert_eq!(s.refresh_interval, Duration::from_secs(1800));
        assert_eq!(s.serve_addr.to_string(), DEFAULT_SERVE_ADDR);
    }

    #[test]
    fn overrides_and_invalid_values() {
        let s = Settings::from_lookup(lookup_from(&[
            (ENV_OUTPUT_PATH, "public/out.html"),
            (ENV_FETCH_TIMEOUT_SECS, "5"),
            (ENV_REFRESH_SECS, "0"),
            (ENV_SERVE_ADDR, "not-an-addr"),
        ]));
        assert_eq!(s.output_path, PathBuf::from("public/out.html"));
        assert_eq!(s.fetch_timeout, Duration::from_secs(5));
        assert_eq!(s.refresh_interval, Duration::from_secs(DEFAULT_REFRESH_SECS));
        assert_eq!(s.serve_addr.to_string(), DEFAULT_SERVE_ADDR);
    }

    #[test]
    fn log_json_flag() {
        assert!(log_json_from(Some(" 1 ".into())));
        assert!(!log_json_from(Some("true".into())));
        assert!(!log_json_from(None));
    }

    #[test]
    fn valid_serve_addr_is_used() {
        let s = Settings::from_lookup(lookup_from(&[(ENV_SERVE_ADDR, "0.0.0.0:9000")]));
        assert_eq!(s.serve_addr.to_string(), "0.0.0.0:9000");
    }
}
