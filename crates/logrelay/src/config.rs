// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::errors::ConfigError;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_PORT: u16 = 5001;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_ADMIN_API_URL: &str = "http://127.0.0.1:8000/api/admin";
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration for the relay service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Interface the UDP socket binds to
    pub host: String,
    /// UDP listen port, from the first CLI argument
    pub port: u16,
    /// Base URL of the admin API; endpoint names are appended to it
    pub admin_api_url: String,
    /// Directory holding the dated transcript files
    pub transcript_dir: PathBuf,
    /// Timeout applied to every admin API request
    pub http_timeout: Duration,
    /// HTTPS proxy URL
    pub https_proxy: Option<String>,
    /// Log level (e.g., trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            admin_api_url: DEFAULT_ADMIN_API_URL.to_string(),
            transcript_dir: PathBuf::from("."),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            https_proxy: None,
            log_level: "info".to_string(),
        }
    }
}

/// Parses the optional port argument. No argument means [`DEFAULT_PORT`].
pub fn parse_port_arg(arg: Option<&str>) -> Result<u16, ConfigError> {
    match arg {
        None => Ok(DEFAULT_PORT),
        Some(arg) => arg.parse::<u16>().map_err(|source| ConfigError::InvalidPort {
            arg: arg.to_string(),
            source,
        }),
    }
}

impl RelayConfig {
    /// Create configuration from the process arguments and environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let port_arg = env::args().nth(1);
        Self::from_sources(port_arg.as_deref(), |key| env::var(key).ok())
    }

    /// Builds the configuration from a port argument and a variable lookup.
    ///
    /// Only the port argument can fail. Environment overrides are optional: an invalid one
    /// is logged and replaced by its default.
    pub fn from_sources(
        port_arg: Option<&str>,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = parse_port_arg(port_arg)?;
        let admin_api_url = or_default(
            var("LOGRELAY_ADMIN_API_URL").map(parse_admin_api_url),
            defaults.admin_api_url,
        );
        let transcript_dir = var("LOGRELAY_TRANSCRIPT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.transcript_dir);
        let http_timeout = or_default(
            var("LOGRELAY_HTTP_TIMEOUT_SECS").map(parse_http_timeout),
            defaults.http_timeout,
        );
        let https_proxy = var("LOGRELAY_PROXY_HTTPS").or_else(|| var("HTTPS_PROXY"));
        let log_level = or_default(
            var("LOGRELAY_LOG_LEVEL").map(parse_log_level),
            defaults.log_level,
        );

        Ok(Self {
            host: defaults.host,
            port,
            admin_api_url,
            transcript_dir,
            http_timeout,
            https_proxy,
            log_level,
        })
    }

    /// Log level from the environment, for setting up logging before the rest of the
    /// configuration is read. Invalid values silently give the default.
    pub fn log_level_from_env() -> String {
        env::var("LOGRELAY_LOG_LEVEL")
            .ok()
            .and_then(|level| parse_log_level(level).ok())
            .unwrap_or_else(|| Self::default().log_level)
    }
}

fn or_default<T>(value: Option<Result<T, ConfigError>>, default: T) -> T {
    match value {
        Some(Ok(value)) => value,
        Some(Err(e)) => {
            warn!("{e}. Falling back to the default value");
            default
        }
        None => default,
    }
}

fn parse_admin_api_url(url: String) -> Result<String, ConfigError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(url)
    } else {
        Err(ConfigError::InvalidConfig(format!(
            "LOGRELAY_ADMIN_API_URL must be an http(s) URL, got '{url}'"
        )))
    }
}

fn parse_http_timeout(secs: String) -> Result<Duration, ConfigError> {
    match secs.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::InvalidConfig(
            "LOGRELAY_HTTP_TIMEOUT_SECS must be greater than 0".to_string(),
        )),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(_) => Err(ConfigError::InvalidConfig(format!(
            "LOGRELAY_HTTP_TIMEOUT_SECS must be a whole number of seconds, got '{secs}'"
        ))),
    }
}

fn parse_log_level(level: String) -> Result<String, ConfigError> {
    let level = level.to_lowercase();
    if VALID_LOG_LEVELS.contains(&level.as_str()) {
        Ok(level)
    } else {
        Err(ConfigError::InvalidConfig(format!(
            "Invalid log level '{level}'. Must be one of: trace, debug, info, warn, error"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tracing_test::traced_test;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = RelayConfig::default();
        assert_eq!(config.port, 5001);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.admin_api_url, "http://127.0.0.1:8000/api/admin");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_port_arg() {
        assert_eq!(parse_port_arg(None).unwrap(), 5001);
        assert_eq!(parse_port_arg(Some("27500")).unwrap(), 27500);
        assert_eq!(parse_port_arg(Some("0")).unwrap(), 0);
        assert!(parse_port_arg(Some("abc")).is_err());
        assert!(parse_port_arg(Some("-1")).is_err());
        assert!(parse_port_arg(Some("70000")).is_err());
        assert!(parse_port_arg(Some("")).is_err());
    }

    #[test]
    fn test_from_sources_without_environment_matches_defaults() {
        let config = RelayConfig::from_sources(None, lookup(&[])).unwrap();
        assert_eq!(config, RelayConfig::default());
    }

    #[test]
    fn test_from_sources_reads_overrides() {
        let config = RelayConfig::from_sources(
            Some("6000"),
            lookup(&[
                ("LOGRELAY_ADMIN_API_URL", "https://admin.example.com/api/admin"),
                ("LOGRELAY_TRANSCRIPT_DIR", "/var/log/relay"),
                ("LOGRELAY_HTTP_TIMEOUT_SECS", "12"),
                ("HTTPS_PROXY", "http://proxy:3128"),
                ("LOGRELAY_LOG_LEVEL", "DEBUG"),
            ]),
        )
        .unwrap();

        assert_eq!(config.port, 6000);
        assert_eq!(config.admin_api_url, "https://admin.example.com/api/admin");
        assert_eq!(config.transcript_dir, PathBuf::from("/var/log/relay"));
        assert_eq!(config.http_timeout, Duration::from_secs(12));
        assert_eq!(config.https_proxy.as_deref(), Some("http://proxy:3128"));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_relay_proxy_takes_precedence() {
        let config = RelayConfig::from_sources(
            None,
            lookup(&[
                ("LOGRELAY_PROXY_HTTPS", "http://relay-proxy:3128"),
                ("HTTPS_PROXY", "http://proxy:3128"),
            ]),
        )
        .unwrap();
        assert_eq!(config.https_proxy.as_deref(), Some("http://relay-proxy:3128"));
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = RelayConfig::from_sources(Some("not-a-port"), lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort { .. }));
    }

    #[test]
    #[traced_test]
    fn test_invalid_overrides_fall_back_to_defaults() {
        for (key, value) in [
            ("LOGRELAY_ADMIN_API_URL", "ftp://example.com"),
            ("LOGRELAY_ADMIN_API_URL", "localhost:8000"),
            ("LOGRELAY_HTTP_TIMEOUT_SECS", "0"),
            ("LOGRELAY_HTTP_TIMEOUT_SECS", "soon"),
            ("LOGRELAY_LOG_LEVEL", "verbose"),
        ] {
            let config = RelayConfig::from_sources(Some("5001"), lookup(&[(key, value)]))
                .unwrap_or_else(|e| panic!("{key}={value} should not be fatal: {e}"));
            assert_eq!(config, RelayConfig::default(), "{key}={value}");
        }
        assert!(logs_contain("Invalid log level 'verbose'"));
        assert!(logs_contain("Falling back to the default value"));
    }

    #[test]
    fn test_invalid_override_keeps_the_valid_ones() {
        let config = RelayConfig::from_sources(
            Some("6000"),
            lookup(&[
                ("LOGRELAY_LOG_LEVEL", "verbose"),
                ("LOGRELAY_HTTP_TIMEOUT_SECS", "9"),
                ("HTTPS_PROXY", "::bad proxy::"),
            ]),
        )
        .unwrap();

        assert_eq!(config.port, 6000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.http_timeout, Duration::from_secs(9));
        // proxy URLs are checked when the HTTP client is built
        assert_eq!(config.https_proxy.as_deref(), Some("::bad proxy::"));
    }

    #[test]
    fn test_valid_log_levels() {
        for level in VALID_LOG_LEVELS {
            assert_eq!(parse_log_level(level.to_uppercase()).unwrap(), level);
        }
    }
}
