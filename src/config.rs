//! Application configuration loaded from environment variables.

use serde::Deserialize;
use url::Url;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Server Configuration ===
    /// Address the HTTP server binds to.
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    // === ZwiftPower ===
    /// ZwiftPower base URL.
    #[serde(default = "default_zwiftpower_url")]
    pub zwiftpower_url: String,

    /// Keyring service name holding the ZwiftPower username and password.
    #[serde(default = "default_keyring_service")]
    pub keyring_service: String,

    /// Upstream request timeout in milliseconds.
    #[serde(default = "default_http_timeout_ms")]
    pub http_timeout_ms: u64,

    // === Observability ===
    /// Install the Prometheus recorder and serve `/metrics`.
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Emit logs as JSON lines.
    #[serde(default)]
    pub log_json: bool,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_zwiftpower_url() -> String {
    "https://zwiftpower.com".to_string()
}

fn default_keyring_service() -> String {
    "zpdatafetch".to_string()
}

fn default_http_timeout_ms() -> u64 {
    30_000
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            zwiftpower_url: default_zwiftpower_url(),
            keyring_service: default_keyring_service(),
            http_timeout_ms: default_http_timeout_ms(),
            metrics_enabled: default_true(),
            rust_log: default_log_level(),
            log_json: false,
            verbose: false,
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("PORT must be non-zero".to_string());
        }

        if self.keyring_service.trim().is_empty() {
            return Err("KEYRING_SERVICE must not be empty".to_string());
        }

        if self.http_timeout_ms == 0 {
            return Err("HTTP_TIMEOUT_MS must be greater than 0".to_string());
        }

        match Url::parse(&self.zwiftpower_url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => {
                return Err(format!(
                    "ZWIFTPOWER_URL must be http or https, got {}",
                    url.scheme()
                ))
            }
            Err(e) => return Err(format!("ZWIFTPOWER_URL is not a valid URL: {}", e)),
        }

        Ok(())
    }

    /// Socket address string for the HTTP listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Upstream request timeout.
    pub fn http_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.http_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values_are_sensible() {
        let config = Config::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.keyring_service, "zpdatafetch");
        assert_eq!(config.zwiftpower_url, "https://zwiftpower.com");
        assert!(config.metrics_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_keyring_service() {
        let config = Config {
            keyring_service: "  ".to_string(),
            ..Config::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_http_base_url() {
        let config = Config {
            zwiftpower_url: "ftp://zwiftpower.com".to_string(),
            ..Config::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let config = Config {
            http_timeout_ms: 0,
            ..Config::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn bind_addr_joins_host_and_port() {
        let config = Config {
            host: "0.0.0.0".to_string(),
            port: 9000,
            ..Config::default()
        };

        assert_eq!(config.bind_addr(), "0.0.0.0:9000");
    }
}
