//! Unified error types for the Zwift racing API.

use thiserror::Error;

/// Unified error type for the service.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Credential lookup error.
    #[error("credentials error: {0}")]
    Credentials(#[from] CredentialError),

    /// ZwiftPower fetch error.
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Prometheus recorder could not be installed.
    #[error("metrics error: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),
}

/// Secrets store errors.
#[derive(Error, Debug)]
pub enum CredentialError {
    /// Username or password is absent (or empty) in the secrets store.
    #[error(
        "ZwiftPower credentials not found in system keyring.\n\
         Run: zwift-racing-api set-credentials --username <name>\n\
         or set manually:\n  \
         keyring set {service} username\n  \
         keyring set {service} password"
    )]
    Missing {
        /// Keyring service name that was queried.
        service: String,
    },

    /// The platform secrets backend failed.
    #[error("secrets store failure: {0}")]
    Backend(String),
}

impl From<keyring::Error> for CredentialError {
    fn from(err: keyring::Error) -> Self {
        CredentialError::Backend(err.to_string())
    }
}

/// Errors raised while talking to ZwiftPower.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The login page did not contain a form to submit.
    #[error("ZwiftPower login page did not contain a login form")]
    LoginFormMissing,

    /// Credentials were rejected.
    #[error("ZwiftPower login failed for user {username}")]
    LoginFailed {
        /// Username that was rejected.
        username: String,
    },

    /// Upstream answered with an unexpected status.
    #[error("ZwiftPower request to {url} failed: HTTP {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// Upstream body could not be parsed as JSON.
    #[error("failed to parse ZwiftPower response: {0}")]
    Parse(String),

    /// Transport-level failure.
    #[error("ZwiftPower request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A URL could not be built from the configured base.
    #[error("invalid ZwiftPower url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Any other upstream failure, displayed verbatim.
    #[error("{0}")]
    Upstream(String),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, ServiceError>;
