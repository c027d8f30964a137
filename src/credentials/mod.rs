//! ZwiftPower credentials held in a secrets store.
//!
//! The service refuses to start unless both a `username` and a `password`
//! entry exist under the configured keyring service name.

pub mod store;

use std::fmt;

use tracing::{info, instrument};

use crate::error::CredentialError;

pub use store::{KeyringStore, MemoryStore, SecretStore};

/// Keyring key for the ZwiftPower username.
pub const USERNAME_KEY: &str = "username";
/// Keyring key for the ZwiftPower password.
pub const PASSWORD_KEY: &str = "password";

/// ZwiftPower login credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Create credentials from raw values.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Load credentials from `store` under `service`.
    ///
    /// Empty values count as missing.
    #[instrument(skip(store))]
    pub fn load(store: &dyn SecretStore, service: &str) -> Result<Self, CredentialError> {
        let username = non_empty(store.get(service, USERNAME_KEY)?);
        let password = non_empty(store.get(service, PASSWORD_KEY)?);

        match (username, password) {
            (Some(username), Some(password)) => {
                info!(%username, "Loaded ZwiftPower credentials");
                Ok(Self { username, password })
            }
            _ => Err(CredentialError::Missing {
                service: service.to_string(),
            }),
        }
    }

    /// Persist both values to `store` under `service`.
    pub fn store(&self, store: &dyn SecretStore, service: &str) -> Result<(), CredentialError> {
        store.set(service, USERNAME_KEY, &self.username)?;
        store.set(service, PASSWORD_KEY, &self.password)?;
        Ok(())
    }

    /// ZwiftPower username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// ZwiftPower password.
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
