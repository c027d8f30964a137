//! Secrets store backends.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::debug;

use crate::error::CredentialError;

/// A key/value secrets store addressed by service name and key name.
pub trait SecretStore: Send + Sync {
    /// Read a secret. A missing entry is `Ok(None)`.
    fn get(&self, service: &str, key: &str) -> Result<Option<String>, CredentialError>;

    /// Write a secret, replacing any previous value.
    fn set(&self, service: &str, key: &str, value: &str) -> Result<(), CredentialError>;
}

/// OS keyring (macOS Keychain, Windows Credential Manager, Linux keyutils
/// persisted to the Secret Service).
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyringStore;

impl KeyringStore {
    /// Create a keyring-backed store.
    pub fn new() -> Self {
        Self
    }
}

impl SecretStore for KeyringStore {
    fn get(&self, service: &str, key: &str) -> Result<Option<String>, CredentialError> {
        let entry = keyring::Entry::new(service, key)?;
        match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => {
                debug!(service, key, "No keyring entry");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, service: &str, key: &str, value: &str) -> Result<(), CredentialError> {
        let entry = keyring::Entry::new(service, key)?;
        entry.set_password(value)?;
        Ok(())
    }
}

/// In-process secrets store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<(String, String), String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with a username and password.
    pub fn with_credentials(service: &str, username: &str, password: &str) -> Self {
        let store = Self::new();
        store.insert(service, "username", username);
        store.insert(service, "password", password);
        store
    }

    /// Insert a value.
    pub fn insert(&self, service: &str, key: &str, value: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert((service.to_string(), key.to_string()), value.to_string());
    }
}

impl SecretStore for MemoryStore {
    fn get(&self, service: &str, key: &str) -> Result<Option<String>, CredentialError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries
            .get(&(service.to_string(), key.to_string()))
            .cloned())
    }

    fn set(&self, service: &str, key: &str, value: &str) -> Result<(), CredentialError> {
        self.insert(service, key, value);
        Ok(())
    }
}
