//! Startup checks run before the service touches the network.

use tracing::info;

use crate::config::Config;
use crate::credentials::{Credentials, SecretStore};
use crate::error::{Result, ServiceError};
use crate::zwiftpower::ZwiftPowerClient;

/// Validate config, load credentials from `store` and build the client.
///
/// Every failure here is fatal for the process.
pub fn build_client(config: &Config, store: &dyn SecretStore) -> Result<ZwiftPowerClient> {
    config.validate().map_err(ServiceError::InvalidConfig)?;

    let credentials = Credentials::load(store, &config.keyring_service)?;
    let client = ZwiftPowerClient::new(config, credentials)?;

    info!(
        service = %config.keyring_service,
        base_url = %client.base_url(),
        "ZwiftPower credentials loaded"
    );
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::MemoryStore;
    use crate::error::CredentialError;

    #[test]
    fn builds_client_when_credentials_present() {
        let config = Config::default();
        let store = MemoryStore::with_credentials("zpdatafetch", "rider@example.com", "hunter2");

        let client = build_client(&config, &store).unwrap();
        assert_eq!(client.base_url().as_str(), "https://zwiftpower.com/");
    }

    #[test]
    fn empty_store_is_fatal() {
        let config = Config::default();
        let err = build_client(&config, &MemoryStore::new()).unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Credentials(CredentialError::Missing { ref service }) if service == "zpdatafetch"
        ));
    }

    #[test]
    fn missing_password_is_fatal() {
        let config = Config::default();
        let store = MemoryStore::new();
        store.insert("zpdatafetch", "username", "rider@example.com");

        let err = build_client(&config, &store).unwrap_err();
        assert!(matches!(err, ServiceError::Credentials(CredentialError::Missing { .. })));
    }

    #[test]
    fn credentials_are_read_from_configured_service() {
        let config = Config {
            keyring_service: "other".to_string(),
            ..Config::default()
        };
        let store = MemoryStore::with_credentials("zpdatafetch", "rider@example.com", "hunter2");

        let err = build_client(&config, &store).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Credentials(CredentialError::Missing { ref service }) if service == "other"
        ));
    }

    #[test]
    fn invalid_config_is_checked_before_credentials() {
        let config = Config {
            port: 0,
            ..Config::default()
        };

        let err = build_client(&config, &MemoryStore::new()).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidConfig(_)));
    }
}
