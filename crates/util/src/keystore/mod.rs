//! Secure storage for credential settings.
//!
//! Credentials never land in the settings JSON file. They are kept either in
//! the OS keychain (via `keyring`) or, for CI and headless machines, read
//! from process environment variables.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tracing::debug;

use crate::settings::SettingKey;

static SERVICE: &str = "strata-voice";
/// Environment variable used to select the secret resolution backend.
pub const SECRETS_BACKEND_ENV_VAR: &str = "STRATA_SECRETS_BACKEND";

/// Secret resolution backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretsBackend {
    /// Store and resolve credentials through the OS keychain.
    Keychain,
    /// Resolve credentials from process environment variables; never write.
    Environment,
}

impl SecretsBackend {
    fn from_env_var(raw: Option<String>) -> Self {
        match raw.unwrap_or_default().trim().to_ascii_lowercase().as_str() {
            "env" => Self::Environment,
            _ => Self::Keychain,
        }
    }

    /// Build the vault implementing this backend.
    pub fn vault(self) -> Arc<dyn SecretVault> {
        match self {
            Self::Keychain => Arc::new(KeychainVault),
            Self::Environment => Arc::new(EnvironmentVault),
        }
    }
}

/// Determine the currently configured secrets backend.
pub fn secrets_backend() -> SecretsBackend {
    let configured_value = std::env::var(SECRETS_BACKEND_ENV_VAR).ok();
    SecretsBackend::from_env_var(configured_value)
}

/// Errors raised by a secret vault.
#[derive(Debug, Error, Clone)]
pub enum KeystoreError {
    #[error("Keyring error for {name}: {error}")]
    Keyring { name: String, error: String },
}

/// Storage for the secure subset of the settings.
pub trait SecretVault: Send + Sync {
    /// Read a stored credential. `Ok(None)` means nothing is stored.
    fn load(&self, key: SettingKey) -> Result<Option<String>, KeystoreError>;

    /// Persist a credential, replacing any previous value.
    fn store(&self, key: SettingKey, value: &str) -> Result<(), KeystoreError>;

    /// Forget a credential. Removing a missing credential is not an error.
    fn remove(&self, key: SettingKey) -> Result<(), KeystoreError>;
}

/// OS keychain vault.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeychainVault;

impl KeychainVault {
    fn entry(key: SettingKey) -> Result<keyring::Entry, KeystoreError> {
        keyring::Entry::new(SERVICE, key.as_str()).map_err(|e| KeystoreError::Keyring {
            name: key.as_str().to_string(),
            error: e.to_string(),
        })
    }
}

impl SecretVault for KeychainVault {
    fn load(&self, key: SettingKey) -> Result<Option<String>, KeystoreError> {
        match Self::entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(KeystoreError::Keyring {
                name: key.as_str().to_string(),
                error: e.to_string(),
            }),
        }
    }

    fn store(&self, key: SettingKey, value: &str) -> Result<(), KeystoreError> {
        Self::entry(key)?.set_password(value).map_err(|e| KeystoreError::Keyring {
            name: key.as_str().to_string(),
            error: e.to_string(),
        })?;
        debug!("Stored secret in keychain: {}", key.as_str());
        Ok(())
    }

    fn remove(&self, key: SettingKey) -> Result<(), KeystoreError> {
        match Self::entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => {
                debug!("Removed secret from keychain: {}", key.as_str());
                Ok(())
            }
            Err(e) => Err(KeystoreError::Keyring {
                name: key.as_str().to_string(),
                error: e.to_string(),
            }),
        }
    }
}

/// Read-only vault backed by process environment variables.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvironmentVault;

impl SecretVault for EnvironmentVault {
    fn load(&self, key: SettingKey) -> Result<Option<String>, KeystoreError> {
        let Some(variable) = key.secret_env_var() else {
            return Ok(None);
        };
        Ok(std::env::var(variable).ok().filter(|value| !value.is_empty()))
    }

    fn store(&self, key: SettingKey, _value: &str) -> Result<(), KeystoreError> {
        debug!(
            "Environment secrets backend is read-only; not persisting {}",
            key.as_str()
        );
        Ok(())
    }

    fn remove(&self, _key: SettingKey) -> Result<(), KeystoreError> {
        Ok(())
    }
}

/// Process-local vault for ephemeral stores and tests.
#[derive(Debug, Default)]
pub struct InMemoryVault {
    values: Mutex<HashMap<SettingKey, String>>,
}

impl SecretVault for InMemoryVault {
    fn load(&self, key: SettingKey) -> Result<Option<String>, KeystoreError> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(&key).cloned())
    }

    fn store(&self, key: SettingKey, value: &str) -> Result<(), KeystoreError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: SettingKey) -> Result<(), KeystoreError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.remove(&key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secrets_backend_defaults_to_keychain_when_env_var_is_missing() {
        temp_env::with_var(SECRETS_BACKEND_ENV_VAR, None::<&str>, || {
            assert_eq!(secrets_backend(), SecretsBackend::Keychain);
        });
    }

    #[test]
    fn secrets_backend_uses_environment_when_configured() {
        temp_env::with_var(SECRETS_BACKEND_ENV_VAR, Some("ENV"), || {
            assert_eq!(secrets_backend(), SecretsBackend::Environment);
        });
    }

    #[test]
    fn environment_vault_reads_mapped_variable() {
        temp_env::with_var("STRATA_MCP_TOKEN", Some("token-from-env"), || {
            let vault = EnvironmentVault;
            let value = vault.load(SettingKey::McpToken).unwrap();
            assert_eq!(value.as_deref(), Some("token-from-env"));
        });
    }

    #[test]
    fn environment_vault_ignores_empty_variable_and_never_writes() {
        temp_env::with_var("STRATA_CF_CLIENT_ID", Some(""), || {
            let vault = EnvironmentVault;
            vault.store(SettingKey::CfClientId, "ignored").unwrap();
            assert_eq!(vault.load(SettingKey::CfClientId).unwrap(), None);
        });
    }

    #[test]
    fn in_memory_vault_round_trips_and_removes() {
        let vault = InMemoryVault::default();
        vault.store(SettingKey::CfClientSecret, "s3cret").unwrap();
        assert_eq!(vault.load(SettingKey::CfClientSecret).unwrap().as_deref(), Some("s3cret"));

        vault.remove(SettingKey::CfClientSecret).unwrap();
        assert_eq!(vault.load(SettingKey::CfClientSecret).unwrap(), None);
    }
}
