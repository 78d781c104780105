//! Settings persistence and shared helpers for Strata Voice.

pub mod keystore;
pub mod path_processing;
pub mod settings;
pub mod text_processing;

pub use keystore::{
    EnvironmentVault, InMemoryVault, KeychainVault, KeystoreError, SECRETS_BACKEND_ENV_VAR, SecretVault, SecretsBackend,
    secrets_backend,
};
pub use path_processing::expand_tilde;
pub use settings::{AppSettings, SETTINGS_PATH_ENV, SettingKey, SettingsError, SettingsStore, default_settings_path};
pub use text_processing::{mask_secret, redact_sensitive};
