//! Application settings persistence for Strata Voice.
//!
//! Settings are a flat key-value record. Plain values are written to a JSON
//! file in the standard configuration directory
//! (`~/.config/strata/settings.json` on most platforms); credentials are
//! routed to a [`SecretVault`] and never appear in that file. The store is
//! safe to share between threads thanks to the internal `Mutex`.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use dirs_next::config_dir;
use serde::{Deserialize, Serialize};
use strata_types::{ClientConfig, PttMode};
use thiserror::Error;
use tracing::warn;

use crate::expand_tilde;
use crate::keystore::{InMemoryVault, KeystoreError, SecretVault, secrets_backend};
use crate::text_processing::mask_secret;

/// Environment variable allowing callers to override the settings file path.
pub const SETTINGS_PATH_ENV: &str = "STRATA_SETTINGS_PATH";

/// Default filename for the JSON payload.
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Backend provider selected when nothing else is stored.
pub const DEFAULT_BACKEND_PROVIDER: &str = "n8n";

/// Error surfaced when reading or writing settings fails.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// I/O failure (for example, permissions or missing directory).
    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization or deserialization failure.
    #[error("settings serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// The secure store rejected a read or write.
    #[error("settings keystore error: {0}")]
    Keystore(#[from] KeystoreError),
    /// The key is not a known setting.
    #[error("unknown setting '{0}'")]
    UnknownKey(String),
    /// The value cannot be stored under the key.
    #[error("invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Every key understood by the settings store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    ActiveBackendProvider,
    McpUrl,
    McpToken,
    CfClientId,
    CfClientSecret,
    SelectedWorkflowId,
    TtsVoiceId,
    PttMode,
}

impl SettingKey {
    pub const ALL: [SettingKey; 8] = [
        SettingKey::ActiveBackendProvider,
        SettingKey::McpUrl,
        SettingKey::McpToken,
        SettingKey::CfClientId,
        SettingKey::CfClientSecret,
        SettingKey::SelectedWorkflowId,
        SettingKey::TtsVoiceId,
        SettingKey::PttMode,
    ];

    /// Key name as it appears in the settings file.
    pub fn as_str(self) -> &'static str {
        match self {
            SettingKey::ActiveBackendProvider => "activeBackendProvider",
            SettingKey::McpUrl => "n8nMcpUrl",
            SettingKey::McpToken => "n8nMcpToken",
            SettingKey::CfClientId => "cfClientId",
            SettingKey::CfClientSecret => "cfClientSecret",
            SettingKey::SelectedWorkflowId => "selectedWorkflowId",
            SettingKey::TtsVoiceId => "ttsVoiceId",
            SettingKey::PttMode => "pttMode",
        }
    }

    /// Credentials are kept in the secret vault instead of the JSON file.
    pub fn is_secure(self) -> bool {
        self.secret_env_var().is_some()
    }

    /// Environment variable read by the environment secrets backend.
    pub fn secret_env_var(self) -> Option<&'static str> {
        match self {
            SettingKey::McpToken => Some("STRATA_MCP_TOKEN"),
            SettingKey::CfClientId => Some("STRATA_CF_CLIENT_ID"),
            SettingKey::CfClientSecret => Some("STRATA_CF_CLIENT_SECRET"),
            _ => None,
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        SettingKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| SettingsError::UnknownKey(wanted.to_string()))
    }
}

/// Persisted setting values.
///
/// Secure fields are skipped by serde so they cannot leak into the file.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub active_backend_provider: String,
    pub n8n_mcp_url: String,
    #[serde(skip)]
    pub n8n_mcp_token: String,
    #[serde(skip)]
    pub cf_client_id: String,
    #[serde(skip)]
    pub cf_client_secret: String,
    pub selected_workflow_id: String,
    pub tts_voice_id: String,
    pub ptt_mode: PttMode,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            active_backend_provider: DEFAULT_BACKEND_PROVIDER.to_string(),
            n8n_mcp_url: String::new(),
            n8n_mcp_token: String::new(),
            cf_client_id: String::new(),
            cf_client_secret: String::new(),
            selected_workflow_id: String::new(),
            tts_voice_id: String::new(),
            ptt_mode: PttMode::default(),
        }
    }
}

impl fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppSettings")
            .field("active_backend_provider", &self.active_backend_provider)
            .field("n8n_mcp_url", &self.n8n_mcp_url)
            .field("n8n_mcp_token", &mask_secret(&self.n8n_mcp_token))
            .field("cf_client_id", &mask_secret(&self.cf_client_id))
            .field("cf_client_secret", &mask_secret(&self.cf_client_secret))
            .field("selected_workflow_id", &self.selected_workflow_id)
            .field("tts_voice_id", &self.tts_voice_id)
            .field("ptt_mode", &self.ptt_mode)
            .finish()
    }
}

impl AppSettings {
    /// Read a setting as a string.
    pub fn get(&self, key: SettingKey) -> String {
        match key {
            SettingKey::ActiveBackendProvider => self.active_backend_provider.clone(),
            SettingKey::McpUrl => self.n8n_mcp_url.clone(),
            SettingKey::McpToken => self.n8n_mcp_token.clone(),
            SettingKey::CfClientId => self.cf_client_id.clone(),
            SettingKey::CfClientSecret => self.cf_client_secret.clone(),
            SettingKey::SelectedWorkflowId => self.selected_workflow_id.clone(),
            SettingKey::TtsVoiceId => self.tts_voice_id.clone(),
            SettingKey::PttMode => self.ptt_mode.to_string(),
        }
    }

    /// Write a setting from its string form.
    pub fn set(&mut self, key: SettingKey, value: &str) -> Result<(), SettingsError> {
        let value = value.trim().to_string();
        match key {
            SettingKey::ActiveBackendProvider => self.active_backend_provider = value,
            SettingKey::McpUrl => self.n8n_mcp_url = value,
            SettingKey::McpToken => self.n8n_mcp_token = value,
            SettingKey::CfClientId => self.cf_client_id = value,
            SettingKey::CfClientSecret => self.cf_client_secret = value,
            SettingKey::SelectedWorkflowId => self.selected_workflow_id = value,
            SettingKey::TtsVoiceId => self.tts_voice_id = value,
            SettingKey::PttMode => {
                self.ptt_mode = value.parse().map_err(|reason| SettingsError::InvalidValue {
                    key: key.to_string(),
                    reason,
                })?
            }
        }
        Ok(())
    }

    /// Connection parameters for the workflow backend.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.n8n_mcp_url.clone(), self.n8n_mcp_token.clone())
            .with_access_credentials(self.cf_client_id.clone(), self.cf_client_secret.clone())
            .with_workflow(self.selected_workflow_id.clone())
    }
}

/// Thread-safe settings store backed by a JSON file and a secret vault.
pub struct SettingsStore {
    path: PathBuf,
    vault: Arc<dyn SecretVault>,
    settings: Mutex<AppSettings>,
    persist_to_disk: bool,
}

impl fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsStore")
            .field("path", &self.path)
            .field("persist_to_disk", &self.persist_to_disk)
            .finish_non_exhaustive()
    }
}

impl SettingsStore {
    /// Open the store at the default path with the configured secrets backend.
    pub fn open() -> Result<Self, SettingsError> {
        Self::open_at(default_settings_path(), secrets_backend().vault())
    }

    /// Open the store at `path`, resolving credentials through `vault`.
    pub fn open_at(path: impl Into<PathBuf>, vault: Arc<dyn SecretVault>) -> Result<Self, SettingsError> {
        let path = path.into();
        let mut settings = load_settings(&path)?;
        load_secrets(&mut settings, vault.as_ref());
        Ok(Self {
            path,
            vault,
            settings: Mutex::new(settings),
            persist_to_disk: true,
        })
    }

    /// Build an in-memory store used when the config directory cannot be accessed.
    pub fn ephemeral() -> Self {
        Self {
            path: PathBuf::new(),
            vault: Arc::new(InMemoryVault::default()),
            settings: Mutex::new(AppSettings::default()),
            persist_to_disk: false,
        }
    }

    /// Path to the underlying JSON file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy of the current settings.
    pub fn snapshot(&self) -> AppSettings {
        self.lock().clone()
    }

    /// Apply `apply` to the settings and persist the result.
    ///
    /// The in-memory copy is updated even when persisting fails.
    pub fn update<F>(&self, apply: F) -> Result<AppSettings, SettingsError>
    where
        F: FnOnce(&mut AppSettings) -> Result<(), SettingsError>,
    {
        let mut settings = self.lock();
        let mut next = settings.clone();
        apply(&mut next)?;
        *settings = next.clone();
        if self.persist_to_disk {
            self.save_locked(&settings)?;
        }
        Ok(next)
    }

    /// Set a single key from its string form and persist.
    pub fn set(&self, key: SettingKey, value: &str) -> Result<AppSettings, SettingsError> {
        self.update(|settings| settings.set(key, value))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, AppSettings> {
        self.settings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn save_locked(&self, settings: &AppSettings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, data)?;

        for key in SettingKey::ALL.into_iter().filter(|key| key.is_secure()) {
            let value = settings.get(key);
            if value.is_empty() {
                self.vault.remove(key)?;
            } else {
                self.vault.store(key, &value)?;
            }
        }
        Ok(())
    }
}

/// Resolve the settings file path, honoring `STRATA_SETTINGS_PATH`.
pub fn default_settings_path() -> PathBuf {
    if let Ok(path) = env::var(SETTINGS_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return expand_tilde(trimmed);
        }
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("strata")
        .join(SETTINGS_FILE_NAME)
}

fn load_settings(path: &Path) -> Result<AppSettings, SettingsError> {
    match fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str(&data) {
            Ok(settings) => Ok(settings),
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "Failed to parse settings file; using defaults"
                );
                Ok(AppSettings::default())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(AppSettings::default()),
        Err(error) => Err(SettingsError::Io(error)),
    }
}

fn load_secrets(settings: &mut AppSettings, vault: &dyn SecretVault) {
    for key in SettingKey::ALL.into_iter().filter(|key| key.is_secure()) {
        match vault.load(key) {
            Ok(Some(value)) => {
                if let Err(error) = settings.set(key, &value) {
                    warn!(key = %key, error = %error, "Ignoring unusable secure setting");
                }
            }
            Ok(None) => {}
            Err(error) => warn!(key = %key, error = %error, "Failed to load secure setting"),
        }
    }
}
