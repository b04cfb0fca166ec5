//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file:
//!
//! ```toml
//! [service]
//! base_url = "https://chat.example.com"
//! connect_timeout_seconds = 5
//!
//! [storage]
//! state_file = "~/.local/share/threadline/state.json"
//!
//! [logging]
//! conversation_log = "~/.local/share/threadline/conversation.jsonl"
//!
//! [repl]
//! show_progress = true
//! ```

use crate::http::HttpGatewaySettings;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("service.base_url cannot be empty")]
    EmptyBaseUrl,

    #[error("service.base_url must start with http:// or https:// (got '{0}')")]
    UnsupportedScheme(String),

    #[error("service.connect_timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("storage.thread_key cannot be empty")]
    EmptyThreadKey,
}

/// Raw service configuration from TOML (`[service]` section)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileServiceConfig {
    /// Base URL of the chat service
    pub base_url: String,
    /// Path of the streaming send endpoint
    pub chat_path: String,
    /// Path of the history endpoint
    pub history_path: String,
    /// Connection timeout; open replies are never timed out
    pub connect_timeout_seconds: u64,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for FileServiceConfig {
    fn default() -> Self {
        let defaults = HttpGatewaySettings::default();
        Self {
            base_url: defaults.base_url,
            chat_path: defaults.chat_path,
            history_path: defaults.history_path,
            connect_timeout_seconds: defaults.connect_timeout.as_secs(),
            user_agent: defaults.user_agent,
        }
    }
}

impl FileServiceConfig {
    pub fn to_gateway_settings(&self) -> HttpGatewaySettings {
        HttpGatewaySettings {
            base_url: self.base_url.clone(),
            chat_path: self.chat_path.clone(),
            history_path: self.history_path.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_seconds),
            user_agent: self.user_agent.clone(),
        }
    }
}

/// Raw storage configuration from TOML (`[storage]` section)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    /// State file path; defaults to the platform data directory
    pub state_file: Option<String>,
    /// Key under which the thread id is stored
    pub thread_key: String,
}

impl Default for FileStorageConfig {
    fn default() -> Self {
        Self {
            state_file: None,
            thread_key: "threadId".to_string(),
        }
    }
}

impl FileStorageConfig {
    /// Resolve the state file path, falling back to `<data_dir>/threadline/state.json`.
    pub fn resolve_state_file(&self) -> Option<PathBuf> {
        match &self.state_file {
            Some(path) => Some(expand_home(path)),
            None => dirs::data_dir().map(|d| d.join("threadline").join("state.json")),
        }
    }
}

/// Raw logging configuration from TOML (`[logging]` section)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL conversation transcript path
    pub conversation_log: Option<String>,
    /// Diagnostic log file path (in addition to stderr)
    pub log_file: Option<String>,
}

impl FileLoggingConfig {
    pub fn conversation_log_path(&self) -> Option<PathBuf> {
        self.conversation_log.as_deref().map(expand_home)
    }

    pub fn log_file_path(&self) -> Option<PathBuf> {
        self.log_file.as_deref().map(expand_home)
    }
}

/// Raw REPL configuration from TOML (`[repl]` section)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReplConfig {
    /// Show a spinner until the first reply fragment arrives
    pub show_progress: bool,
    /// Line editor history file
    pub history_file: Option<String>,
}

impl Default for FileReplConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
            history_file: None,
        }
    }
}

impl FileReplConfig {
    pub fn history_file_path(&self) -> Option<PathBuf> {
        self.history_file.as_deref().map(expand_home)
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Chat service connection
    pub service: FileServiceConfig,
    /// Thread identity persistence
    pub storage: FileStorageConfig,
    /// Log outputs
    pub logging: FileLoggingConfig,
    /// REPL settings
    pub repl: FileReplConfig,
}

impl FileConfig {
    /// Check the values that would otherwise fail later at first use.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let base_url = self.service.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigValidationError::EmptyBaseUrl);
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigValidationError::UnsupportedScheme(base_url.to_string()));
        }
        if self.service.connect_timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        if self.storage.thread_key.trim().is_empty() {
            return Err(ConfigValidationError::EmptyThreadKey);
        }
        Ok(())
    }
}

/// Expand a leading `~/` to the home directory.
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[service]
base_url = "https://chat.example.com"
chat_path = "/v2/chat"
connect_timeout_seconds = 3

[storage]
state_file = "/tmp/threadline/state.json"
thread_key = "conversation"

[logging]
conversation_log = "/tmp/threadline/conversation.jsonl"

[repl]
show_progress = false
history_file = "/tmp/threadline/history.txt"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.service.base_url, "https://chat.example.com");
        assert_eq!(config.service.chat_path, "/v2/chat");
        assert_eq!(config.service.history_path, "/api/history");
        assert_eq!(config.service.connect_timeout_seconds, 3);
        assert_eq!(config.storage.thread_key, "conversation");
        assert_eq!(
            config.storage.resolve_state_file(),
            Some(PathBuf::from("/tmp/threadline/state.json"))
        );
        assert!(config.logging.conversation_log.is_some());
        assert!(config.logging.log_file.is_none());
        assert!(!config.repl.show_progress);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[service]
base_url = "http://localhost:3000"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.service.base_url, "http://localhost:3000");
        // Defaults should apply
        assert_eq!(config.service.chat_path, "/api/chat");
        assert_eq!(config.service.connect_timeout_seconds, 10);
        assert_eq!(config.storage.thread_key, "threadId");
        assert!(config.repl.show_progress);
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = FileConfig::default();
        assert_eq!(config.service.base_url, "http://127.0.0.1:8000");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = FileConfig::default();
        config.service.base_url = "  ".to_string();
        assert_eq!(config.validate(), Err(ConfigValidationError::EmptyBaseUrl));

        let mut config = FileConfig::default();
        config.service.base_url = "localhost:8000".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::UnsupportedScheme(_))
        ));

        let mut config = FileConfig::default();
        config.service.connect_timeout_seconds = 0;
        assert_eq!(config.validate(), Err(ConfigValidationError::InvalidTimeout));

        let mut config = FileConfig::default();
        config.storage.thread_key = String::new();
        assert_eq!(config.validate(), Err(ConfigValidationError::EmptyThreadKey));
    }

    #[test]
    fn test_gateway_settings_from_service_config() {
        let service = FileServiceConfig {
            connect_timeout_seconds: 7,
            ..Default::default()
        };
        let settings = service.to_gateway_settings();
        assert_eq!(settings.connect_timeout, Duration::from_secs(7));
        assert_eq!(settings.base_url, service.base_url);
    }

    #[test]
    fn test_config_serializes_to_toml() {
        let rendered = toml::to_string_pretty(&FileConfig::default()).unwrap();
        assert!(rendered.contains("[service]"));
        assert!(rendered.contains("thread_key = \"threadId\""));
    }
}
