//! Configuration file parsing for SongDesk
//!
//! Supports multiple configuration file formats:
//! - TOML (.toml)
//! - YAML (.yaml, .yml)
//! - JSON (.json)
//!
//! Resolution order, lowest to highest: built-in defaults, config file,
//! environment, command line (applied by the daemon).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::*;
use crate::error::{Error, Result};

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(ConfigFormat::Toml),
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            "json" => Some(ConfigFormat::Json),
            _ => None,
        }
    }

    /// Detect format from file path
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// Configuration file structure (songdesk.toml/yaml/json)
///
/// Every key is optional; absent keys keep the built-in default.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub bind: Option<String>,
    pub log_dir: Option<PathBuf>,
    pub file_prefix: Option<String>,
    pub api_key: Option<String>,
    pub cors_origin: Option<String>,
    pub static_dir: Option<PathBuf>,
}

impl ConfigFile {
    /// Load config from file, automatically detecting format from extension
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }

        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            Error::ConfigError(format!(
                "Unsupported config file extension: {}. Expected .toml, .yaml, .yml, or .json",
                path.display()
            ))
        })?;

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, format)
    }

    /// Parse config content with specified format
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self> {
        match format {
            ConfigFormat::Toml => Ok(toml::from_str(content)?),
            ConfigFormat::Yaml => Ok(serde_yaml::from_str(content)?),
            ConfigFormat::Json => Ok(serde_json::from_str(content)?),
        }
    }

    /// Find the first known config file in `dir`
    pub fn find(dir: &Path) -> Option<PathBuf> {
        CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }
}

/// Resolved server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    pub bind: String,
    /// Directory of the daily order spreadsheets
    pub log_dir: PathBuf,
    /// Filename prefix of the daily order spreadsheets
    pub file_prefix: String,
    /// Key for the generation backend (stubbed)
    pub api_key: String,
    /// Single allowed CORS origin; any origin when unset
    pub cors_origin: Option<String>,
    /// Directory of a static frontend served as fallback
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            api_key: PLACEHOLDER_API_KEY.to_string(),
            cors_origin: None,
            static_dir: None,
        }
    }
}

impl ServerConfig {
    /// Overlay the keys present in a config file
    pub fn merge_file(mut self, file: ConfigFile) -> Self {
        if let Some(bind) = file.bind {
            self.bind = bind;
        }
        if let Some(log_dir) = file.log_dir {
            self.log_dir = log_dir;
        }
        if let Some(prefix) = file.file_prefix {
            self.file_prefix = prefix;
        }
        if let Some(key) = file.api_key {
            self.api_key = key;
        }
        if file.cors_origin.is_some() {
            self.cors_origin = file.cors_origin;
        }
        if file.static_dir.is_some() {
            self.static_dir = file.static_dir;
        }
        self
    }

    /// Overlay environment variables, read through `lookup`
    pub fn merge_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(bind) = get("SONGDESK_BIND") {
            self.bind = bind;
        }
        if let Some(dir) = get("SONGDESK_LOG_DIR") {
            self.log_dir = PathBuf::from(dir);
        }
        if let Some(prefix) = get("SONGDESK_FILE_PREFIX") {
            self.file_prefix = prefix;
        }
        if let Some(origin) = get("SONGDESK_CORS_ORIGIN") {
            self.cors_origin = Some(origin);
        }
        if let Some(dir) = get("SONGDESK_STATIC_DIR") {
            self.static_dir = Some(PathBuf::from(dir));
        }
        if let Some(key) = get(API_KEY_ENV) {
            self.api_key = key;
        }
        self
    }

    /// Overlay the process environment
    pub fn merge_process_env(self) -> Self {
        self.merge_env(|key| std::env::var(key).ok())
    }

    /// Reject values the server cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.bind.trim().is_empty() {
            return Err(Error::config("bind address is empty"));
        }
        let prefix_ok = !self.file_prefix.is_empty()
            && self
                .file_prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !prefix_ok {
            return Err(Error::config(format!(
                "file_prefix must be alphanumeric, '_' or '-': {:?}",
                self.file_prefix
            )));
        }
        Ok(())
    }

    /// Copy safe to print, with the API key masked
    pub fn redacted(&self) -> Self {
        let api_key = if self.api_key == PLACEHOLDER_API_KEY {
            self.api_key.clone()
        } else {
            "********".to_string()
        };
        Self {
            api_key,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_config_format_detection() {
        assert_eq!(ConfigFormat::from_extension("toml"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("YAML"), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_extension("yml"), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_extension("json"), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_extension("txt"), None);
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind, "0.0.0.0:8000");
        assert_eq!(config.log_dir, PathBuf::from("admin_logs"));
        assert_eq!(config.file_prefix, "rendelesek");
        assert_eq!(config.api_key, "sk-...");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_parse_toml() {
        let content = r#"
bind = "127.0.0.1:9000"
log_dir = "/var/lib/songdesk"
cors_origin = "https://example.com"
"#;
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        file.write_all(content.as_bytes()).unwrap();

        let config = ServerConfig::default().merge_file(ConfigFile::load(file.path()).unwrap());
        assert_eq!(config.bind, "127.0.0.1:9000");
        assert_eq!(config.log_dir, PathBuf::from("/var/lib/songdesk"));
        assert_eq!(config.cors_origin.as_deref(), Some("https://example.com"));
        assert_eq!(config.file_prefix, "rendelesek");
    }

    #[test]
    fn test_config_parse_yaml() {
        let content = "file_prefix: orders\nstatic_dir: public\n";
        let file = ConfigFile::parse(content, ConfigFormat::Yaml).unwrap();
        let config = ServerConfig::default().merge_file(file);
        assert_eq!(config.file_prefix, "orders");
        assert_eq!(config.static_dir, Some(PathBuf::from("public")));
    }

    #[test]
    fn test_config_parse_json() {
        let file = ConfigFile::parse(r#"{"api_key": "sk-test"}"#, ConfigFormat::Json).unwrap();
        let config = ServerConfig::default().merge_file(file);
        assert_eq!(config.api_key, "sk-test");
    }

    #[test]
    fn test_config_rejects_unknown_key() {
        assert!(ConfigFile::parse("colour = \"red\"", ConfigFormat::Toml).is_err());
    }

    #[test]
    fn test_config_not_found() {
        let err = ConfigFile::load(Path::new("/nonexistent/songdesk.toml")).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound(_)));
    }

    #[test]
    fn test_config_unsupported_extension() {
        let file = NamedTempFile::with_suffix(".ini").unwrap();
        let err = ConfigFile::load(file.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn test_find_config_in_dir() {
        let dir = TempDir::new().unwrap();
        assert!(ConfigFile::find(dir.path()).is_none());

        std::fs::write(dir.path().join("songdesk.yaml"), "bind: x").unwrap();
        std::fs::write(dir.path().join("songdesk.toml"), "bind = \"y\"").unwrap();
        let found = ConfigFile::find(dir.path()).unwrap();
        assert!(found.ends_with("songdesk.toml"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("SONGDESK_BIND", "127.0.0.1:1234"),
            ("SONGDESK_LOG_DIR", "/tmp/orders"),
            ("OPENAI_API_KEY", "sk-real"),
            ("SONGDESK_FILE_PREFIX", "  "),
        ]
        .into_iter()
        .collect();

        let config = ServerConfig::default()
            .merge_env(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.bind, "127.0.0.1:1234");
        assert_eq!(config.log_dir, PathBuf::from("/tmp/orders"));
        assert_eq!(config.api_key, "sk-real");
        // blank values are ignored
        assert_eq!(config.file_prefix, "rendelesek");
    }

    #[test]
    fn test_api_key_placeholder_when_unset() {
        let config = ServerConfig::default().merge_env(|_| None);
        assert_eq!(config.api_key, PLACEHOLDER_API_KEY);
    }

    #[test]
    fn test_validate_prefix() {
        let config = ServerConfig {
            file_prefix: "../evil".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_redacted() {
        let config = ServerConfig {
            api_key: "sk-secret".to_string(),
            ..Default::default()
        };
        assert_eq!(config.redacted().api_key, "********");
        assert_eq!(ServerConfig::default().redacted().api_key, "sk-...");
    }
}
