//! Configuration file management for yatra.
//!
//! Provides a TOML-based config file at `~/.config/yatra/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use yatra_core::model::ModelConfig;
use yatra_db::config::DbConfig;

pub const ENV_DATABASE_URL: &str = "YATRA_DATABASE_URL";
pub const ENV_LLM_API_KEY: &str = "YATRA_LLM_API_KEY";
pub const ENV_LLM_MODEL: &str = "YATRA_LLM_MODEL";
pub const ENV_LLM_BASE_URL: &str = "YATRA_LLM_BASE_URL";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub database: DatabaseSection,
    #[serde(default)]
    pub llm: LlmSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub provider: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Synthesize an itinerary when the model call itself fails.
    pub fallback_on_upstream_error: bool,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: ModelConfig::DEFAULT_PROVIDER.to_string(),
            model: ModelConfig::DEFAULT_MODEL.to_string(),
            api_key: None,
            base_url: ModelConfig::DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
            fallback_on_upstream_error: false,
        }
    }
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the yatra config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/yatra` or `~/.config/yatra`,
/// even on macOS.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("yatra");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("yatra")
}

/// Return the path to the yatra config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

pub fn load_config_from(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix, since it may hold an API key.
pub fn save_config_to(config: &ConfigFile, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    }

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct YatraConfig {
    pub db_config: DbConfig,
    pub model_config: ModelConfig,
    pub fallback_on_upstream_error: bool,
}

impl YatraConfig {
    /// Resolve from the process environment and the default config file.
    ///
    /// A missing config file is not an error; an unreadable one is.
    pub fn resolve(cli_db_url: Option<&str>) -> Result<Self> {
        let path = config_path();
        let file = if path.exists() {
            Some(load_config_from(&path)?)
        } else {
            None
        };
        Ok(Self::resolve_with(cli_db_url, |key| std::env::var(key).ok(), file.as_ref()))
    }

    /// Resolution chain: CLI flag > env var > config file > default.
    ///
    /// - DB URL: `cli_db_url` > `YATRA_DATABASE_URL` > `database.url` > `DbConfig::DEFAULT_URL`
    /// - Model, base URL, API key: `YATRA_LLM_*` > `[llm]` > `ModelConfig` defaults
    /// - Provider, timeout, upstream fallback: `[llm]` > defaults
    pub fn resolve_with(
        cli_db_url: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
        file: Option<&ConfigFile>,
    ) -> Self {
        let env = |key: &str| env(key).filter(|v| !v.is_empty());
        let llm = file.map(|f| f.llm.clone()).unwrap_or_default();

        let db_url = cli_db_url
            .map(str::to_string)
            .or_else(|| env(ENV_DATABASE_URL))
            .or_else(|| file.map(|f| f.database.url.clone()))
            .unwrap_or_else(|| DbConfig::DEFAULT_URL.to_string());

        let model_config = ModelConfig {
            provider: llm.provider,
            model: env(ENV_LLM_MODEL).unwrap_or(llm.model),
            api_key: env(ENV_LLM_API_KEY).or(llm.api_key),
            base_url: env(ENV_LLM_BASE_URL).unwrap_or(llm.base_url),
            timeout: llm.timeout_secs.map(Duration::from_secs),
        };

        Self {
            db_config: DbConfig::new(db_url),
            model_config,
            fallback_on_upstream_error: llm.fallback_on_upstream_error,
        }
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn sample_file() -> ConfigFile {
        ConfigFile {
            database: DatabaseSection {
                url: "postgresql://filehost:5432/filedb".to_string(),
            },
            llm: LlmSection {
                model: "file-model".to_string(),
                api_key: Some("file-key".to_string()),
                timeout_secs: Some(45),
                fallback_on_upstream_error: true,
                ..LlmSection::default()
            },
        }
    }

    #[test]
    fn save_and_load_config_roundtrip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("yatra").join("config.toml");

        let original = sample_file();
        save_config_to(&original, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();

        assert_eq!(loaded, original);
    }

    #[cfg(unix)]
    #[test]
    fn save_config_sets_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        save_config_to(&sample_file(), &path).unwrap();

        let meta = std::fs::metadata(&path).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn llm_section_is_optional() {
        let parsed: ConfigFile =
            toml::from_str("[database]\nurl = \"postgresql://h:5432/db\"\n").unwrap();
        assert_eq!(parsed.llm, LlmSection::default());
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(load_config_from(&tmp.path().join("missing.toml")).is_err());
    }

    #[test]
    fn resolve_with_cli_flag_overrides_all() {
        let env = env_of(&[(ENV_DATABASE_URL, "postgresql://env:5432/envdb")]);
        let file = sample_file();
        let config = YatraConfig::resolve_with(Some("postgresql://cli:5432/clidb"), env, Some(&file));
        assert_eq!(config.db_config.database_url, "postgresql://cli:5432/clidb");
    }

    #[test]
    fn resolve_with_env_var_overrides_config_file() {
        let env = env_of(&[
            (ENV_DATABASE_URL, "postgresql://env:5432/envdb"),
            (ENV_LLM_API_KEY, "env-key"),
            (ENV_LLM_MODEL, "env-model"),
            (ENV_LLM_BASE_URL, "http://localhost:11434/v1"),
        ]);
        let file = sample_file();
        let config = YatraConfig::resolve_with(None, env, Some(&file));

        assert_eq!(config.db_config.database_url, "postgresql://env:5432/envdb");
        assert_eq!(config.model_config.api_key.as_deref(), Some("env-key"));
        assert_eq!(config.model_config.model, "env-model");
        assert_eq!(config.model_config.base_url, "http://localhost:11434/v1");
    }

    #[test]
    fn resolve_uses_config_file_when_env_is_empty() {
        let env = env_of(&[(ENV_LLM_API_KEY, "")]);
        let file = sample_file();
        let config = YatraConfig::resolve_with(None, env, Some(&file));

        assert_eq!(config.db_config.database_url, "postgresql://filehost:5432/filedb");
        assert_eq!(config.model_config.api_key.as_deref(), Some("file-key"));
        assert_eq!(config.model_config.model, "file-model");
        assert_eq!(config.model_config.timeout, Some(Duration::from_secs(45)));
        assert!(config.fallback_on_upstream_error);
    }

    #[test]
    fn resolve_defaults_when_nothing_set() {
        let config = YatraConfig::resolve_with(None, env_of(&[]), None);
        assert_eq!(config.db_config.database_url, DbConfig::DEFAULT_URL);
        assert_eq!(config.model_config.model, ModelConfig::DEFAULT_MODEL);
        assert_eq!(config.model_config.base_url, ModelConfig::DEFAULT_BASE_URL);
        assert!(config.model_config.api_key.is_none());
        assert!(!config.fallback_on_upstream_error);
    }

    #[test]
    fn config_path_ends_with_expected_filename() {
        let path = config_path();
        assert!(
            path.ends_with("yatra/config.toml"),
            "unexpected config path: {}",
            path.display()
        );
    }
}
