//! TOML configuration file loading
//!
//! Supports `~/.config/agromitra/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct AgroMitraConfigFile {
    /// Server/runtime configuration
    #[serde(default)]
    pub server: ServerFileConfig,

    /// Assistant defaults
    #[serde(default)]
    pub agent: AgentFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,

    /// Upstream endpoint overrides
    #[serde(default)]
    pub upstream: UpstreamFileConfig,
}

/// Server/runtime configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// API server port
    pub port: Option<u16>,

    /// Address to bind (e.g. "0.0.0.0")
    pub host: Option<String>,

    /// Data directory holding the `SQLite` database
    pub data_dir: Option<String>,

    /// Global requests-per-minute limit (unset = unlimited)
    pub rate_limit_per_minute: Option<u32>,

    /// Base URL the assistant uses to reach the farming backend
    pub backend_url: Option<String>,
}

/// Assistant defaults
#[derive(Debug, Default, Deserialize)]
pub struct AgentFileConfig {
    /// Language code ("en", "hi", "es")
    pub language: Option<String>,

    /// Fallback location for weather queries
    pub location: Option<String>,

    /// Farming type preference (e.g. "organic")
    pub farming_type: Option<String>,

    /// User the CLI acts on behalf of
    pub user_id: Option<String>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub openweather: Option<String>,
    pub plant_id: Option<String>,
    pub gemini: Option<String>,
}

/// Upstream endpoint overrides
#[derive(Debug, Default, Deserialize)]
pub struct UpstreamFileConfig {
    pub openweather_url: Option<String>,
    pub soilgrids_url: Option<String>,
    pub plant_id_url: Option<String>,
    pub gemini_url: Option<String>,
    pub susya_url: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `AgroMitraConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> AgroMitraConfigFile {
    let Some(path) = config_file_path() else {
        return AgroMitraConfigFile::default();
    };

    load_config_file_from(&path)
}

/// Load a TOML config file from an explicit path
pub fn load_config_file_from(path: &Path) -> AgroMitraConfigFile {
    if !path.exists() {
        return AgroMitraConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                AgroMitraConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            AgroMitraConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/agromitra/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("agromitra").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_parses() {
        let parsed: AgroMitraConfigFile = toml::from_str(
            r#"
            [server]
            port = 8080

            [agent]
            language = "hi"
            "#,
        )
        .unwrap();

        assert_eq!(parsed.server.port, Some(8080));
        assert_eq!(parsed.agent.language.as_deref(), Some("hi"));
        assert!(parsed.api_keys.openweather.is_none());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config_file_from(&dir.path().join("absent.toml"));
        assert!(loaded.server.port.is_none());
    }

    #[test]
    fn test_malformed_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "server = [not valid").unwrap();

        let loaded = load_config_file_from(&path);
        assert!(loaded.server.port.is_none());
    }
}
