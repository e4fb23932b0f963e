//! Configuration management for AgroMitra

pub mod file;

use std::path::PathBuf;

use secrecy::SecretString;

use crate::agent::Language;
use crate::Result;
use file::AgroMitraConfigFile;

/// Default user id when no authentication is present
pub const DEFAULT_USER_ID: &str = "default_user";

/// Default base URL of the farming backend
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";

/// AgroMitra service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API server configuration
    pub server: ServerConfig,

    /// Assistant defaults
    pub agent: AgentConfig,

    /// API keys
    pub api_keys: ApiKeys,

    /// External service endpoints
    pub upstream: UpstreamConfig,

    /// Path to data directory (database)
    pub data_dir: PathBuf,

    /// Base URL the CLI assistant uses to reach the farming backend
    pub backend_url: String,
}

/// HTTP API server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Address to bind
    pub host: String,

    /// Global requests-per-minute limit
    pub rate_limit_per_minute: Option<u32>,
}

/// Assistant defaults applied to new sessions
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub language: Language,
    pub location: String,
    pub farming_type: String,
    pub user_id: String,
}

/// API keys for external services
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// `OpenWeatherMap` API key
    pub openweather: Option<SecretString>,

    /// Plant.id health assessment API key
    pub plant_id: Option<SecretString>,

    /// Google Gemini API key
    pub gemini: Option<SecretString>,
}

/// External service endpoints
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub openweather_url: String,
    pub soilgrids_url: String,
    pub plant_id_url: String,
    pub gemini_url: String,
    /// Susya disease endpoint; the provider is skipped when unset
    pub susya_url: Option<String>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            openweather_url: "https://api.openweathermap.org/data/2.5".to_string(),
            soilgrids_url: "https://rest.isric.org/soilgrids/v2.0".to_string(),
            plant_id_url: "https://plant.id/api/v3".to_string(),
            gemini_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            susya_url: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_sources(&AgroMitraConfigFile::default(), |_| None)
    }
}

/// Return the data directory, e.g. `~/.local/share/agromitra` on Linux
pub fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("dev", "agromitra", "agromitra")
        .map_or_else(|| PathBuf::from(".agromitra"), |d| d.data_dir().to_path_buf())
}

impl Config {
    /// Load configuration from the config file and process environment
    ///
    /// # Errors
    ///
    /// Returns error if the data directory cannot be created
    pub fn load() -> Result<Self> {
        let file = file::load_config_file();
        let config = Self::from_sources(&file, |key| std::env::var(key).ok());

        std::fs::create_dir_all(&config.data_dir)?;

        Ok(config)
    }

    /// Build configuration from a parsed file and an environment lookup
    ///
    /// Environment values win over file values, which win over defaults.
    pub fn from_sources(file: &AgroMitraConfigFile, env: impl Fn(&str) -> Option<String>) -> Self {
        let server = ServerConfig {
            port: env("AGROMITRA_PORT")
                .or_else(|| env("PORT"))
                .and_then(|s| s.parse().ok())
                .or(file.server.port)
                .unwrap_or(5000),
            host: env("AGROMITRA_HOST")
                .or_else(|| file.server.host.clone())
                .unwrap_or_else(|| "127.0.0.1".to_string()),
            rate_limit_per_minute: env("AGROMITRA_RATE_LIMIT")
                .and_then(|s| s.parse().ok())
                .or(file.server.rate_limit_per_minute)
                .filter(|rpm| *rpm > 0),
        };

        let language = env("AGROMITRA_LANGUAGE")
            .or_else(|| file.agent.language.clone())
            .and_then(|code| {
                let parsed = Language::from_code(&code);
                if parsed.is_none() {
                    tracing::warn!(code = %code, "unknown language code, using English");
                }
                parsed
            })
            .unwrap_or_default();

        let agent = AgentConfig {
            language,
            location: env("AGROMITRA_LOCATION")
                .or_else(|| file.agent.location.clone())
                .unwrap_or_else(|| "delhi".to_string()),
            farming_type: file
                .agent
                .farming_type
                .clone()
                .unwrap_or_else(|| "traditional".to_string()),
            user_id: env("AGROMITRA_USER_ID")
                .or_else(|| file.agent.user_id.clone())
                .unwrap_or_else(|| DEFAULT_USER_ID.to_string()),
        };

        let api_keys = ApiKeys {
            openweather: env("OPENWEATHER_API_KEY")
                .or_else(|| file.api_keys.openweather.clone())
                .map(SecretString::from),
            plant_id: env("PLANT_ID_API_KEY")
                .or_else(|| file.api_keys.plant_id.clone())
                .map(SecretString::from),
            gemini: env("GEMINI_API_KEY")
                .or_else(|| file.api_keys.gemini.clone())
                .map(SecretString::from),
        };

        let defaults = UpstreamConfig::default();
        let upstream = UpstreamConfig {
            openweather_url: file
                .upstream
                .openweather_url
                .clone()
                .unwrap_or(defaults.openweather_url),
            soilgrids_url: file
                .upstream
                .soilgrids_url
                .clone()
                .unwrap_or(defaults.soilgrids_url),
            plant_id_url: file
                .upstream
                .plant_id_url
                .clone()
                .unwrap_or(defaults.plant_id_url),
            gemini_url: file.upstream.gemini_url.clone().unwrap_or(defaults.gemini_url),
            susya_url: env("SUSYA_API_URL").or_else(|| file.upstream.susya_url.clone()),
        };

        let data_dir = env("AGROMITRA_DATA_DIR")
            .or_else(|| file.server.data_dir.clone())
            .map_or_else(default_data_dir, PathBuf::from);

        let backend_url = env("AGROMITRA_BACKEND_URL")
            .or_else(|| file.server.backend_url.clone())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

        Self {
            server,
            agent,
            api_keys,
            upstream,
            data_dir,
            backend_url,
        }
    }

    /// Path to the `SQLite` database file
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("agromitra.db")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.agent.language, Language::En);
        assert_eq!(config.agent.user_id, DEFAULT_USER_ID);
        assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
        assert!(config.api_keys.openweather.is_none());
        assert!(config.upstream.susya_url.is_none());
    }

    #[test]
    fn test_env_overrides_file() {
        let file: AgroMitraConfigFile = toml::from_str(
            r#"
            [server]
            port = 7000

            [agent]
            language = "es"
            location = "pune"
            "#,
        )
        .unwrap();

        let config = Config::from_sources(
            &file,
            env_from(&[("AGROMITRA_PORT", "9000"), ("OPENWEATHER_API_KEY", "owm")]),
        );

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.agent.language, Language::Es);
        assert_eq!(config.agent.location, "pune");
        assert_eq!(
            config.api_keys.openweather.as_ref().map(|k| k.expose_secret().to_string()),
            Some("owm".to_string())
        );
    }

    #[test]
    fn test_unknown_language_falls_back_to_english() {
        let config = Config::from_sources(
            &AgroMitraConfigFile::default(),
            env_from(&[("AGROMITRA_LANGUAGE", "fr")]),
        );
        assert_eq!(config.agent.language, Language::En);
    }

    #[test]
    fn test_zero_rate_limit_disables_limiter() {
        let config = Config::from_sources(
            &AgroMitraConfigFile::default(),
            env_from(&[("AGROMITRA_RATE_LIMIT", "0")]),
        );
        assert!(config.server.rate_limit_per_minute.is_none());
    }
}
