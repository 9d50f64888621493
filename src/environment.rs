// src/environment.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Application configuration for one environment section of `config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSettings,
    /// Origin the front end is served from; the OAuth redirect URI hangs off it.
    pub app_origin: String,
    /// Base URL of the relay endpoints, as seen by the CLI flows.
    pub relay_url: String,
    pub linkedin: LinkedInSettings,
    pub storage: StorageSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub address: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkedInSettings {
    pub auth_url: String,
    pub token_url: String,
    pub api_base_url: String,
    pub scope: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub file: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    local: AppConfig,
    #[serde(default)]
    production: AppConfig,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 4321,
        }
    }
}

impl Default for LinkedInSettings {
    fn default() -> Self {
        Self {
            auth_url: "https://www.linkedin.com/oauth/v2/authorization".to_string(),
            token_url: "https://www.linkedin.com/oauth/v2/accessToken".to_string(),
            api_base_url: "https://api.linkedin.com".to_string(),
            scope: "w_member_social openid email".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".social-creator"),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            app_origin: "http://localhost:4321".to_string(),
            relay_url: "http://localhost:4321".to_string(),
            linkedin: LinkedInSettings::default(),
            storage: StorageSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration for the current environment.
    ///
    /// Falls back to built-in defaults when no config file exists, so the CLI
    /// works out of the box against a local relay.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let environment = Self::get_environment();
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut config = if config_path.exists() {
            info!(
                "Loading {} configuration from {}",
                environment,
                config_path.display()
            );
            Self::load_from_file(&config_path, &environment)?
        } else if path.is_some() {
            anyhow::bail!("Config file not found: {}", config_path.display());
        } else {
            info!("No {} found, using default configuration", DEFAULT_CONFIG_FILE);
            Self::default()
        };

        config.apply_env_overrides()?;
        config.resolve_paths()?;
        Ok(config)
    }

    fn get_environment() -> String {
        std::env::var("SOCIAL_CREATOR_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    fn load_from_file(config_path: &Path, environment: &str) -> Result<Self> {
        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        Self::from_yaml(&content, environment)
            .with_context(|| format!("Failed to parse {}", config_path.display()))
    }

    pub fn from_yaml(content: &str, environment: &str) -> Result<Self> {
        let config_file: ConfigFile = serde_yaml::from_str(content)?;
        Ok(match environment {
            "production" => config_file.production,
            _ => config_file.local,
        })
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(port) = std::env::var("ROCKET_PORT") {
            self.server.port = port
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("ROCKET_PORT must be a valid port number"))?;
        }
        if let Ok(url) = std::env::var("SOCIAL_CREATOR_RELAY_URL") {
            self.relay_url = url;
        }
        Ok(())
    }

    fn resolve_paths(&mut self) -> Result<()> {
        self.storage.dir = resolve_path(&self.storage.dir)?;
        if let Some(file) = &self.logging.file {
            self.logging.file = Some(resolve_path(file)?);
        }
        Ok(())
    }

    /// Where LinkedIn sends the user back after authorization.
    pub fn redirect_uri(&self) -> String {
        format!("{}/linkedin", self.app_origin.trim_end_matches('/'))
    }
}

fn resolve_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Ok(current_dir.join(path))
    }
}
