use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config as cfg;
use semver::Version;
use serde::{Deserialize, Serialize};
use tracing::info;

pub const ENV_PREFIX: &str = "FAUXINNATI";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

/// Landing page settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandingConfig {
    /// Version used for the example graphs embedded in the page
    #[serde(default = "LandingConfig::default_example_version")]
    pub example_version: String,
    #[serde(default = "LandingConfig::default_example_arch")]
    pub example_arch: String,
    /// Base URL advertised in curl examples; derived from the Host header when unset
    #[serde(default)]
    pub public_base_url: Option<String>,
}

impl LandingConfig {
    fn default_example_version() -> String {
        "4.18.42".to_string()
    }

    fn default_example_arch() -> String {
        "amd64".to_string()
    }
}

impl Default for LandingConfig {
    fn default() -> Self {
        Self {
            example_version: Self::default_example_version(),
            example_arch: Self::default_example_arch(),
            public_base_url: None,
        }
    }
}

/// Graph request replayed by `/healthz` and `/readyz`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    #[serde(default = "HealthConfig::default_channel")]
    pub probe_channel: String,
    #[serde(default = "HealthConfig::default_version")]
    pub probe_version: String,
}

impl HealthConfig {
    fn default_channel() -> String {
        "stable-4.17".to_string()
    }

    fn default_version() -> String {
        "4.17.0".to_string()
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            probe_channel: Self::default_channel(),
            probe_version: Self::default_version(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "Settings::default_env")]
    pub env: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub landing: LandingConfig,
    #[serde(default)]
    pub health: HealthConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            env: Self::default_env(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            landing: LandingConfig::default(),
            health: HealthConfig::default(),
        }
    }
}

impl Settings {
    fn default_env() -> String {
        env::var("APP_ENV")
            .ok()
            .or_else(|| env::var("RUST_ENV").ok())
            .unwrap_or_else(|| "development".to_string())
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            !self.server.host.trim().is_empty(),
            "server.host cannot be empty"
        );
        anyhow::ensure!(self.server.port > 0, "server.port must be > 0");
        Version::parse(&self.landing.example_version)
            .with_context(|| format!("landing.example_version {:?}", self.landing.example_version))?;
        Version::parse(&self.health.probe_version)
            .with_context(|| format!("health.probe_version {:?}", self.health.probe_version))?;
        anyhow::ensure!(
            !self.health.probe_channel.trim().is_empty(),
            "health.probe_channel cannot be empty"
        );
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[derive(Debug)]
pub struct ConfigManager {
    settings: Settings,
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Loads and validates settings from `custom_dir`, or the default directory.
    pub fn new(custom_dir: Option<PathBuf>) -> Result<Self> {
        let env_name = Settings::default_env();
        let config_dir = custom_dir.unwrap_or_else(Self::default_config_dir);
        let settings = Self::load_from_sources(&config_dir, &env_name)?;
        settings.validate()?;
        Ok(Self {
            settings,
            config_dir,
        })
    }

    pub fn into_settings(self) -> Settings {
        self.settings
    }

    /// Directory the configuration files were read from.
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get the default configuration directory.
    ///
    /// Priority order:
    /// 1. ~/.fauxinnati/ (user-level config)
    /// 2. ./config/ (project-level config)
    /// 3. Current directory (fallback)
    pub fn default_config_dir() -> PathBuf {
        if let Some(home_dir) = dirs::home_dir() {
            let user_dir = home_dir.join(".fauxinnati");
            if user_dir.exists() {
                info!("Using config directory: {:?}", user_dir);
                return user_dir;
            }
        }

        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let project_config = cwd.join("config");
        if project_config.exists() {
            info!("Using config directory: {:?}", project_config);
            return project_config;
        }

        info!("Using config directory: {:?}", cwd);
        cwd
    }

    pub fn load_from_sources(config_dir: &Path, env_name: &str) -> Result<Settings> {
        let settings: Settings = cfg::Config::builder()
            .add_source(cfg::File::from(config_dir.join("default.toml")).required(false))
            .add_source(
                cfg::File::from(config_dir.join(format!("{}.toml", env_name))).required(false),
            )
            .add_source(cfg::File::from(config_dir.join("local.toml")).required(false))
            .add_source(cfg::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .context("building configuration")?
            .try_deserialize()
            .context("deserializing configuration")?;
        Ok(settings)
    }
}
