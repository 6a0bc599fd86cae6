pub mod config;
pub mod error;
pub mod types;
pub mod version;

pub use config::{ConfigManager, HealthConfig, LandingConfig, LoggingConfig, ServerConfig, Settings};
pub use error::*;
pub use types::*;
pub use version::*;

pub use semver::Version;
