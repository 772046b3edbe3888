//! # Configuration Management Module
//!
//! Configuration for the lobby bot, loaded from a TOML file with sensible
//! defaults for every value.
//!
//! ## Configuration Structure
//!
//! - [`LobbyConfig`] - messaging session settings (domain, login, room)
//! - [`LoggingConfig`] - logging settings
//!
//! ## Configuration File Format
//!
//! ```toml
//! [lobby]
//! domain = "lobby.example.com"
//! login = "gamelistbot"
//! password = "XXXXXX"
//! room = "arena"
//! nickname = "GameListBot"
//!
//! [logging]
//! level = "info"
//! ```
//!
//! The registry's capacity bound and name-truncation limit are fixed
//! policy constants (see [`crate::lobby::games`]), deliberately not
//! exposed here.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub lobby: LobbyConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the messaging session the bot rides on. The session
/// itself (connection, auth, room join) is handled by the messaging
/// substrate; these values are handed to it at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LobbyConfig {
    /// Domain of the lobby service.
    pub domain: String,
    /// Account name to log in with.
    pub login: String,
    pub password: String,
    /// Chat room where games are announced.
    pub room: String,
    /// Nickname shown to room occupants.
    pub nickname: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            lobby: LobbyConfig {
                domain: "lobby.example.com".to_string(),
                login: "gamelistbot".to_string(),
                password: "XXXXXX".to_string(),
                room: "arena".to_string(),
                nickname: "GameListBot".to_string(),
            },
            logging: LoggingConfig::default(),
        }
    }
}
