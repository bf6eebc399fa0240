//! # Configuration Management Module
//!
//! Settings for the toolbox and the local console host, loaded from a TOML file.
//!
//! ## Configuration Structure
//!
//! - [`ServerConfig`] - server name and the console player's identity
//! - [`MailboxConfig`] - mail log location and per-sender cooldown
//! - [`RotationConfig`] - map rotation and the delay of a forced map advance
//! - [`LoggingConfig`] - log level and log files
//!
//! ## Usage
//!
//! ```rust,no_run
//! use milsim_toolbox::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Config::create_default("toolbox.toml").await?;
//!     let config = Config::load("toolbox.toml").await?;
//!     println!("Maps in rotation: {}", config.rotation.maps.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [server]
//! name = "Milsim Server"
//! console_player = "Admin"
//! console_admin = true
//!
//! [mailbox]
//! file = "mailbox.txt"
//! delay = 90
//!
//! [rotation]
//! advance_delay_ms = 5000
//! maps = [
//!     { name = "Hallway", author = "Jigsaw" },
//!     { name = "Trenches", author = "Sgt. Ragnar" },
//! ]
//!
//! [logging]
//! level = "info"
//! file = "milsim-toolbox.log"
//! security_file = "milsim-toolbox-security.log"
//! ```
//!
//! Missing sections fall back to their defaults.

use crate::host::MapInfo;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::fs;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub mailbox: MailboxConfig,
    #[serde(default)]
    pub rotation: RotationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub name: String,
    /// Nickname of the player driving the `console` subcommand
    pub console_player: String,
    /// Whether the console player has administrator rights
    #[serde(default = "default_console_admin")]
    pub console_admin: bool,
    /// Distance in blocks within which item containers count as nearby
    #[serde(default = "default_reach")]
    pub reach: f32,
}

fn default_console_admin() -> bool {
    true
}

fn default_reach() -> f32 {
    2.0
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "Milsim Server".to_string(),
            console_player: "Admin".to_string(),
            console_admin: default_console_admin(),
            reach: default_reach(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailboxConfig {
    pub file: String,
    /// Seconds a sender has to wait between two messages
    #[serde(default = "default_mail_delay")]
    pub delay: u64,
}

fn default_mail_delay() -> u64 {
    90
}

impl MailboxConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.delay)
    }
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            file: "mailbox.txt".to_string(),
            delay: default_mail_delay(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationConfig {
    /// How long a forced advance waits before switching maps
    #[serde(default = "default_advance_delay_ms")]
    pub advance_delay_ms: u64,
    // Tables last so the TOML serializer never writes a value after them
    #[serde(default)]
    pub maps: Vec<MapInfo>,
}

fn default_advance_delay_ms() -> u64 {
    5000
}

impl RotationConfig {
    pub fn advance_delay(&self) -> Duration {
        Duration::from_millis(self.advance_delay_ms)
    }
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            advance_delay_ms: default_advance_delay_ms(),
            maps: vec![
                MapInfo::new("Hallway", "Jigsaw"),
                MapInfo::new("Island", "Triplefox"),
                MapInfo::new("Trenches", "Sgt. Ragnar"),
                MapInfo::new("Desert Ridge", "Lostmotel"),
                MapInfo::new("Harbor", "Hecatomb"),
                MapInfo::new("Pinpoint", "Kuma"),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    /// Separate file for records logged with target `security`
    #[serde(default)]
    pub security_file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: Some("milsim-toolbox.log".to_string()),
            security_file: Some("milsim-toolbox-security.log".to_string()),
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
        let content = toml::to_string_pretty(&Config::default())
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }
}
