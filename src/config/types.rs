//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::defaults::{
    default_bot_name, default_database_path, default_pagination_timeout, default_prefix,
    default_true,
};
use crate::api::{Channel, ChannelId, GuildId, Role, RoleId, UserId};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Bot identity.
    pub bot: BotConfig,
    /// Dispatcher behaviour.
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Fixture for the console transport.
    pub console: Option<ConsoleConfig>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Bot identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    #[serde(default = "default_bot_name")]
    pub name: String,
    /// Prefix for guilds without stored settings and for direct messages.
    #[serde(default = "default_prefix")]
    pub default_prefix: String,
    /// The bot's own user id.
    pub user_id: UserId,
    #[serde(default)]
    pub links: LinksConfig,
}

/// Public links shown by `help` and `getBot`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinksConfig {
    /// Bot authorization URL.
    pub add: Option<String>,
    /// Support server invite.
    pub support: Option<String>,
}

/// Dispatcher configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchConfig {
    /// Reject unknown flags instead of treating them as positional text.
    #[serde(default)]
    pub strict_flags: bool,
    /// Tell users when a command's module is disabled in their guild.
    #[serde(default = "default_true")]
    pub disabled_module_notice: bool,
    /// Answer a mention followed by an unknown command.
    #[serde(default = "default_true")]
    pub unknown_command_notice: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            strict_flags: false,
            disabled_module_notice: true,
            unknown_command_notice: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "default_pagination_timeout")]
    pub timeout_secs: u64,
}

impl PaginationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_pagination_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file path, or `:memory:`.
    #[serde(default = "default_database_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsConfig {
    /// Port of the `/metrics` endpoint; `0` disables it.
    #[serde(default)]
    pub port: u16,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

/// The guild the console transport pretends to be in.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleConfig {
    pub guild: GuildFixture,
    /// Member that typed lines are attributed to.
    pub author_id: UserId,
    pub channel_id: ChannelId,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub channels: Vec<Channel>,
    #[serde(default)]
    pub members: Vec<MemberFixture>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GuildFixture {
    pub id: GuildId,
    pub name: String,
    pub owner_id: UserId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemberFixture {
    pub id: UserId,
    pub name: String,
    pub nick: Option<String>,
    #[serde(default)]
    pub bot: bool,
    #[serde(default)]
    pub roles: Vec<RoleId>,
}
