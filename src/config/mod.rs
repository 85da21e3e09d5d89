//! Configuration loading and management.
//!
//! - [`types`]: config structs and [`Config::load`]
//! - [`defaults`]: serde default functions
//! - [`validation`]: startup checks that collect every problem at once

mod defaults;
mod types;
pub mod validation;

pub use types::{
    BotConfig, Config, ConfigError, ConsoleConfig, DatabaseConfig, DispatchConfig, GuildFixture,
    LinksConfig, LogFormat, LoggingConfig, MemberFixture, MetricsConfig, PaginationConfig,
};
pub use validation::{ValidationError, validate};
