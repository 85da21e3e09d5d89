//! Guild-scoped caches.
//!
//! Each cache is a registry entry holding one value per guild, loaded from
//! the database on first use and kept until invalidated.

pub mod ranks;
pub mod settings;

/// Registry name of the guild settings cache.
pub const SETTINGS: &str = "settings";

/// Registry name of the invite ranks cache.
pub const RANKS: &str = "ranks";
