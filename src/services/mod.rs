//! Process-wide services.
//!
//! Services are registry singletons shared by every guild. They hold no
//! per-guild state; the database is their serialization point.

pub mod moderation;
pub mod punishment;

pub use moderation::ModerationService;
pub use punishment::PunishmentService;

/// Registry name of the shared [`crate::db::Database`] handle.
pub const DATABASE: &str = "database";

/// Registry name of [`PunishmentService`].
pub const PUNISHMENTS: &str = "punishments";

/// Registry name of [`ModerationService`].
pub const MODERATION: &str = "moderation";
