//! imbot-ng - InviteManager bot (Next Generation)
//!
//! A command framework for a chat bot: typed argument resolution, a guard
//! chain, a dependency-injected registry of services and guild-scoped caches,
//! and reaction-driven pagination. Feature modules (info, invites,
//! moderation, management) are built on top of it.

pub mod api;
pub mod bot;
pub mod caches;
pub mod config;
pub mod db;
pub mod error;
pub mod framework;
pub mod http;
pub mod metrics;
pub mod modules;
pub mod network;
pub mod services;
pub mod telemetry;

pub use bot::Bot;
