//! Guild settings cache.

use crate::db::{Database, GuildSettings};
use crate::error::ActionError;
use crate::framework::{CacheLoader, CoreDeps, RegistryBuilder, ScopeKey, ScopedCache};
use crate::services::DATABASE;
use async_trait::async_trait;
use std::sync::Arc;

/// Loads a guild's stored settings, falling back to defaults for guilds
/// that never changed anything.
pub struct SettingsLoader {
    db: Database,
    default_prefix: String,
}

impl SettingsLoader {
    pub fn new(db: Database, default_prefix: impl Into<String>) -> Self {
        Self {
            db,
            default_prefix: default_prefix.into(),
        }
    }
}

#[async_trait]
impl CacheLoader<GuildSettings> for SettingsLoader {
    async fn load(&self, guild_id: ScopeKey) -> Result<GuildSettings, ActionError> {
        let stored = self.db.settings().get(guild_id).await?;
        Ok(stored.unwrap_or_else(|| GuildSettings::with_defaults(guild_id, &self.default_prefix)))
    }
}

/// Register the settings cache.
pub fn provide(registry: &mut RegistryBuilder, deps: &CoreDeps) {
    let default_prefix = deps.config.bot.default_prefix.clone();
    registry.cache(super::SETTINGS, &[DATABASE], move |registry| {
        let db = registry.service::<Database>(DATABASE)?;
        let loader = SettingsLoader::new(Database::clone(&db), default_prefix.clone());
        Ok(ScopedCache::new(super::SETTINGS, Arc::new(loader)))
    });
}
