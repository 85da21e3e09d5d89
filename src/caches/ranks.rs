//! Invite ranks cache.

use crate::db::{Database, Rank};
use crate::error::ActionError;
use crate::framework::{CacheLoader, RegistryBuilder, ScopeKey, ScopedCache};
use crate::services::DATABASE;
use async_trait::async_trait;
use std::sync::Arc;

/// Loads a guild's ranks, ordered by required invites.
pub struct RanksLoader {
    db: Database,
}

#[async_trait]
impl CacheLoader<Vec<Rank>> for RanksLoader {
    async fn load(&self, guild_id: ScopeKey) -> Result<Vec<Rank>, ActionError> {
        Ok(self.db.ranks().list(guild_id).await?)
    }
}

/// Register the ranks cache.
pub fn provide(registry: &mut RegistryBuilder) {
    registry.cache(super::RANKS, &[DATABASE], |registry| {
        let db = registry.service::<Database>(DATABASE)?;
        let loader = RanksLoader {
            db: Database::clone(&db),
        };
        Ok(ScopedCache::new(super::RANKS, Arc::new(loader)))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_guilds_are_isolated() {
        let db = Database::new(":memory:").await.unwrap();
        db.ranks().upsert(1, 10, 5, "five").await.unwrap();
        db.ranks().upsert(2, 20, 1, "one").await.unwrap();

        let cache = ScopedCache::new("ranks", Arc::new(RanksLoader { db: db.clone() }));
        assert_eq!(cache.get(1).await.unwrap().len(), 1);
        assert_eq!(cache.get(2).await.unwrap()[0].role_id, 20);

        db.ranks().upsert(1, 11, 10, "ten").await.unwrap();
        cache.invalidate(1).await;
        assert_eq!(cache.get(1).await.unwrap().len(), 2);
        assert_eq!(cache.get(2).await.unwrap().len(), 1);
    }
}
