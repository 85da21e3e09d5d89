//! Invite ranks: roles granted once a member reaches a number of invites.

use super::{DbError, from_db_id, to_db_id};
use crate::api::{GuildId, RoleId};
use sqlx::SqlitePool;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rank {
    pub guild_id: GuildId,
    pub role_id: RoleId,
    pub num_invites: i64,
    pub description: String,
}

/// Repository for ranks.
pub struct RankRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> RankRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// All ranks of a guild, lowest invite count first.
    pub async fn list(&self, guild_id: GuildId) -> Result<Vec<Rank>, DbError> {
        let rows = sqlx::query_as::<_, (i64, i64, i64, String)>(
            r#"
            SELECT guild_id, role_id, num_invites, description
            FROM ranks
            WHERE guild_id = ?
            ORDER BY num_invites ASC, role_id ASC
            "#,
        )
        .bind(to_db_id(guild_id))
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(guild_id, role_id, num_invites, description)| Rank {
                guild_id: from_db_id(guild_id),
                role_id: from_db_id(role_id),
                num_invites,
                description,
            })
            .collect())
    }

    /// Create or update the rank for `role_id`. Returns `true` when an
    /// existing rank was updated.
    pub async fn upsert(
        &self,
        guild_id: GuildId,
        role_id: RoleId,
        num_invites: i64,
        description: &str,
    ) -> Result<bool, DbError> {
        let existed: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM ranks WHERE guild_id = ? AND role_id = ?")
                .bind(to_db_id(guild_id))
                .bind(to_db_id(role_id))
                .fetch_optional(self.pool)
                .await?;

        sqlx::query(
            r#"
            INSERT INTO ranks (guild_id, role_id, num_invites, description)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(guild_id, role_id) DO UPDATE SET
                num_invites = excluded.num_invites,
                description = excluded.description
            "#,
        )
        .bind(to_db_id(guild_id))
        .bind(to_db_id(role_id))
        .bind(num_invites)
        .bind(description)
        .execute(self.pool)
        .await?;

        Ok(existed.is_some())
    }

    /// Remove the rank for `role_id`. Returns `false` if there was none.
    pub async fn remove(&self, guild_id: GuildId, role_id: RoleId) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM ranks WHERE guild_id = ? AND role_id = ?")
            .bind(to_db_id(guild_id))
            .bind(to_db_id(role_id))
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::db::Database;

    #[tokio::test]
    async fn test_rank_upsert_and_remove() {
        let db = Database::new(":memory:").await.unwrap();
        let ranks = db.ranks();

        assert!(!ranks.upsert(1, 30, 10, "ten").await.unwrap());
        assert!(!ranks.upsert(1, 20, 5, "five").await.unwrap());
        assert!(ranks.upsert(1, 30, 12, "twelve").await.unwrap());

        let listed = ranks.list(1).await.unwrap();
        assert_eq!(
            listed.iter().map(|r| r.num_invites).collect::<Vec<_>>(),
            vec![5, 12]
        );
        assert_eq!(listed[1].description, "twelve");

        assert!(ranks.remove(1, 20).await.unwrap());
        assert!(!ranks.remove(1, 20).await.unwrap());
        assert_eq!(ranks.list(1).await.unwrap().len(), 1);
    }
}
