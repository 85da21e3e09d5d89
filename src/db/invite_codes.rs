//! Invite codes seen on the platform.

use super::{DbError, from_db_id, to_db_id};
use crate::api::{ChannelId, GuildId, GuildInvite, UserId};
use sqlx::SqlitePool;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteCode {
    pub code: String,
    pub guild_id: GuildId,
    pub channel_id: Option<ChannelId>,
    pub inviter_id: Option<UserId>,
    pub uses: i64,
    pub max_uses: i64,
    /// Lifetime in seconds; `0` means permanent.
    pub max_age: i64,
    pub temporary: bool,
    /// Unix timestamp (seconds).
    pub created_at: i64,
}

impl InviteCode {
    /// Whether the code has expired at unix time `now`.
    pub fn is_expired(&self, now: i64) -> bool {
        self.max_age > 0 && self.created_at + self.max_age <= now
    }
}

impl From<&GuildInvite> for InviteCode {
    fn from(invite: &GuildInvite) -> Self {
        Self {
            code: invite.code.clone(),
            guild_id: invite.guild_id,
            channel_id: invite.channel_id,
            inviter_id: invite.inviter_id,
            uses: invite.uses,
            max_uses: invite.max_uses,
            max_age: invite.max_age,
            temporary: invite.temporary,
            created_at: invite.created_at,
        }
    }
}

type InviteCodeRow = (String, i64, Option<i64>, Option<i64>, i64, i64, i64, bool, i64);

/// Repository for invite codes.
pub struct InviteCodeRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> InviteCodeRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Codes created by `inviter_id` in a guild.
    pub async fn list_by_inviter(
        &self,
        guild_id: GuildId,
        inviter_id: UserId,
    ) -> Result<Vec<InviteCode>, DbError> {
        let rows = sqlx::query_as::<_, InviteCodeRow>(
            r#"
            SELECT code, guild_id, channel_id, inviter_id, uses, max_uses, max_age, temporary, created_at
            FROM invite_codes
            WHERE guild_id = ? AND inviter_id = ?
            ORDER BY created_at ASC, code ASC
            "#,
        )
        .bind(to_db_id(guild_id))
        .bind(to_db_id(inviter_id))
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(code, guild_id, channel_id, inviter_id, uses, max_uses, max_age, temporary, created_at)| {
                    InviteCode {
                        code,
                        guild_id: from_db_id(guild_id),
                        channel_id: channel_id.map(from_db_id),
                        inviter_id: inviter_id.map(from_db_id),
                        uses,
                        max_uses,
                        max_age,
                        temporary,
                        created_at,
                    }
                },
            )
            .collect())
    }

    /// Store codes, updating use counts of codes already known.
    pub async fn insert_many(&self, codes: &[InviteCode]) -> Result<(), DbError> {
        if codes.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for code in codes {
            sqlx::query(
                r#"
                INSERT INTO invite_codes
                    (code, guild_id, channel_id, inviter_id, uses, max_uses, max_age, temporary, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(code) DO UPDATE SET uses = excluded.uses
                "#,
            )
            .bind(&code.code)
            .bind(to_db_id(code.guild_id))
            .bind(code.channel_id.map(to_db_id))
            .bind(code.inviter_id.map(to_db_id))
            .bind(code.uses)
            .bind(code.max_uses)
            .bind(code.max_age)
            .bind(code.temporary)
            .bind(code.created_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(())
    }
}
