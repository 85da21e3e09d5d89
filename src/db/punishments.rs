//! Punishment records.

use super::{DbError, from_db_id, to_db_id};
use crate::api::{GuildId, UserId};
use sqlx::SqlitePool;
use std::fmt;
use std::str::FromStr;

/// What kind of punishment was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PunishmentKind {
    Warn,
    Mute,
    Kick,
    Ban,
}

impl PunishmentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Warn => "warn",
            Self::Mute => "mute",
            Self::Kick => "kick",
            Self::Ban => "ban",
        }
    }
}

impl fmt::Display for PunishmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PunishmentKind {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "warn" => Ok(Self::Warn),
            "mute" => Ok(Self::Mute),
            "kick" => Ok(Self::Kick),
            "ban" => Ok(Self::Ban),
            other => Err(DbError::InvalidValue {
                column: "punishments.kind",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Punishment {
    pub id: i64,
    pub guild_id: GuildId,
    pub member_id: UserId,
    pub kind: PunishmentKind,
    /// Strike weight of the punishment.
    pub amount: i64,
    pub reason: String,
    pub creator_id: UserId,
    /// Unix timestamp (seconds).
    pub created_at: i64,
}

/// Fields of a punishment about to be recorded.
#[derive(Debug, Clone)]
pub struct NewPunishment<'r> {
    pub guild_id: GuildId,
    pub member_id: UserId,
    pub kind: PunishmentKind,
    pub amount: i64,
    pub reason: &'r str,
    pub creator_id: UserId,
}

type PunishmentRow = (i64, i64, i64, String, i64, String, i64, i64);

fn from_row(row: PunishmentRow) -> Result<Punishment, DbError> {
    let (id, guild_id, member_id, kind, amount, reason, creator_id, created_at) = row;
    Ok(Punishment {
        id,
        guild_id: from_db_id(guild_id),
        member_id: from_db_id(member_id),
        kind: kind.parse()?,
        amount,
        reason,
        creator_id: from_db_id(creator_id),
        created_at,
    })
}

/// Repository for punishments.
pub struct PunishmentRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PunishmentRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a punishment and return the stored row.
    pub async fn insert(&self, new: &NewPunishment<'_>) -> Result<Punishment, DbError> {
        let now = chrono::Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO punishments (guild_id, member_id, kind, amount, reason, creator_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(to_db_id(new.guild_id))
        .bind(to_db_id(new.member_id))
        .bind(new.kind.as_str())
        .bind(new.amount)
        .bind(new.reason)
        .bind(to_db_id(new.creator_id))
        .bind(now)
        .execute(self.pool)
        .await?;

        Ok(Punishment {
            id: result.last_insert_rowid(),
            guild_id: new.guild_id,
            member_id: new.member_id,
            kind: new.kind,
            amount: new.amount,
            reason: new.reason.to_string(),
            creator_id: new.creator_id,
            created_at: now,
        })
    }

    /// Punishments of one member, newest first.
    pub async fn list_for_member(
        &self,
        guild_id: GuildId,
        member_id: UserId,
    ) -> Result<Vec<Punishment>, DbError> {
        let rows = sqlx::query_as::<_, PunishmentRow>(
            r#"
            SELECT id, guild_id, member_id, kind, amount, reason, creator_id, created_at
            FROM punishments
            WHERE guild_id = ? AND member_id = ?
            ORDER BY id DESC
            "#,
        )
        .bind(to_db_id(guild_id))
        .bind(to_db_id(member_id))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(from_row).collect()
    }

    /// Number of punishments recorded in a guild.
    pub async fn count(&self, guild_id: GuildId) -> Result<i64, DbError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM punishments WHERE guild_id = ?")
            .bind(to_db_id(guild_id))
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
