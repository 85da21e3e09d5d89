//! Per-guild settings.

use super::{DbError, from_db_id, to_db_id};
use crate::api::GuildId;
use sqlx::SqlitePool;

/// Settings of one guild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildSettings {
    pub guild_id: GuildId,
    pub prefix: String,
    /// Module names switched off in this guild.
    pub disabled_modules: Vec<String>,
    /// Delete the command and the reply of `warn` after a short delay.
    pub warn_delete_message: bool,
}

impl GuildSettings {
    /// Settings for a guild that has never stored any.
    pub fn with_defaults(guild_id: GuildId, prefix: &str) -> Self {
        Self {
            guild_id,
            prefix: prefix.to_string(),
            disabled_modules: Vec::new(),
            warn_delete_message: false,
        }
    }

    pub fn is_module_disabled(&self, module: &str) -> bool {
        self.disabled_modules
            .iter()
            .any(|m| m.eq_ignore_ascii_case(module))
    }
}

fn join_modules(modules: &[String]) -> String {
    modules.join(",")
}

fn split_modules(stored: &str) -> Vec<String> {
    stored
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

/// Repository for guild settings.
pub struct SettingsRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SettingsRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Stored settings of a guild, if any.
    pub async fn get(&self, guild_id: GuildId) -> Result<Option<GuildSettings>, DbError> {
        let row = sqlx::query_as::<_, (i64, String, String, bool)>(
            r#"
            SELECT guild_id, prefix, disabled_modules, warn_delete_message
            FROM guild_settings
            WHERE guild_id = ?
            "#,
        )
        .bind(to_db_id(guild_id))
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(
            |(guild_id, prefix, disabled_modules, warn_delete_message)| GuildSettings {
                guild_id: from_db_id(guild_id),
                prefix,
                disabled_modules: split_modules(&disabled_modules),
                warn_delete_message,
            },
        ))
    }

    /// Insert or replace a guild's settings.
    pub async fn upsert(&self, settings: &GuildSettings) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO guild_settings (guild_id, prefix, disabled_modules, warn_delete_message)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(guild_id) DO UPDATE SET
                prefix = excluded.prefix,
                disabled_modules = excluded.disabled_modules,
                warn_delete_message = excluded.warn_delete_message
            "#,
        )
        .bind(to_db_id(settings.guild_id))
        .bind(&settings.prefix)
        .bind(join_modules(&settings.disabled_modules))
        .bind(settings.warn_delete_message)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    #[tokio::test]
    async fn test_settings_roundtrip() {
        let db = Database::new(":memory:").await.unwrap();
        assert!(db.settings().get(7).await.unwrap().is_none());

        let mut settings = GuildSettings::with_defaults(7, "?");
        settings.disabled_modules = vec!["invites".into(), "moderation".into()];
        db.settings().upsert(&settings).await.unwrap();

        settings.warn_delete_message = true;
        db.settings().upsert(&settings).await.unwrap();

        let stored = db.settings().get(7).await.unwrap().unwrap();
        assert_eq!(stored, settings);
        assert!(stored.is_module_disabled("Invites"));
        assert!(!stored.is_module_disabled("info"));
    }

    #[test]
    fn test_split_modules_skips_blanks() {
        assert!(split_modules("").is_empty());
        assert_eq!(split_modules("a, ,b"), vec!["a", "b"]);
    }
}
