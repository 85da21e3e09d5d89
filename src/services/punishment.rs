//! Punishment bookkeeping.

use crate::api::{GuildId, Member, UserId};
use crate::db::{Database, NewPunishment, Punishment, PunishmentKind};
use crate::error::ActionError;
use crate::framework::RegistryBuilder;
use tracing::info;

/// Records punishments. Escalation rules are out of scope; every call
/// stores exactly one record.
pub struct PunishmentService {
    db: Database,
}

impl PunishmentService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn punish(
        &self,
        guild_id: GuildId,
        target: &Member,
        kind: PunishmentKind,
        amount: i64,
        creator_id: UserId,
        reason: &str,
    ) -> Result<Punishment, ActionError> {
        let record = self
            .db
            .punishments()
            .insert(&NewPunishment {
                guild_id,
                member_id: target.id(),
                kind,
                amount,
                reason,
                creator_id,
            })
            .await?;

        info!(
            guild = guild_id,
            member = target.id(),
            creator = creator_id,
            kind = %kind,
            id = record.id,
            "Punishment recorded"
        );
        Ok(record)
    }
}

/// Register the punishment service.
pub fn provide(registry: &mut RegistryBuilder) {
    registry.service(super::PUNISHMENTS, &[super::DATABASE], |registry| {
        let db = registry.service::<Database>(super::DATABASE)?;
        Ok(PunishmentService::new(Database::clone(&db)))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::User;

    #[tokio::test]
    async fn test_punish_records_once() {
        let db = Database::new(":memory:").await.unwrap();
        let service = PunishmentService::new(db.clone());
        let target = Member {
            user: User {
                id: 5,
                name: "spammer".into(),
                bot: false,
            },
            nick: None,
            roles: vec![],
        };

        let record = service
            .punish(1, &target, PunishmentKind::Warn, 0, 9, "spamming")
            .await
            .unwrap();
        assert_eq!(record.kind, PunishmentKind::Warn);
        assert_eq!(record.reason, "spamming");

        let history = db.punishments().list_for_member(1, 5).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].creator_id, 9);
        assert!(db.punishments().list_for_member(2, 5).await.unwrap().is_empty());
    }
}
