//! Moderation rules shared by the moderation commands.

use super::PunishmentService;
use crate::api::{Embed, Guild, Member};
use crate::framework::RegistryBuilder;
use std::sync::Arc;

pub struct ModerationService {
    punishments: Arc<PunishmentService>,
}

impl ModerationService {
    pub fn new(punishments: Arc<PunishmentService>) -> Self {
        Self { punishments }
    }

    pub fn punishments(&self) -> &PunishmentService {
        &self.punishments
    }

    /// Whether `invoker` may punish `target`.
    ///
    /// Nobody can punish themselves or the owner. The owner outranks
    /// everyone else; other invokers, and always the bot, must hold a role
    /// strictly above the target's highest role.
    pub fn is_punishable(&self, guild: &Guild, target: &Member, invoker: &Member, me: &Member) -> bool {
        if target.id() == invoker.id() || target.id() == guild.owner_id {
            return false;
        }

        let target_position = guild.highest_position(target);
        let invoker_outranks =
            invoker.id() == guild.owner_id || guild.highest_position(invoker) > target_position;
        invoker_outranks && guild.highest_position(me) > target_position
    }

    /// Embed skeleton naming the target of a moderation action.
    pub fn basic_embed(&self, target: &Member) -> Embed {
        Embed::new().title(format!("{} ({})", target.display_name(), target.id()))
    }
}

/// Register the moderation service. Depends on the punishment service.
pub fn provide(registry: &mut RegistryBuilder) {
    registry.service(super::MODERATION, &[super::PUNISHMENTS], |registry| {
        let punishments = registry.service::<PunishmentService>(super::PUNISHMENTS)?;
        Ok(ModerationService::new(punishments))
    });
}
