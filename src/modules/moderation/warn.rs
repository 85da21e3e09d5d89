use crate::db::PunishmentKind;
use crate::error::ActionResult;
use crate::framework::{CommandContext, CommandHandler, ResolvedInvocation};
use crate::services::ModerationService;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// How long the command and its reply stay up when the guild asks for
/// warnings to be cleaned up.
pub const WARN_DELETE_DELAY: Duration = Duration::from_secs(4);

pub struct WarnCommand {
    moderation: Arc<ModerationService>,
}

impl WarnCommand {
    pub fn new(moderation: Arc<ModerationService>) -> Self {
        Self { moderation }
    }
}

#[async_trait]
impl CommandHandler for WarnCommand {
    async fn run(&self, ctx: &CommandContext, inv: &ResolvedInvocation) -> ActionResult {
        let (guild, invoker, me) = ctx.guild_parts()?;
        let target = inv.require("member", ResolvedInvocation::member)?;
        let reason = inv.text("reason").unwrap_or_default();

        let mut embed = self.moderation.basic_embed(target);
        if self.moderation.is_punishable(guild, target, invoker, me) {
            self.moderation
                .punishments()
                .punish(guild.id, target, PunishmentKind::Warn, 0, invoker.id(), reason)
                .await?;
            embed = embed.description(format!("{} has been warned.", target.mention()));
        } else {
            embed = embed.description(format!("You cannot warn {}.", target.mention()));
        }

        let reply = ctx.reply(embed).await?;
        if ctx.settings.warn_delete_message {
            let api = ctx.api.clone();
            let channel = ctx.channel_id();
            let command_message = ctx.message.id;
            tokio::spawn(async move {
                tokio::time::sleep(WARN_DELETE_DELAY).await;
                for message in [command_message, reply] {
                    if let Err(e) = api.delete(channel, message).await {
                        debug!(message_id = message, error = %e, "Failed to clean up warn message");
                    }
                }
            });
        }
        Ok(())
    }
}
