use crate::error::ActionResult;
use crate::framework::{CommandContext, CommandHandler, ResolvedInvocation};
use async_trait::async_trait;
use tracing::warn;

pub struct MentionRoleCommand;

#[async_trait]
impl CommandHandler for MentionRoleCommand {
    async fn run(&self, ctx: &CommandContext, inv: &ResolvedInvocation) -> ActionResult {
        let (guild, _, me) = ctx.guild_parts()?;
        let role = inv.require("role", ResolvedInvocation::role)?;

        if role.mentionable {
            ctx.reply(format!(
                "<@&{}> is already mentionable, just mention it yourself.",
                role.id
            ))
            .await?;
            return Ok(());
        }

        let my_role = guild.highest_role(me);
        if my_role.is_none_or(|mine| mine.position < role.position) {
            let mine = my_role.map_or("@everyone", |r| r.name.as_str());
            ctx.reply(format!(
                "I cannot edit **{}** because it is above my highest role **{}**.",
                role.name, mine
            ))
            .await?;
            return Ok(());
        }

        ctx.api.edit_role(guild.id, role.id, true).await?;
        let sent = ctx.reply(format!("<@&{}>", role.id)).await;
        ctx.api.edit_role(guild.id, role.id, false).await?;
        sent?;

        if let Err(e) = ctx.api.delete(ctx.channel_id(), ctx.message.id).await {
            warn!(message_id = ctx.message.id, error = %e, "Failed to delete mentionRole command");
        }
        Ok(())
    }
}
