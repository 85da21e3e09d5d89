use crate::api::Embed;
use crate::error::ActionResult;
use crate::framework::{CommandContext, CommandHandler, ResolvedInvocation};
use async_trait::async_trait;

pub struct GetBotCommand;

#[async_trait]
impl CommandHandler for GetBotCommand {
    async fn run(&self, ctx: &CommandContext, _inv: &ResolvedInvocation) -> ActionResult {
        let Some(add) = &ctx.bot.links.add else {
            ctx.reply("No invite link is configured for this bot.").await?;
            return Ok(());
        };

        let mut link = format!("{add}?origin=getbot&user={}", ctx.author().id);
        if let Some(guild_id) = ctx.guild_id() {
            link.push_str(&format!("&guild={guild_id}"));
        }

        let embed = Embed::new().description(format!("[Add {} to your server]({link})", ctx.bot.name));
        ctx.reply(embed).await?;
        Ok(())
    }
}
