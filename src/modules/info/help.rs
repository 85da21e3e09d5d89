use crate::api::{Embed, Permission};
use crate::error::{ActionError, ActionResult};
use crate::framework::{CommandContext, CommandHandler, ResolvedInvocation};
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Permissions admins are told about when the bot lacks them.
const RECOMMENDED_PERMISSIONS: [Permission; 3] = [
    Permission::ManageGuild,
    Permission::ViewAuditLog,
    Permission::ManageRoles,
];

pub struct HelpCommand;

impl HelpCommand {
    fn command_details(ctx: &CommandContext, name: &str) -> Result<Embed, ActionError> {
        let command = ctx
            .commands
            .find(name)
            .ok_or_else(|| ActionError::Internal(format!("resolved command {name} vanished")))?;
        let descriptor = &command.descriptor;

        let mut usage = format!("`{}`", descriptor.usage(ctx.prefix()));
        if !descriptor.extra_examples.is_empty() {
            usage.push_str("\n\nExamples:");
            for example in &descriptor.extra_examples {
                usage.push_str(&format!("\n`{}`", example.replacen('!', ctx.prefix(), 1)));
            }
        }

        let mut embed = Embed::new()
            .field("Command", descriptor.name, true)
            .field("Description", descriptor.description, true)
            .field("Usage", usage, false);
        if !descriptor.aliases.is_empty() {
            embed = embed.field("Aliases", descriptor.aliases.join(", "), true);
        }
        Ok(embed)
    }

    fn overview(ctx: &CommandContext) -> Embed {
        let prefix = ctx.prefix();
        let mut embed = Embed::new().description(format!(
            "Type `{prefix}help <command>` to see details of a command."
        ));

        let mut by_group: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for command in ctx.commands.iter() {
            let descriptor = &command.descriptor;
            by_group
                .entry(descriptor.group)
                .or_default()
                .push(descriptor.name);
        }
        for (group, mut names) in by_group {
            names.sort_by_key(|n| n.to_lowercase());
            let listed: Vec<String> = names.iter().map(|n| format!("`{n}`")).collect();
            embed = embed.field(group, listed.join(", "), false);
        }

        if ctx.author_has(Permission::Administrator) {
            let missing = ctx.bot_missing(&RECOMMENDED_PERMISSIONS);
            if !missing.is_empty() {
                let listed: Vec<String> = missing.iter().map(|p| format!("`{p}`")).collect();
                embed = embed.field("Missing permissions", listed.join(", "), false);
            }
        }
        embed
    }
}

#[async_trait]
impl CommandHandler for HelpCommand {
    async fn run(&self, ctx: &CommandContext, inv: &ResolvedInvocation) -> ActionResult {
        let mut embed = match inv.command("command") {
            Some(name) => Self::command_details(ctx, name)?,
            None => Self::overview(ctx),
        };

        let links = &ctx.bot.links;
        let mut parts = Vec::new();
        if let Some(support) = &links.support {
            parts.push(format!("[Support server]({support})"));
        }
        if let Some(add) = &links.add {
            parts.push(format!("[Add {}]({add})", ctx.bot.name));
        }
        if !parts.is_empty() {
            embed = embed.field("Links", parts.join(" | "), false);
        }

        ctx.reply(embed).await?;
        Ok(())
    }
}
