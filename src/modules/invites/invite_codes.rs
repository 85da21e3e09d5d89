use crate::api::Embed;
use crate::db::{Database, InviteCode};
use crate::error::ActionResult;
use crate::framework::{CommandContext, CommandHandler, ResolvedInvocation};
use async_trait::async_trait;
use tracing::debug;

pub struct InviteCodesCommand {
    db: Database,
}

impl InviteCodesCommand {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

fn describe(code: &InviteCode) -> String {
    let channel = code
        .channel_id
        .map_or_else(|| "unknown channel".to_string(), |c| format!("<#{c}>"));
    let max_uses = if code.max_uses == 0 {
        "unlimited".to_string()
    } else {
        code.max_uses.to_string()
    };
    format!("{} uses (max {max_uses}) in {channel}", code.uses)
}

/// Embed listing `codes` at unix time `now`. Expired codes are dropped.
fn render(guild_name: &str, codes: &[InviteCode], now: i64) -> Embed {
    let valid: Vec<&InviteCode> = codes.iter().filter(|c| !c.is_expired(now)).collect();
    let (permanent, temporary): (Vec<&InviteCode>, Vec<&InviteCode>) =
        valid.into_iter().partition(|c| c.max_age == 0);

    let mut embed = Embed::new().title(format!("Your invite codes on {guild_name}"));
    if permanent.is_empty() && temporary.is_empty() {
        return embed.description("You have no active invite codes.");
    }

    let recommended = permanent.iter().max_by_key(|c| c.uses);
    embed = match recommended {
        Some(code) => embed.field("Recommended code", format!("https://discord.gg/{}", code.code), false),
        None => embed.field(
            "Recommended code",
            "Create a permanent invite to get a recommendation.",
            false,
        ),
    };

    for code in &permanent {
        embed = embed.field(format!("{} (permanent)", code.code), describe(code), true);
    }
    for code in &temporary {
        let remaining = (code.created_at + code.max_age - now).max(0);
        embed = embed.field(
            format!("{} (expires in {})", code.code, humanize(remaining)),
            describe(code),
            true,
        );
    }
    embed
}

fn humanize(secs: i64) -> String {
    match secs {
        s if s >= 86_400 => format!("{}d", s / 86_400),
        s if s >= 3_600 => format!("{}h", s / 3_600),
        s if s >= 60 => format!("{}m", s / 60),
        s => format!("{s}s"),
    }
}

#[async_trait]
impl CommandHandler for InviteCodesCommand {
    async fn run(&self, ctx: &CommandContext, _inv: &ResolvedInvocation) -> ActionResult {
        let (guild, _, _) = ctx.guild_parts()?;
        let author = ctx.author().id;

        let mut codes = self.db.invite_codes().list_by_inviter(guild.id, author).await?;
        let live: Vec<InviteCode> = ctx
            .api
            .invites(guild.id)
            .await?
            .iter()
            .filter(|i| i.inviter_id == Some(author))
            .map(InviteCode::from)
            .collect();

        let fresh: Vec<InviteCode> = live
            .into_iter()
            .filter(|l| !codes.iter().any(|c| c.code == l.code))
            .collect();
        if !fresh.is_empty() {
            debug!(guild = guild.id, count = fresh.len(), "Storing new invite codes");
            self.db.invite_codes().insert_many(&fresh).await?;
            codes.extend(fresh);
        }

        let now = chrono::Utc::now().timestamp();
        ctx.api.send_dm(author, render(&guild.name, &codes, now).into()).await?;
        ctx.reply(format!("<@{author}>, I sent you a direct message with your invite codes."))
            .await?;
        Ok(())
    }
}
