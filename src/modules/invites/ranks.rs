use crate::api::Embed;
use crate::db::{Database, Rank};
use crate::error::ActionResult;
use crate::framework::{
    CommandContext, CommandHandler, PageRenderer, ResolvedInvocation, ScopedCache,
};
use async_trait::async_trait;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::info;

pub const RANKS_PER_PAGE: usize = 10;

pub struct RanksCommand {
    ranks: Arc<ScopedCache<Vec<Rank>>>,
}

impl RanksCommand {
    pub fn new(ranks: Arc<ScopedCache<Vec<Rank>>>) -> Self {
        Self { ranks }
    }
}

fn render_page(ranks: &[Rank], page: usize, compact: bool) -> Embed {
    let mut description = String::new();
    for rank in ranks.iter().skip(page * RANKS_PER_PAGE).take(RANKS_PER_PAGE) {
        let _ = write!(description, "<@&{}>: **{} invites**", rank.role_id, rank.num_invites);
        if !compact && !rank.description.is_empty() {
            let _ = write!(description, " - {}", rank.description);
        }
        description.push('\n');
    }
    Embed::new().title("Ranks").description(description)
}

#[async_trait]
impl CommandHandler for RanksCommand {
    async fn run(&self, ctx: &CommandContext, inv: &ResolvedInvocation) -> ActionResult {
        let (guild, _, _) = ctx.guild_parts()?;
        let ranks = self.ranks.get(guild.id).await?;

        if ranks.is_empty() {
            ctx.reply("There are no ranks on this server.").await?;
            return Ok(());
        }

        let total = ranks.len().div_ceil(RANKS_PER_PAGE);
        let start = inv.number("page").map_or(0, |page| page.saturating_sub(1));
        let compact = inv.has_flag("compact");
        let renderer: PageRenderer = Arc::new(move |page| render_page(&ranks, page, compact));

        ctx.pagination
            .start(ctx.channel_id(), ctx.author().id, start, total, renderer)
            .await?;
        Ok(())
    }
}

pub struct AddRankCommand {
    db: Database,
    ranks: Arc<ScopedCache<Vec<Rank>>>,
}

impl AddRankCommand {
    pub fn new(db: Database, ranks: Arc<ScopedCache<Vec<Rank>>>) -> Self {
        Self { db, ranks }
    }
}

#[async_trait]
impl CommandHandler for AddRankCommand {
    async fn run(&self, ctx: &CommandContext, inv: &ResolvedInvocation) -> ActionResult {
        let (guild, _, _) = ctx.guild_parts()?;
        let role = inv.require("role", ResolvedInvocation::role)?;
        let invites = inv.require("invites", ResolvedInvocation::number)?;
        let description = inv.text("description").unwrap_or_default();

        let updated = self
            .db
            .ranks()
            .upsert(guild.id, role.id, invites, description)
            .await?;
        self.ranks.invalidate(guild.id).await;

        info!(guild = guild.id, role = role.id, invites, updated, "Rank saved");
        let reply = if updated {
            format!("Rank **{}** updated: now needs {} invites.", role.name, invites)
        } else {
            format!("Rank **{}** added: needs {} invites.", role.name, invites)
        };
        ctx.reply(reply).await?;
        Ok(())
    }
}

pub struct RemoveRankCommand {
    db: Database,
    ranks: Arc<ScopedCache<Vec<Rank>>>,
}

impl RemoveRankCommand {
    pub fn new(db: Database, ranks: Arc<ScopedCache<Vec<Rank>>>) -> Self {
        Self { db, ranks }
    }
}

#[async_trait]
impl CommandHandler for RemoveRankCommand {
    async fn run(&self, ctx: &CommandContext, inv: &ResolvedInvocation) -> ActionResult {
        let (guild, _, _) = ctx.guild_parts()?;
        let role = inv.require("role", ResolvedInvocation::role)?;

        let removed = self.db.ranks().remove(guild.id, role.id).await?;
        if !removed {
            ctx.reply(format!("**{}** is not a rank.", role.name)).await?;
            return Ok(());
        }
        self.ranks.invalidate(guild.id).await;

        info!(guild = guild.id, role = role.id, "Rank removed");
        ctx.reply(format!("Rank **{}** removed.", role.name)).await?;
        Ok(())
    }
}
