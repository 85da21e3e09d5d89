//! Integration tests for the dispatch pipeline: headers, lookup, guards,
//! argument errors and failure containment.

mod common;
use async_trait::async_trait;
use common::*;
use imbot::db::GuildSettings;
use imbot::error::{ActionError, ActionResult, ConfigurationError, GuardError, ResolutionError};
use imbot::framework::dispatcher::GENERIC_FAILURE;
use imbot::framework::{
    CommandContext, CommandDescriptor, CommandHandler, DispatchOutcome, Module, ModuleRegistrar,
    Registry, ResolvedInvocation,
};

#[tokio::test]
async fn test_non_commands_are_ignored() -> anyhow::Result<()> {
    let bot = TestBot::new().await?;

    for line in ["hello there", "! help", "!", "!nope", "<@999> help"] {
        let outcome = bot.send(ALICE, line).await;
        assert!(matches!(outcome, DispatchOutcome::Ignored), "{line}: {outcome:?}");
    }
    assert!(bot.replies().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_bot_authors_are_ignored() -> anyhow::Result<()> {
    let bot = TestBot::new().await?;
    let outcome = bot.send(BOT, "!help").await;
    assert!(matches!(outcome, DispatchOutcome::Ignored));
    assert!(bot.replies().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_mention_prefix() -> anyhow::Result<()> {
    let bot = TestBot::new().await?;

    let outcome = bot.send(ALICE, &format!("<@{BOT}> ranks")).await;
    assert!(matches!(outcome, DispatchOutcome::Completed), "{outcome:?}");
    assert_eq!(bot.last_reply(), "There are no ranks on this server.");

    let outcome = bot.send(ALICE, &format!("<@!{BOT}>   HELP")).await;
    assert!(matches!(outcome, DispatchOutcome::Completed), "{outcome:?}");
    Ok(())
}

#[tokio::test]
async fn test_mention_without_known_command() -> anyhow::Result<()> {
    let bot = TestBot::new().await?;

    let outcome = bot.send(ALICE, &format!("<@{BOT}>")).await;
    assert!(matches!(outcome, DispatchOutcome::UnknownCommand));
    assert!(bot.last_reply().contains("My prefix on this server is `!`"));

    let outcome = bot.send(ALICE, &format!("<@{BOT}> dance")).await;
    assert!(matches!(outcome, DispatchOutcome::UnknownCommand));
    assert_eq!(bot.replies().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_unknown_command_notice_can_be_disabled() -> anyhow::Result<()> {
    let config = format!("{CONFIG}\n[dispatch]\nunknown_command_notice = false\n");
    let bot = TestBot::with_config(&config).await?;

    let outcome = bot.send(ALICE, &format!("<@{BOT}> dance")).await;
    assert!(matches!(outcome, DispatchOutcome::Ignored));
    assert!(bot.replies().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_guild_prefix() -> anyhow::Result<()> {
    let bot = TestBot::new().await?;
    bot.store_settings(GuildSettings::with_defaults(GUILD, "?")).await?;

    assert!(matches!(bot.send(ALICE, "!help").await, DispatchOutcome::Ignored));
    assert!(matches!(bot.send(ALICE, "?help").await, DispatchOutcome::Completed));

    bot.send(ALICE, &format!("<@{BOT}>")).await;
    assert!(bot.last_reply().contains("`?`"));

    // Direct messages always use the default prefix.
    assert!(matches!(bot.send_dm(ALICE, "!help").await, DispatchOutcome::Completed));
    Ok(())
}

#[tokio::test]
async fn test_guild_only_in_direct_message() -> anyhow::Result<()> {
    let bot = TestBot::new().await?;

    let outcome = bot.send_dm(ALICE, "!ranks").await;
    assert!(matches!(outcome, DispatchOutcome::Rejected(GuardError::GuildOnly)));
    assert_eq!(bot.last_reply(), "This command can only be used in a server.");
    Ok(())
}

#[tokio::test]
async fn test_disabled_module() -> anyhow::Result<()> {
    let bot = TestBot::new().await?;
    let mut settings = GuildSettings::with_defaults(GUILD, "!");
    settings.disabled_modules = vec!["Moderation".into()];
    bot.store_settings(settings).await?;

    let outcome = bot.send(ADMIN, &format!("!warn <@{ALICE}> spam")).await;
    assert!(
        matches!(&outcome, DispatchOutcome::Rejected(GuardError::ModuleDisabled { module }) if module == "moderation"),
        "{outcome:?}"
    );
    assert!(bot.last_reply().contains("**moderation** module is disabled"));
    assert_eq!(bot.db.punishments().count(GUILD).await?, 0);

    // Other modules keep working.
    assert!(matches!(bot.send(ALICE, "!ranks").await, DispatchOutcome::Completed));
    Ok(())
}

#[tokio::test]
async fn test_disabled_module_can_be_silent() -> anyhow::Result<()> {
    let config = format!("{CONFIG}\n[dispatch]\ndisabled_module_notice = false\n");
    let bot = TestBot::with_config(&config).await?;
    let mut settings = GuildSettings::with_defaults(GUILD, "!");
    settings.disabled_modules = vec!["invites".into()];
    bot.store_settings(settings).await?;

    let outcome = bot.send(ALICE, "!ranks").await;
    assert!(matches!(outcome, DispatchOutcome::Rejected(GuardError::ModuleDisabled { .. })));
    assert!(bot.replies().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_unknown_flags() -> anyhow::Result<()> {
    let bot = TestBot::new().await?;
    let outcome = bot.send(ALICE, "!ranks --bogus").await;
    assert!(matches!(outcome, DispatchOutcome::Invalid(ResolutionError::InvalidFormat { .. })));

    let config = format!("{CONFIG}\n[dispatch]\nstrict_flags = true\n");
    let strict = TestBot::with_config(&config).await?;
    let outcome = strict.send(ALICE, "!ranks --bogus").await;
    assert!(
        matches!(&outcome, DispatchOutcome::Invalid(ResolutionError::UnknownFlag(flag)) if flag == "--bogus"),
        "{outcome:?}"
    );
    assert_eq!(strict.last_reply(), "Unknown flag `--bogus`.");
    Ok(())
}

struct Explode;

#[async_trait]
impl CommandHandler for Explode {
    async fn run(&self, _ctx: &CommandContext, _inv: &ResolvedInvocation) -> ActionResult {
        panic!("boom");
    }
}

struct Fail;

#[async_trait]
impl CommandHandler for Fail {
    async fn run(&self, _ctx: &CommandContext, _inv: &ResolvedInvocation) -> ActionResult {
        Err(ActionError::Internal("storage on fire".into()))
    }
}

struct Faulty;

impl Module for Faulty {
    fn name(&self) -> &'static str {
        "faulty"
    }

    fn register(
        &self,
        commands: &mut ModuleRegistrar<'_>,
        _registry: &Registry,
    ) -> Result<(), ConfigurationError> {
        commands
            .add(CommandDescriptor::new("explode"), Explode)
            .add(CommandDescriptor::new("fail"), Fail);
        Ok(())
    }
}

#[tokio::test]
async fn test_failures_are_contained() -> anyhow::Result<()> {
    let modules = imbot::modules::all().with(Faulty);
    let bot = TestBot::assemble(CONFIG, modules).await?;

    let outcome = bot.send(ALICE, "!explode").await;
    assert!(matches!(outcome, DispatchOutcome::Failed(ActionError::Internal(_))), "{outcome:?}");
    assert_eq!(bot.last_reply(), GENERIC_FAILURE);

    let outcome = bot.send(ALICE, "!fail").await;
    assert!(matches!(outcome, DispatchOutcome::Failed(_)));
    assert!(!bot.last_reply().contains("storage on fire"));

    assert!(matches!(bot.send(ALICE, "!help").await, DispatchOutcome::Completed));
    Ok(())
}
