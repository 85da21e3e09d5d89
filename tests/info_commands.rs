//! Integration tests for help and getBot.

mod common;
use common::*;
use imbot::error::ResolutionError;
use imbot::framework::DispatchOutcome;

#[tokio::test]
async fn test_help_lists_groups() -> anyhow::Result<()> {
    let bot = TestBot::new().await?;

    bot.send(ALICE, "!help").await;
    let help = bot.last_reply();
    assert!(help.contains("Type `!help <command>`"));
    assert!(help.contains("Ranks: `addRank`, `ranks`, `removeRank`"));
    assert!(help.contains("Moderation: `warn`"));
    assert!(help.contains("[Support server](https://example.org/support)"));
    assert!(!help.contains("Missing permissions"));
    Ok(())
}

#[tokio::test]
async fn test_help_for_admins_lists_missing_bot_permissions() -> anyhow::Result<()> {
    let bot = TestBot::new().await?;

    bot.send(ADMIN, "!help").await;
    let help = bot.last_reply();
    assert!(help.contains("Missing permissions: `Manage Server`, `View Audit Log`"));
    assert!(!help.contains("`Manage Roles`"));
    Ok(())
}

#[tokio::test]
async fn test_help_for_command() -> anyhow::Result<()> {
    let bot = TestBot::new().await?;

    let outcome = bot.send(ALICE, "!help SET-RANK").await;
    assert!(matches!(outcome, DispatchOutcome::Completed), "{outcome:?}");
    let help = bot.last_reply();
    assert!(help.contains("Command: addRank"));
    assert!(help.contains("`!addRank <role> <invites> [description...]`"));
    assert!(help.contains("Aliases: add-rank, set-rank, setRank"));
    assert!(help.contains("`!addRank @Role 5`"));

    let outcome = bot.send(ALICE, "!help nothing").await;
    assert!(matches!(outcome, DispatchOutcome::Invalid(ResolutionError::NotFound { .. })));
    Ok(())
}

#[tokio::test]
async fn test_get_bot_link() -> anyhow::Result<()> {
    let bot = TestBot::new().await?;

    bot.send(ALICE, "!invite-bot").await;
    assert!(bot.last_reply().contains(&format!(
        "(https://example.org/add-bot?origin=getbot&user={ALICE}&guild={GUILD})"
    )));

    bot.send_dm(ALICE, "!getBot").await;
    assert!(bot
        .last_reply()
        .trim_end()
        .ends_with(&format!("?origin=getbot&user={ALICE})")));
    Ok(())
}
