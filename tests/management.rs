//! Integration tests for mentionRole: bot permission guard, role hierarchy,
//! and the mentionable toggle.

mod common;
use common::*;
use imbot::api::{ChatApi, Outbound, Permission};
use imbot::error::GuardError;
use imbot::framework::DispatchOutcome;

fn role_edits(bot: &TestBot) -> Vec<bool> {
    bot.api
        .outbound()
        .into_iter()
        .filter_map(|o| match o {
            Outbound::RoleEdit { mentionable, .. } => Some(mentionable),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_mention_role_toggles() -> anyhow::Result<()> {
    let bot = TestBot::new().await?;

    let outcome = bot.send(ADMIN, "!mr Announcements").await;
    assert!(matches!(outcome, DispatchOutcome::Completed), "{outcome:?}");

    assert_eq!(role_edits(&bot), vec![true, false]);
    assert_eq!(bot.last_reply(), format!("<@&{PING_ROLE}>"));
    assert!(bot
        .api
        .outbound()
        .iter()
        .any(|o| matches!(o, Outbound::Delete { .. })));

    let role = bot.api.lookup_role(GUILD, PING_ROLE).await?.expect("role exists");
    assert!(!role.mentionable);
    Ok(())
}

#[tokio::test]
async fn test_mention_role_above_bot() -> anyhow::Result<()> {
    let bot = TestBot::new().await?;

    bot.send(OWNER, &format!("!mentionRole <@&{STAFF_ROLE}>")).await;
    assert!(bot.last_reply().contains("above my highest role **InviteManager**"));
    assert!(role_edits(&bot).is_empty());
    Ok(())
}

#[tokio::test]
async fn test_mention_role_already_mentionable() -> anyhow::Result<()> {
    let bot = TestBot::new().await?;
    bot.api.edit_role(GUILD, PING_ROLE, true).await?;
    bot.api.clear_log();

    bot.send(ADMIN, "!mention-role announcements").await;
    assert!(bot.last_reply().contains("already mentionable"));
    assert!(role_edits(&bot).is_empty());
    Ok(())
}

#[tokio::test]
async fn test_bot_missing_manage_roles() -> anyhow::Result<()> {
    let bot = TestBot::new().await?;
    bot.api
        .insert_member(GUILD, member(BOT, "InviteManager", None, vec![]));

    let outcome = bot.send(ADMIN, "!mentionRole Announcements").await;
    assert!(
        matches!(
            &outcome,
            DispatchOutcome::Rejected(GuardError::BotMissingPermissions { missing })
                if missing == &vec![Permission::ManageRoles]
        ),
        "{outcome:?}"
    );
    assert!(bot.last_reply().contains("Manage Roles"));
    Ok(())
}

#[tokio::test]
async fn test_invoker_checked_before_bot() -> anyhow::Result<()> {
    let bot = TestBot::new().await?;
    bot.api
        .insert_member(GUILD, member(BOT, "InviteManager", None, vec![]));

    let outcome = bot.send(ALICE, "!mentionRole Announcements").await;
    assert!(matches!(
        outcome,
        DispatchOutcome::Rejected(GuardError::InsufficientPermission { .. })
    ));
    Ok(())
}
