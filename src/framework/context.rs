//! Per-invocation state handed to command handlers.

use super::args::FlagValues;
use super::command::{ArgValue, CommandDescriptor};
use super::dispatcher::CommandTable;
use super::pagination::PaginationController;
use crate::api::{
    ApiError, ChannelId, ChatApi, Content, Guild, GuildId, IncomingMessage, Member, MessageId,
    Permission, Role, User,
};
use crate::config::BotConfig;
use crate::db::GuildSettings;
use crate::error::ActionError;
use std::sync::Arc;

/// Everything a command action may look at or talk to.
pub struct CommandContext {
    pub message: IncomingMessage,
    /// Snapshot of the guild, `None` in direct messages.
    pub guild: Option<Guild>,
    /// The invoking member, `None` in direct messages.
    pub member: Option<Member>,
    /// The bot's own member in this guild.
    pub me: Option<Member>,
    pub settings: Arc<GuildSettings>,
    pub api: Arc<dyn ChatApi>,
    pub pagination: Arc<PaginationController>,
    pub commands: Arc<CommandTable>,
    pub bot: Arc<BotConfig>,
}

impl CommandContext {
    pub fn author(&self) -> &User {
        &self.message.author
    }

    pub fn channel_id(&self) -> ChannelId {
        self.message.channel_id
    }

    pub fn guild_id(&self) -> Option<GuildId> {
        self.guild.as_ref().map(|g| g.id)
    }

    /// The prefix in effect for this invocation.
    pub fn prefix(&self) -> &str {
        &self.settings.prefix
    }

    /// Send `content` to the invoking channel.
    pub async fn reply(&self, content: impl Into<Content>) -> Result<MessageId, ApiError> {
        self.api.send(self.channel_id(), content.into()).await
    }

    /// Guild, invoking member and bot member, for guild-only commands.
    pub fn guild_parts(&self) -> Result<(&Guild, &Member, &Member), ActionError> {
        match (&self.guild, &self.member, &self.me) {
            (Some(guild), Some(member), Some(me)) => Ok((guild, member, me)),
            _ => Err(ActionError::Internal(
                "guild command invoked without guild context".into(),
            )),
        }
    }

    /// Whether the invoker holds `perm` (owners and administrators hold all).
    pub fn author_has(&self, perm: Permission) -> bool {
        match (&self.guild, &self.member) {
            (Some(guild), Some(member)) => guild.has_permission(member, perm),
            _ => false,
        }
    }

    /// Permissions from `perms` the bot lacks in this guild.
    pub fn bot_missing(&self, perms: &[Permission]) -> Vec<Permission> {
        match (&self.guild, &self.me) {
            (Some(guild), Some(me)) => perms
                .iter()
                .copied()
                .filter(|p| !guild.has_permission(me, *p))
                .collect(),
            _ => perms.to_vec(),
        }
    }
}

/// A matched command with its arguments resolved.
#[derive(Debug)]
pub struct ResolvedInvocation {
    pub descriptor: Arc<CommandDescriptor>,
    /// Positional values in descriptor order; `None` for absent optionals.
    pub args: Vec<Option<ArgValue>>,
    pub flags: FlagValues,
}

impl ResolvedInvocation {
    pub fn arg(&self, name: &str) -> Option<&ArgValue> {
        let index = self.descriptor.args.iter().position(|a| a.name == name)?;
        self.args.get(index)?.as_ref()
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.arg(name)? {
            ArgValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn number(&self, name: &str) -> Option<i64> {
        match self.arg(name)? {
            ArgValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        match self.arg(name)? {
            ArgValue::Member(member) => Some(member),
            _ => None,
        }
    }

    pub fn role(&self, name: &str) -> Option<&Role> {
        match self.arg(name)? {
            ArgValue::Role(role) => Some(role),
            _ => None,
        }
    }

    /// Canonical name of a resolved command argument.
    pub fn command(&self, name: &str) -> Option<&str> {
        match self.arg(name)? {
            ArgValue::Command(command) => Some(command),
            _ => None,
        }
    }

    /// Whether the flag was given.
    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.contains_key(name)
    }

    pub fn flag_value(&self, name: &str) -> Option<&ArgValue> {
        self.flags.get(name)?.as_ref()
    }

    /// Required positional argument; resolution guarantees presence.
    pub fn require<'a, T>(
        &'a self,
        name: &str,
        get: impl Fn(&'a Self, &str) -> Option<T>,
    ) -> Result<T, ActionError> {
        get(self, name).ok_or_else(|| ActionError::Internal(format!("argument {name} not resolved")))
    }
}
