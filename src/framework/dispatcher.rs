//! Command dispatch.
//!
//! The `Dispatcher` owns every registered command and turns a chat message
//! into at most one command invocation:
//!
//! 1. parse the header (guild prefix or a mention of the bot)
//! 2. look the command up by name or alias, case-insensitively
//! 3. run the guard chain: guild-only, invoker permissions, bot
//!    permissions, module enabled
//! 4. resolve flags and positional arguments
//! 5. run the action inside a span, timed, with failures contained
//!
//! The dispatcher is immutable once built and shared behind an `Arc`;
//! concurrent dispatches do not contend on anything but cache slots.

use super::args::parse_arguments;
use super::command::{Command, CommandDescriptor};
use super::context::{CommandContext, ResolvedInvocation};
use super::pagination::PaginationController;
use super::registry::ScopedCache;
use super::resolver::ResolveScope;
use crate::api::{ChatApi, Guild, IncomingMessage, Member, Permission};
use crate::config::{BotConfig, DispatchConfig};
use crate::db::GuildSettings;
use crate::error::{ActionError, ConfigurationError, GuardError, ResolutionError};
use crate::telemetry::{CommandTimer, spans};
use futures_util::FutureExt;
use imbot_proto::{Trigger, fold, parse_header};
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{Instrument, debug, error, warn};

/// Reply sent when an action fails. Details go to the log only.
pub const GENERIC_FAILURE: &str = "Something went wrong while running this command. Please try again later.";

/// Every registered command, indexed by folded name and alias.
#[derive(Default)]
pub struct CommandTable {
    commands: Vec<Command>,
    index: HashMap<String, usize>,
}

impl CommandTable {
    /// Look a command up by name or alias, ignoring case.
    pub fn find(&self, name: &str) -> Option<&Command> {
        self.index.get(&fold(name)).map(|&i| &self.commands[i])
    }

    /// Commands in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Collects commands during module loading.
#[derive(Default)]
pub struct DispatcherBuilder {
    table: CommandTable,
    errors: Vec<ConfigurationError>,
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a command. Shape errors and name/alias collisions are recorded
    /// and reported by [`DispatcherBuilder::finish`].
    pub fn register(&mut self, command: Command) {
        if let Err(e) = self.try_register(command) {
            self.errors.push(e);
        }
    }

    fn try_register(&mut self, command: Command) -> Result<(), ConfigurationError> {
        let descriptor = &command.descriptor;
        descriptor.validate()?;

        let mut keys: Vec<(String, &'static str)> = Vec::new();
        for name in descriptor.names() {
            let key = fold(name);
            let clash = self
                .table
                .index
                .get(&key)
                .map(|&i| self.table.commands[i].descriptor.name)
                .or_else(|| keys.iter().any(|(k, _)| *k == key).then_some(descriptor.name));
            if let Some(existing) = clash {
                return Err(ConfigurationError::DuplicateCommand {
                    name: name.to_string(),
                    command: descriptor.name.to_string(),
                    existing: existing.to_string(),
                });
            }
            keys.push((key, name));
        }

        let position = self.table.commands.len();
        for (key, _) in keys {
            self.table.index.insert(key, position);
        }
        debug!(command = descriptor.name, module = %descriptor.module, "Command registered");
        self.table.commands.push(command);
        Ok(())
    }

    /// The finished table, or the first registration error.
    pub fn finish(mut self) -> Result<CommandTable, ConfigurationError> {
        if self.errors.is_empty() {
            Ok(self.table)
        } else {
            Err(self.errors.remove(0))
        }
    }
}

/// What became of one message.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// Not addressed to the bot, or from a bot.
    Ignored,
    /// The bot was mentioned with no known command.
    UnknownCommand,
    /// A guard stopped the command.
    Rejected(GuardError),
    /// Arguments did not resolve.
    Invalid(ResolutionError),
    Completed,
    Failed(ActionError),
}

/// Dispatches chat messages to commands.
pub struct Dispatcher {
    commands: Arc<CommandTable>,
    settings: Arc<ScopedCache<GuildSettings>>,
    api: Arc<dyn ChatApi>,
    pagination: Arc<PaginationController>,
    bot: Arc<BotConfig>,
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new(
        commands: CommandTable,
        settings: Arc<ScopedCache<GuildSettings>>,
        api: Arc<dyn ChatApi>,
        pagination: Arc<PaginationController>,
        bot: Arc<BotConfig>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            commands: Arc::new(commands),
            settings,
            api,
            pagination,
            bot,
            config,
        }
    }

    pub fn commands(&self) -> &Arc<CommandTable> {
        &self.commands
    }

    async fn settings_for(&self, message: &IncomingMessage) -> Arc<GuildSettings> {
        let Some(guild_id) = message.guild_id else {
            return Arc::new(GuildSettings::with_defaults(0, &self.bot.default_prefix));
        };
        match self.settings.get(guild_id).await {
            Ok(settings) => settings,
            Err(e) => {
                warn!(guild = guild_id, error = %e, "Failed to load guild settings, using defaults");
                Arc::new(GuildSettings::with_defaults(
                    guild_id,
                    &self.bot.default_prefix,
                ))
            }
        }
    }

    async fn notify(&self, message: &IncomingMessage, text: String) {
        if let Err(e) = self.api.send(message.channel_id, text.into()).await {
            warn!(channel = message.channel_id, error = %e, "Failed to send dispatch notice");
        }
    }

    /// Handle one incoming chat message.
    pub async fn dispatch(&self, message: IncomingMessage) -> DispatchOutcome {
        if message.author.bot {
            return DispatchOutcome::Ignored;
        }

        let settings = self.settings_for(&message).await;
        let Some(header) = parse_header(&message.content, &settings.prefix, self.bot.user_id) else {
            return DispatchOutcome::Ignored;
        };

        let Some(command) = self.commands.find(header.command).cloned() else {
            if header.trigger == Trigger::Mention && self.config.unknown_command_notice {
                let prefix = &settings.prefix;
                self.notify(
                    &message,
                    format!(
                        "My prefix on this server is `{prefix}`. Type `{prefix}help` for a list of commands."
                    ),
                )
                .await;
                return DispatchOutcome::UnknownCommand;
            }
            return DispatchOutcome::Ignored;
        };
        let descriptor = command.descriptor.clone();
        let rest = header.rest.to_string();

        let (guild, member, me) = match self.load_guild(&message).await {
            Ok(parts) => parts,
            Err(e) => {
                error!(command = descriptor.name, error = %e, "Failed to load guild state");
                crate::metrics::record_command_error(descriptor.name, e.error_code());
                self.notify(&message, GENERIC_FAILURE.to_string()).await;
                return DispatchOutcome::Failed(e);
            }
        };

        if let Err(guard) = check_guards(&descriptor, guild.as_ref(), member.as_ref(), me.as_ref(), &settings) {
            debug!(command = descriptor.name, reason = %guard, "Command rejected");
            crate::metrics::record_command_error(descriptor.name, guard.error_code());
            if let Some(reply) = guard.to_reply(self.config.disabled_module_notice) {
                self.notify(&message, reply).await;
            }
            return DispatchOutcome::Rejected(guard);
        }

        let members = match (&guild, descriptor.needs_members()) {
            (Some(g), true) => match self.api.members(g.id).await {
                Ok(members) => members,
                Err(e) => {
                    let e = ActionError::from(e);
                    crate::metrics::record_command_error(descriptor.name, e.error_code());
                    self.notify(&message, GENERIC_FAILURE.to_string()).await;
                    return DispatchOutcome::Failed(e);
                }
            },
            _ => Vec::new(),
        };

        let scope = ResolveScope {
            guild: guild.as_ref(),
            members: &members,
            commands: &self.commands,
        };
        let parsed = match parse_arguments(&descriptor, &rest, &scope, self.config.strict_flags) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(command = descriptor.name, error = %e, "Argument resolution failed");
                crate::metrics::record_command_error(descriptor.name, e.error_code());
                self.notify(&message, e.to_reply()).await;
                return DispatchOutcome::Invalid(e);
            }
        };

        let span = spans::command(descriptor.name, message.guild_id, message.author.id);
        let ctx = CommandContext {
            message,
            guild,
            member,
            me,
            settings,
            api: self.api.clone(),
            pagination: self.pagination.clone(),
            commands: self.commands.clone(),
            bot: self.bot.clone(),
        };
        let invocation = ResolvedInvocation {
            descriptor: descriptor.clone(),
            args: parsed.args,
            flags: parsed.flags,
        };

        let result = {
            let _timer = CommandTimer::new(descriptor.name);
            AssertUnwindSafe(command.handler.run(&ctx, &invocation))
                .catch_unwind()
                .instrument(span)
                .await
        };

        let failure = match result {
            Ok(Ok(())) => return DispatchOutcome::Completed,
            Ok(Err(e)) => e,
            Err(_) => ActionError::Internal("command panicked".into()),
        };
        error!(command = descriptor.name, error = %failure, "Command failed");
        crate::metrics::record_command_error(descriptor.name, failure.error_code());
        self.notify(&ctx.message, GENERIC_FAILURE.to_string()).await;
        DispatchOutcome::Failed(failure)
    }

    /// Guild snapshot, invoking member and bot member.
    async fn load_guild(
        &self,
        message: &IncomingMessage,
    ) -> Result<(Option<Guild>, Option<Member>, Option<Member>), ActionError> {
        let Some(guild_id) = message.guild_id else {
            return Ok((None, None, None));
        };
        let guild = self
            .api
            .guild(guild_id)
            .await?
            .ok_or(crate::api::ApiError::NotFound {
                kind: "guild",
                id: guild_id,
            })?;

        let member = self
            .api
            .lookup_member(guild_id, message.author.id)
            .await?
            .unwrap_or_else(|| Member {
                user: message.author.clone(),
                nick: None,
                roles: Vec::new(),
            });
        let me = match self.api.lookup_member(guild_id, self.bot.user_id).await? {
            Some(me) => me,
            None => Member {
                user: crate::api::User {
                    id: self.bot.user_id,
                    name: self.bot.name.clone(),
                    bot: true,
                },
                nick: None,
                roles: Vec::new(),
            },
        };
        Ok((Some(guild), Some(member), Some(me)))
    }
}

fn missing_permissions(guild: &Guild, member: &Member, required: &[Permission]) -> Vec<Permission> {
    required
        .iter()
        .copied()
        .filter(|p| !guild.has_permission(member, *p))
        .collect()
}

/// The guard chain, in order. The first failing guard wins.
fn check_guards(
    descriptor: &CommandDescriptor,
    guild: Option<&Guild>,
    member: Option<&Member>,
    me: Option<&Member>,
    settings: &GuildSettings,
) -> Result<(), GuardError> {
    let in_guild = guild.zip(member).zip(me);

    if descriptor.guild_only && in_guild.is_none() {
        return Err(GuardError::GuildOnly);
    }

    let required = descriptor.permission.required();
    if !required.is_empty() {
        let missing = match in_guild {
            Some(((guild, member), _)) => missing_permissions(guild, member, &required),
            None => required,
        };
        if !missing.is_empty() {
            return Err(GuardError::InsufficientPermission { missing });
        }
    }

    if let Some(((guild, _), me)) = in_guild {
        let missing = missing_permissions(guild, me, &descriptor.bot_permissions);
        if !missing.is_empty() {
            return Err(GuardError::BotMissingPermissions { missing });
        }

        if settings.is_module_disabled(&descriptor.module) {
            return Err(GuardError::ModuleDisabled {
                module: descriptor.module.clone(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Role, User};
    use crate::error::ActionResult;
    use crate::framework::command::CommandHandler;
    use async_trait::async_trait;

    struct Noop;

    #[async_trait]
    impl CommandHandler for Noop {
        async fn run(&self, _ctx: &CommandContext, _inv: &ResolvedInvocation) -> ActionResult {
            Ok(())
        }
    }

    #[test]
    fn test_alias_collisions_are_rejected() {
        let mut builder = DispatcherBuilder::new();
        builder.register(Command::new(
            CommandDescriptor::new("ranks").aliases(&["show-ranks"]),
            Noop,
        ));
        builder.register(Command::new(
            CommandDescriptor::new("showRanks").aliases(&["SHOW-RANKS"]),
            Noop,
        ));

        match builder.finish() {
            Err(ConfigurationError::DuplicateCommand { name, existing, .. }) => {
                assert_eq!(name, "SHOW-RANKS");
                assert_eq!(existing, "ranks");
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("collision accepted"),
        }
    }

    #[test]
    fn test_self_alias_collision() {
        let mut builder = DispatcherBuilder::new();
        builder.register(Command::new(
            CommandDescriptor::new("help").aliases(&["HELP"]),
            Noop,
        ));
        assert!(matches!(
            builder.finish(),
            Err(ConfigurationError::DuplicateCommand { .. })
        ));
    }

    #[test]
    fn test_lookup_ignores_case() {
        let mut builder = DispatcherBuilder::new();
        builder.register(Command::new(
            CommandDescriptor::new("mentionRole").aliases(&["mr"]),
            Noop,
        ));
        let table = builder.finish().unwrap();
        assert_eq!(table.find("MENTIONROLE").unwrap().descriptor.name, "mentionRole");
        assert_eq!(table.find("Mr").unwrap().descriptor.name, "mentionRole");
        assert!(table.find("mention").is_none());
        assert_eq!(table.len(), 1);
    }

    fn guild_with(perms: Vec<Permission>) -> Guild {
        Guild {
            id: 1,
            name: "g".into(),
            owner_id: 99,
            roles: vec![Role {
                id: 5,
                name: "staff".into(),
                position: 3,
                permissions: perms,
                mentionable: false,
            }],
            channels: vec![],
        }
    }

    fn member(id: u64, roles: Vec<u64>) -> Member {
        Member {
            user: User {
                id,
                name: format!("u{id}"),
                bot: false,
            },
            nick: None,
            roles,
        }
    }

    #[test]
    fn test_guard_order() {
        let mut descriptor = CommandDescriptor::new("mentionRole")
            .guild_only()
            .admin_only()
            .bot_permissions(&[Permission::ManageRoles]);
        descriptor.module = "management".into();
        let settings = GuildSettings::with_defaults(1, "!");

        assert_eq!(
            check_guards(&descriptor, None, None, None, &settings),
            Err(GuardError::GuildOnly)
        );

        let guild = guild_with(vec![Permission::ManageRoles]);
        let user = member(2, vec![]);
        let bot = member(3, vec![]);
        assert_eq!(
            check_guards(&descriptor, Some(&guild), Some(&user), Some(&bot), &settings),
            Err(GuardError::InsufficientPermission {
                missing: vec![Permission::Administrator]
            })
        );

        let owner = member(99, vec![]);
        assert_eq!(
            check_guards(&descriptor, Some(&guild), Some(&owner), Some(&bot), &settings),
            Err(GuardError::BotMissingPermissions {
                missing: vec![Permission::ManageRoles]
            })
        );

        let bot = member(3, vec![5]);
        assert_eq!(
            check_guards(&descriptor, Some(&guild), Some(&owner), Some(&bot), &settings),
            Ok(())
        );

        let mut disabled = settings.clone();
        disabled.disabled_modules = vec!["management".into()];
        assert_eq!(
            check_guards(&descriptor, Some(&guild), Some(&owner), Some(&bot), &disabled),
            Err(GuardError::ModuleDisabled {
                module: "management".into()
            })
        );
    }
}
