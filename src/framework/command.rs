//! Command descriptors.
//!
//! A command is data plus behaviour: an immutable [`CommandDescriptor`]
//! describing names, arguments, flags and guards, and a separately
//! registered [`CommandHandler`] holding the action together with whatever
//! registry handles it was constructed with.

use super::context::{CommandContext, ResolvedInvocation};
use crate::api::{Channel, Member, Permission, Role};
use crate::error::{ActionResult, ConfigurationError};
use async_trait::async_trait;
use std::fmt::Write as _;
use std::sync::Arc;

/// How a raw token becomes a typed value. Chosen at registration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolver {
    /// Text as given.
    String,
    /// Signed integer, optionally bounded (inclusive).
    Number { min: Option<i64>, max: Option<i64> },
    /// `true/false/yes/no/on/off/1/0`.
    Boolean,
    Member,
    Role,
    Channel,
    /// A registered command, by name or alias.
    Command,
    /// One of a fixed set of words (case-insensitive).
    Enum(&'static [&'static str]),
}

impl Resolver {
    /// An unbounded number.
    pub const NUMBER: Resolver = Resolver::Number {
        min: None,
        max: None,
    };

    /// Noun used in "not a valid ..." replies.
    pub fn expected(&self) -> &'static str {
        match self {
            Self::String => "text",
            Self::Number { .. } => "number",
            Self::Boolean => "yes/no value",
            Self::Member => "member",
            Self::Role => "role",
            Self::Channel => "channel",
            Self::Command => "command",
            Self::Enum(_) => "choice",
        }
    }
}

/// A resolved argument or flag value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Text(String),
    Number(i64),
    Bool(bool),
    Member(Member),
    Role(Role),
    Channel(Channel),
    /// Canonical name of a registered command.
    Command(String),
    /// The matching entry of an `Enum` resolver, in its declared spelling.
    Choice(&'static str),
}

/// One positional argument.
#[derive(Debug, Clone)]
pub struct ArgSpec {
    pub name: &'static str,
    pub resolver: Resolver,
    pub required: bool,
    /// Consumes the rest of the line verbatim. Must be last.
    pub rest: bool,
    /// Used when an optional argument has no token.
    pub default: Option<ArgValue>,
}

impl ArgSpec {
    pub fn required(name: &'static str, resolver: Resolver) -> Self {
        Self {
            name,
            resolver,
            required: true,
            rest: false,
            default: None,
        }
    }

    pub fn optional(name: &'static str, resolver: Resolver) -> Self {
        Self {
            required: false,
            ..Self::required(name, resolver)
        }
    }

    pub fn rest(mut self) -> Self {
        self.rest = true;
        self
    }

    pub fn with_default(mut self, value: ArgValue) -> Self {
        self.default = Some(value);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagKind {
    /// Present or absent.
    Switch,
    /// Takes a value, inline (`--page=2`) or as the next token.
    Value(Resolver),
}

/// One named flag.
#[derive(Debug, Clone)]
pub struct FlagSpec {
    pub name: &'static str,
    pub short: Option<char>,
    pub kind: FlagKind,
}

impl FlagSpec {
    pub fn switch(name: &'static str) -> Self {
        Self {
            name,
            short: None,
            kind: FlagKind::Switch,
        }
    }

    pub fn value(name: &'static str, resolver: Resolver) -> Self {
        Self {
            name,
            short: None,
            kind: FlagKind::Value(resolver),
        }
    }

    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }
}

/// Who may invoke a command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PermissionRequirement {
    #[default]
    None,
    /// Guild administrators (and the owner) only.
    AdminOnly,
    /// Every listed permission is required.
    Permissions(Vec<Permission>),
}

impl PermissionRequirement {
    /// Permissions the invoker must hold.
    pub fn required(&self) -> Vec<Permission> {
        match self {
            Self::None => Vec::new(),
            Self::AdminOnly => vec![Permission::Administrator],
            Self::Permissions(perms) => perms.clone(),
        }
    }
}

/// Immutable metadata of one command.
#[derive(Debug, Clone)]
pub struct CommandDescriptor {
    pub name: &'static str,
    pub aliases: Vec<&'static str>,
    pub args: Vec<ArgSpec>,
    pub flags: Vec<FlagSpec>,
    /// Heading the command is listed under in `help`.
    pub group: &'static str,
    pub description: &'static str,
    pub extra_examples: Vec<&'static str>,
    pub permission: PermissionRequirement,
    /// Permissions the bot itself needs to carry the command out.
    pub bot_permissions: Vec<Permission>,
    pub guild_only: bool,
    /// Owning module; filled in when the module registers the command.
    pub module: String,
}

impl CommandDescriptor {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            aliases: Vec::new(),
            args: Vec::new(),
            flags: Vec::new(),
            group: "Other",
            description: "",
            extra_examples: Vec::new(),
            permission: PermissionRequirement::None,
            bot_permissions: Vec::new(),
            guild_only: false,
            module: String::new(),
        }
    }

    pub fn aliases(mut self, aliases: &[&'static str]) -> Self {
        self.aliases.extend_from_slice(aliases);
        self
    }

    pub fn arg(mut self, spec: ArgSpec) -> Self {
        self.args.push(spec);
        self
    }

    pub fn flag(mut self, spec: FlagSpec) -> Self {
        self.flags.push(spec);
        self
    }

    pub fn group(mut self, group: &'static str) -> Self {
        self.group = group;
        self
    }

    pub fn description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub fn example(mut self, example: &'static str) -> Self {
        self.extra_examples.push(example);
        self
    }

    pub fn admin_only(mut self) -> Self {
        self.permission = PermissionRequirement::AdminOnly;
        self
    }

    pub fn permissions(mut self, perms: &[Permission]) -> Self {
        self.permission = PermissionRequirement::Permissions(perms.to_vec());
        self
    }

    pub fn bot_permissions(mut self, perms: &[Permission]) -> Self {
        self.bot_permissions = perms.to_vec();
        self
    }

    pub fn guild_only(mut self) -> Self {
        self.guild_only = true;
        self
    }

    /// Name followed by aliases.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once(self.name).chain(self.aliases.iter().copied())
    }

    pub fn flag_spec(&self, name: &str) -> Option<&FlagSpec> {
        self.flags.iter().find(|f| f.name == name)
    }

    pub fn short_flag_spec(&self, short: char) -> Option<&FlagSpec> {
        self.flags.iter().find(|f| f.short == Some(short))
    }

    /// Whether resolving this command's arguments needs the guild member list.
    pub fn needs_members(&self) -> bool {
        self.args
            .iter()
            .map(|a| &a.resolver)
            .chain(self.flags.iter().filter_map(|f| match &f.kind {
                FlagKind::Value(r) => Some(r),
                FlagKind::Switch => None,
            }))
            .any(|r| *r == Resolver::Member)
    }

    /// Check the descriptor's own shape. Name collisions across commands
    /// are checked by the dispatcher builder.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.name.trim().is_empty() || self.aliases.iter().any(|a| a.trim().is_empty()) {
            return Err(ConfigurationError::EmptyCommandName);
        }

        let mut seen_optional = false;
        for (i, arg) in self.args.iter().enumerate() {
            if arg.rest && i + 1 != self.args.len() {
                return Err(ConfigurationError::RestNotLast {
                    command: self.name.to_string(),
                    arg: arg.name.to_string(),
                });
            }
            if arg.required && seen_optional {
                return Err(ConfigurationError::RequiredAfterOptional {
                    command: self.name.to_string(),
                    arg: arg.name.to_string(),
                });
            }
            seen_optional |= !arg.required;
        }

        for (i, flag) in self.flags.iter().enumerate() {
            let clash = self.flags[..i]
                .iter()
                .any(|f| f.name == flag.name || (flag.short.is_some() && f.short == flag.short));
            if clash {
                return Err(ConfigurationError::DuplicateFlag {
                    command: self.name.to_string(),
                    flag: flag.name.to_string(),
                });
            }
        }

        Ok(())
    }

    /// `{prefix}name <required> [optional] [rest...]`
    pub fn usage(&self, prefix: &str) -> String {
        let mut usage = format!("{}{}", prefix, self.name);
        for arg in &self.args {
            let dots = if arg.rest { "..." } else { "" };
            if arg.required {
                let _ = write!(usage, " <{}{}>", arg.name, dots);
            } else {
                let _ = write!(usage, " [{}{}]", arg.name, dots);
            }
        }
        for flag in &self.flags {
            let value = match &flag.kind {
                FlagKind::Switch => String::new(),
                FlagKind::Value(r) => format!(" <{}>", r.expected()),
            };
            let _ = write!(usage, " [--{}{}]", flag.name, value);
        }
        usage
    }
}

/// The action of a command.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn run(&self, ctx: &CommandContext, inv: &ResolvedInvocation) -> ActionResult;
}

/// A descriptor bound to its handler.
#[derive(Clone)]
pub struct Command {
    pub descriptor: Arc<CommandDescriptor>,
    pub handler: Arc<dyn CommandHandler>,
}

impl Command {
    pub fn new(descriptor: CommandDescriptor, handler: impl CommandHandler + 'static) -> Self {
        Self {
            descriptor: Arc::new(descriptor),
            handler: Arc::new(handler),
        }
    }
}
