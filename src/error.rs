//! Unified error handling for imbot-ng.
//!
//! This module provides the error hierarchy of the command framework, with
//! automatic conversions, user-facing reply text, and metric labeling.
//!
//! | Error                  | Raised by                    | Handling                                  |
//! |------------------------|------------------------------|-------------------------------------------|
//! | [`ResolutionError`]    | argument pipeline            | reply naming the bad argument             |
//! | [`GuardError`]         | guard chain                  | reply or silent, per policy               |
//! | [`ActionError`]        | command handlers             | logged, generic failure reply             |
//! | [`ConfigurationError`] | registration / registry      | fatal at startup                          |

use crate::api::{ApiError, Permission};
use crate::db::DbError;
use thiserror::Error;

// ============================================================================
// Resolution Errors (argument parsing)
// ============================================================================

/// A token (or token sequence) could not be turned into a typed argument.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("missing argument: {arg}")]
    MissingArgument { arg: String },

    #[error("{arg}: nothing matches `{input}`")]
    NotFound { arg: String, input: String },

    #[error("{arg}: `{input}` matches {} candidates", .candidates.len())]
    Ambiguous {
        arg: String,
        input: String,
        candidates: Vec<String>,
    },

    #[error("{arg}: `{input}` is not a valid {expected}")]
    InvalidFormat {
        arg: String,
        input: String,
        expected: String,
    },

    #[error("unknown flag: {0}")]
    UnknownFlag(String),

    #[error("flag --{flag} requires a value")]
    FlagMissingValue { flag: String },
}

impl ResolutionError {
    /// Get a static error code string for metrics labeling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingArgument { .. } => "missing_argument",
            Self::NotFound { .. } => "not_found",
            Self::Ambiguous { .. } => "ambiguous",
            Self::InvalidFormat { .. } => "invalid_format",
            Self::UnknownFlag(_) => "unknown_flag",
            Self::FlagMissingValue { .. } => "flag_missing_value",
        }
    }

    /// User-facing reply text.
    pub fn to_reply(&self) -> String {
        match self {
            Self::MissingArgument { arg } => format!("Missing argument **{}**.", arg),
            Self::NotFound { arg, input } => {
                format!("Could not find anything for **{}** matching `{}`.", arg, input)
            }
            Self::Ambiguous {
                arg,
                input,
                candidates,
            } => format!(
                "`{}` is ambiguous for **{}**, did you mean one of: {}?",
                input,
                arg,
                candidates.join(", ")
            ),
            Self::InvalidFormat {
                arg,
                input,
                expected,
            } => format!("`{}` is not a valid {} for **{}**.", input, expected, arg),
            Self::UnknownFlag(flag) => format!("Unknown flag `{}`.", flag),
            Self::FlagMissingValue { flag } => format!("Flag `--{}` needs a value.", flag),
        }
    }
}

// ============================================================================
// Guard Errors (pre-execution checks)
// ============================================================================

fn join_permissions(perms: &[Permission]) -> String {
    perms
        .iter()
        .map(|p| p.display_name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A pre-execution check rejected the invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardError {
    #[error("command is guild only")]
    GuildOnly,

    #[error("missing permissions: {}", join_permissions(.missing))]
    InsufficientPermission { missing: Vec<Permission> },

    #[error("bot is missing permissions: {}", join_permissions(.missing))]
    BotMissingPermissions { missing: Vec<Permission> },

    #[error("module {module} is disabled")]
    ModuleDisabled { module: String },
}

impl GuardError {
    /// Get a static error code string for metrics labeling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::GuildOnly => "guild_only",
            Self::InsufficientPermission { .. } => "insufficient_permission",
            Self::BotMissingPermissions { .. } => "bot_missing_permissions",
            Self::ModuleDisabled { .. } => "module_disabled",
        }
    }

    /// User-facing reply text.
    ///
    /// Returns `None` for rejections that are configured to stay silent.
    pub fn to_reply(&self, disabled_module_notice: bool) -> Option<String> {
        match self {
            Self::GuildOnly => Some("This command can only be used in a server.".to_string()),
            Self::InsufficientPermission { missing } => Some(format!(
                "You need the following permissions to use this command: {}",
                join_permissions(missing)
            )),
            Self::BotMissingPermissions { missing } => Some(format!(
                "I need the following permissions to run this command: {}",
                join_permissions(missing)
            )),
            Self::ModuleDisabled { module } => disabled_module_notice
                .then(|| format!("The **{}** module is disabled on this server.", module)),
        }
    }
}

// ============================================================================
// Action Errors (business logic failures)
// ============================================================================

/// Failure inside a command action or a cache load.
///
/// Never shown verbatim to users; the dispatcher logs it and replies with a
/// generic notice.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    #[error("database error: {0}")]
    Db(#[from] DbError),

    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ActionError {
    /// Get a static error code string for metrics labeling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Api(e) => e.error_code(),
            Self::Db(_) => "db_error",
            Self::Configuration(_) => "configuration_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

/// Result type for command actions.
pub type ActionResult = Result<(), ActionError>;

// ============================================================================
// Configuration Errors (startup)
// ============================================================================

/// Invalid wiring of commands or registry entries. Detected at startup; the
/// process must not serve commands while one is outstanding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("command name must not be empty")]
    EmptyCommandName,

    #[error("`{name}` of command {command} collides with command {existing}")]
    DuplicateCommand {
        name: String,
        command: String,
        existing: String,
    },

    #[error("command {command}: rest argument {arg} must be the last argument")]
    RestNotLast { command: String, arg: String },

    #[error("command {command}: required argument {arg} follows an optional one")]
    RequiredAfterOptional { command: String, arg: String },

    #[error("command {command}: duplicate flag {flag}")]
    DuplicateFlag { command: String, flag: String },

    #[error("registry entry {0} registered twice")]
    DuplicateEntry(String),

    #[error("registry entry {entry} depends on unknown entry {dependency}")]
    UnknownDependency { entry: String, dependency: String },

    #[error("registry entry {entry} requested undeclared dependency {dependency}")]
    UndeclaredDependency { entry: String, dependency: String },

    #[error("cyclic registry dependency: {}", .cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },

    #[error("unknown registry entry {0}")]
    UnknownEntry(String),

    #[error("registry entry {entry} is not a {expected}")]
    EntryTypeMismatch { entry: String, expected: &'static str },

    #[error("registry entry {entry} failed to construct: {reason}")]
    Factory { entry: String, reason: String },
}

impl ConfigurationError {
    /// Get a static error code string for metrics labeling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyCommandName => "empty_command_name",
            Self::DuplicateCommand { .. } => "duplicate_command",
            Self::RestNotLast { .. } => "rest_not_last",
            Self::RequiredAfterOptional { .. } => "required_after_optional",
            Self::DuplicateFlag { .. } => "duplicate_flag",
            Self::DuplicateEntry(_) => "duplicate_entry",
            Self::UnknownDependency { .. } => "unknown_dependency",
            Self::UndeclaredDependency { .. } => "undeclared_dependency",
            Self::CyclicDependency { .. } => "cyclic_dependency",
            Self::UnknownEntry(_) => "unknown_entry",
            Self::EntryTypeMismatch { .. } => "entry_type_mismatch",
            Self::Factory { .. } => "factory_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ResolutionError::MissingArgument { arg: "member".into() }.error_code(),
            "missing_argument"
        );
        assert_eq!(GuardError::GuildOnly.error_code(), "guild_only");
        assert_eq!(
            ActionError::Internal("x".into()).error_code(),
            "internal_error"
        );
        assert_eq!(
            ActionError::from(ApiError::Forbidden("x".into())).error_code(),
            "api_forbidden"
        );
    }

    #[test]
    fn test_resolution_reply_names_argument() {
        let reply = ResolutionError::MissingArgument {
            arg: "member".into(),
        }
        .to_reply();
        assert!(reply.contains("member"));

        let reply = ResolutionError::Ambiguous {
            arg: "role".into(),
            input: "mod".into(),
            candidates: vec!["Moderator".into(), "Modmail".into()],
        }
        .to_reply();
        assert!(reply.contains("Moderator, Modmail"));
    }

    #[test]
    fn test_guard_reply_policy() {
        let err = GuardError::InsufficientPermission {
            missing: vec![Permission::ManageRoles, Permission::KickMembers],
        };
        assert_eq!(
            err.to_string(),
            "missing permissions: Manage Roles, Kick Members"
        );
        assert!(err.to_reply(false).is_some());

        let disabled = GuardError::ModuleDisabled {
            module: "invites".into(),
        };
        assert!(disabled.to_reply(false).is_none());
        assert!(disabled.to_reply(true).unwrap().contains("invites"));
    }

    #[test]
    fn test_cycle_display() {
        let err = ConfigurationError::CyclicDependency {
            cycle: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "cyclic registry dependency: a -> b -> a");
    }
}
