//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use std::path::Path;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("bot.default_prefix must not be empty")]
    EmptyPrefix,
    #[error("bot.default_prefix must not contain whitespace, got '{0}'")]
    PrefixWhitespace(String),
    #[error("bot.user_id must be non-zero")]
    MissingBotId,
    #[error("pagination.timeout_secs must be greater than zero")]
    ZeroPaginationTimeout,
    #[error("database.path parent directory does not exist: {0}")]
    DatabasePathInvalid(String),
    #[error("console member {member} references unknown role {role}")]
    UnknownConsoleRole { member: u64, role: u64 },
    #[error("console.author_id {0} is not a console member")]
    UnknownConsoleAuthor(u64),
    #[error("console.channel_id {0} is not a console channel")]
    UnknownConsoleChannel(u64),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let prefix = &config.bot.default_prefix;
    if prefix.is_empty() {
        errors.push(ValidationError::EmptyPrefix);
    } else if prefix.chars().any(char::is_whitespace) {
        errors.push(ValidationError::PrefixWhitespace(prefix.clone()));
    }

    if config.bot.user_id == 0 {
        errors.push(ValidationError::MissingBotId);
    }

    if config.pagination.timeout_secs == 0 {
        errors.push(ValidationError::ZeroPaginationTimeout);
    }

    let db_path = Path::new(&config.database.path);
    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        errors.push(ValidationError::DatabasePathInvalid(
            config.database.path.clone(),
        ));
    }

    if let Some(console) = &config.console {
        for member in &console.members {
            for role in &member.roles {
                if !console.roles.iter().any(|r| r.id == *role) {
                    errors.push(ValidationError::UnknownConsoleRole {
                        member: member.id,
                        role: *role,
                    });
                }
            }
        }
        // The owner needs no fixture entry; anyone else must be a member.
        if console.author_id != console.guild.owner_id
            && !console.members.iter().any(|m| m.id == console.author_id)
        {
            errors.push(ValidationError::UnknownConsoleAuthor(console.author_id));
        }
        if !console.channels.is_empty()
            && !console.channels.iter().any(|c| c.id == console.channel_id)
        {
            errors.push(ValidationError::UnknownConsoleChannel(console.channel_id));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
