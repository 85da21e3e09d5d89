//! Telemetry utilities for command timing and dispatch spans.

use std::time::Instant;

/// Guard for timing command execution and recording metrics.
///
/// Records command latency when dropped.
pub struct CommandTimer {
    command: String,
    start: Instant,
}

impl CommandTimer {
    /// Start timing a command.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            start: Instant::now(),
        }
    }
}

impl Drop for CommandTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        crate::metrics::record_command(&self.command, duration);
    }
}

/// Standardized span constructors.
pub mod spans {
    use crate::api::{GuildId, MessageId, UserId};
    use tracing::{Span, debug_span, info_span};

    /// Span for one dispatched command.
    pub fn command(name: &str, guild: Option<GuildId>, author: UserId) -> Span {
        match guild {
            Some(guild) => info_span!("command", name = %name, guild = guild, author = author),
            None => info_span!("command", name = %name, author = author),
        }
    }

    /// Span for one pagination session.
    pub fn pagination(message: MessageId, owner: UserId) -> Span {
        debug_span!("pagination", message_id = message, owner = owner)
    }
}
