//! Default value functions for configuration.

/// Returns `true` (for serde defaults).
pub fn default_true() -> bool {
    true
}

// =============================================================================
// Bot Defaults
// =============================================================================

pub fn default_bot_name() -> String {
    "InviteManager".to_string()
}

pub fn default_prefix() -> String {
    "!".to_string()
}

// =============================================================================
// Pagination Defaults
// =============================================================================

/// Seconds of inactivity before a pagination session expires.
pub fn default_pagination_timeout() -> u64 {
    120
}

// =============================================================================
// Storage Defaults
// =============================================================================

pub fn default_database_path() -> String {
    "imbot.db".to_string()
}
