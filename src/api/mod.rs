//! The chat platform collaborator.
//!
//! The framework never talks to the platform directly; it goes through the
//! [`ChatApi`] capability set. [`MemoryApi`] is the in-process implementation
//! used by the console transport and the test suite.

pub mod memory;
pub mod model;

pub use memory::{MemoryApi, Outbound};
pub use model::{
    Channel, ChannelId, Content, Embed, EmbedField, GatewayEvent, Guild, GuildId, GuildInvite,
    IncomingMessage, Member, MessageId, Permission, ReactionEvent, Role, RoleId, User, UserId,
};

use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by the platform collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("unknown {kind} {id}")]
    NotFound { kind: &'static str, id: u64 },

    #[error("missing access: {0}")]
    Forbidden(String),

    #[error("platform unavailable: {0}")]
    Unavailable(String),
}

impl ApiError {
    /// Static label for metrics.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "api_not_found",
            Self::Forbidden(_) => "api_forbidden",
            Self::Unavailable(_) => "api_unavailable",
        }
    }
}

/// Capability set the framework consumes from the platform.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// The bot's own user id.
    fn current_user_id(&self) -> UserId;

    async fn send(&self, channel_id: ChannelId, content: Content) -> Result<MessageId, ApiError>;

    async fn edit(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        content: Content,
    ) -> Result<(), ApiError>;

    async fn delete(&self, channel_id: ChannelId, message_id: MessageId) -> Result<(), ApiError>;

    /// Send a direct message to a user.
    async fn send_dm(&self, user_id: UserId, content: Content) -> Result<MessageId, ApiError>;

    async fn guild(&self, guild_id: GuildId) -> Result<Option<Guild>, ApiError>;

    async fn lookup_member(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> Result<Option<Member>, ApiError>;

    async fn members(&self, guild_id: GuildId) -> Result<Vec<Member>, ApiError>;

    async fn lookup_role(&self, guild_id: GuildId, role_id: RoleId)
    -> Result<Option<Role>, ApiError>;

    /// Toggle a role's mentionable flag, returning the updated role.
    async fn edit_role(
        &self,
        guild_id: GuildId,
        role_id: RoleId,
        mentionable: bool,
    ) -> Result<Role, ApiError>;

    async fn add_reaction(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        emoji: &str,
    ) -> Result<(), ApiError>;

    async fn clear_reactions(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<(), ApiError>;

    async fn invites(&self, guild_id: GuildId) -> Result<Vec<GuildInvite>, ApiError>;
}
