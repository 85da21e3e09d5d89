//! In-process [`ChatApi`] implementation.
//!
//! Holds guild fixtures and records every outbound action in order. The
//! console transport installs an observer to print actions as they happen;
//! tests inspect the recorded log instead.

use super::model::*;
use super::{ApiError, ChatApi};
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// An action the bot performed against the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Send {
        channel_id: ChannelId,
        message_id: MessageId,
        content: Content,
    },
    Edit {
        channel_id: ChannelId,
        message_id: MessageId,
        content: Content,
    },
    Delete {
        channel_id: ChannelId,
        message_id: MessageId,
    },
    Dm {
        user_id: UserId,
        message_id: MessageId,
        content: Content,
    },
    Reaction {
        message_id: MessageId,
        emoji: String,
    },
    ClearReactions {
        message_id: MessageId,
    },
    RoleEdit {
        guild_id: GuildId,
        role_id: RoleId,
        mentionable: bool,
    },
}

type Observer = Arc<dyn Fn(&Outbound) + Send + Sync>;

/// Guild state plus an outbound log.
pub struct MemoryApi {
    bot_id: UserId,
    guilds: DashMap<GuildId, Guild>,
    members: DashMap<GuildId, Vec<Member>>,
    invites: DashMap<GuildId, Vec<GuildInvite>>,
    log: Mutex<Vec<Outbound>>,
    observer: RwLock<Option<Observer>>,
    next_id: AtomicU64,
}

impl MemoryApi {
    /// Message ids handed out by this API start here, well clear of fixture ids.
    const FIRST_MESSAGE_ID: u64 = 1_000_000;

    pub fn new(bot_id: UserId) -> Self {
        Self {
            bot_id,
            guilds: DashMap::new(),
            members: DashMap::new(),
            invites: DashMap::new(),
            log: Mutex::new(Vec::new()),
            observer: RwLock::new(None),
            next_id: AtomicU64::new(Self::FIRST_MESSAGE_ID),
        }
    }

    pub fn insert_guild(&self, guild: Guild) {
        self.members.entry(guild.id).or_default();
        self.guilds.insert(guild.id, guild);
    }

    /// Add or replace a member.
    pub fn insert_member(&self, guild_id: GuildId, member: Member) {
        let mut members = self.members.entry(guild_id).or_default();
        members.retain(|m| m.id() != member.id());
        members.push(member);
    }

    pub fn insert_invite(&self, invite: GuildInvite) {
        self.invites.entry(invite.guild_id).or_default().push(invite);
    }

    /// Install a callback invoked for every outbound action.
    pub fn set_observer(&self, observer: impl Fn(&Outbound) + Send + Sync + 'static) {
        *self.observer.write() = Some(Arc::new(observer));
    }

    /// Allocate an id for an inbound message (used by transports).
    pub fn next_message_id(&self) -> MessageId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Snapshot of everything sent so far.
    pub fn outbound(&self) -> Vec<Outbound> {
        self.log.lock().clone()
    }

    /// Text of every `Send` into `channel_id`, in order.
    pub fn sent_to(&self, channel_id: ChannelId) -> Vec<String> {
        self.log
            .lock()
            .iter()
            .filter_map(|o| match o {
                Outbound::Send {
                    channel_id: c,
                    content,
                    ..
                } if *c == channel_id => Some(content.plain()),
                _ => None,
            })
            .collect()
    }

    /// Latest content of `message_id`, taking edits into account.
    pub fn current_content(&self, message_id: MessageId) -> Option<Content> {
        self.log.lock().iter().rev().find_map(|o| match o {
            Outbound::Send {
                message_id: m,
                content,
                ..
            }
            | Outbound::Edit {
                message_id: m,
                content,
                ..
            } if *m == message_id => Some(content.clone()),
            _ => None,
        })
    }

    pub fn clear_log(&self) {
        self.log.lock().clear();
    }

    fn record(&self, action: Outbound) {
        let observer = self.observer.read().clone();
        if let Some(observer) = observer {
            observer(&action);
        }
        self.log.lock().push(action);
    }
}

#[async_trait]
impl ChatApi for MemoryApi {
    fn current_user_id(&self) -> UserId {
        self.bot_id
    }

    async fn send(&self, channel_id: ChannelId, content: Content) -> Result<MessageId, ApiError> {
        let message_id = self.next_message_id();
        self.record(Outbound::Send {
            channel_id,
            message_id,
            content,
        });
        Ok(message_id)
    }

    async fn edit(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        content: Content,
    ) -> Result<(), ApiError> {
        self.record(Outbound::Edit {
            channel_id,
            message_id,
            content,
        });
        Ok(())
    }

    async fn delete(&self, channel_id: ChannelId, message_id: MessageId) -> Result<(), ApiError> {
        self.record(Outbound::Delete {
            channel_id,
            message_id,
        });
        Ok(())
    }

    async fn send_dm(&self, user_id: UserId, content: Content) -> Result<MessageId, ApiError> {
        let message_id = self.next_message_id();
        self.record(Outbound::Dm {
            user_id,
            message_id,
            content,
        });
        Ok(message_id)
    }

    async fn guild(&self, guild_id: GuildId) -> Result<Option<Guild>, ApiError> {
        Ok(self.guilds.get(&guild_id).map(|g| g.value().clone()))
    }

    async fn lookup_member(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> Result<Option<Member>, ApiError> {
        Ok(self
            .members
            .get(&guild_id)
            .and_then(|ms| ms.iter().find(|m| m.id() == user_id).cloned()))
    }

    async fn members(&self, guild_id: GuildId) -> Result<Vec<Member>, ApiError> {
        Ok(self
            .members
            .get(&guild_id)
            .map(|ms| ms.value().clone())
            .unwrap_or_default())
    }

    async fn lookup_role(
        &self,
        guild_id: GuildId,
        role_id: RoleId,
    ) -> Result<Option<Role>, ApiError> {
        Ok(self
            .guilds
            .get(&guild_id)
            .and_then(|g| g.role(role_id).cloned()))
    }

    async fn edit_role(
        &self,
        guild_id: GuildId,
        role_id: RoleId,
        mentionable: bool,
    ) -> Result<Role, ApiError> {
        let updated = {
            let mut guild = self.guilds.get_mut(&guild_id).ok_or(ApiError::NotFound {
                kind: "guild",
                id: guild_id,
            })?;
            let role = guild
                .roles
                .iter_mut()
                .find(|r| r.id == role_id)
                .ok_or(ApiError::NotFound {
                    kind: "role",
                    id: role_id,
                })?;
            role.mentionable = mentionable;
            role.clone()
        };
        self.record(Outbound::RoleEdit {
            guild_id,
            role_id,
            mentionable,
        });
        Ok(updated)
    }

    async fn add_reaction(
        &self,
        _channel_id: ChannelId,
        message_id: MessageId,
        emoji: &str,
    ) -> Result<(), ApiError> {
        self.record(Outbound::Reaction {
            message_id,
            emoji: emoji.to_string(),
        });
        Ok(())
    }

    async fn clear_reactions(
        &self,
        _channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<(), ApiError> {
        self.record(Outbound::ClearReactions { message_id });
        Ok(())
    }

    async fn invites(&self, guild_id: GuildId) -> Result<Vec<GuildInvite>, ApiError> {
        Ok(self
            .invites
            .get(&guild_id)
            .map(|i| i.value().clone())
            .unwrap_or_default())
    }
}
