//! Chat platform data model as seen by the command framework.
//!
//! These are snapshots: the framework reads them, it never mutates the
//! platform through them. All ids are snowflakes.

use serde::Deserialize;
use std::collections::BTreeSet;
use std::fmt;

pub type GuildId = u64;
pub type UserId = u64;
pub type RoleId = u64;
pub type ChannelId = u64;
pub type MessageId = u64;

/// Guild-level permissions the framework knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Administrator,
    ManageGuild,
    ManageRoles,
    ManageChannels,
    ManageMessages,
    KickMembers,
    BanMembers,
    ViewAuditLog,
    SendMessages,
    EmbedLinks,
    AddReactions,
    MentionEveryone,
}

impl Permission {
    /// Human readable name used in replies.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Administrator => "Administrator",
            Self::ManageGuild => "Manage Server",
            Self::ManageRoles => "Manage Roles",
            Self::ManageChannels => "Manage Channels",
            Self::ManageMessages => "Manage Messages",
            Self::KickMembers => "Kick Members",
            Self::BanMembers => "Ban Members",
            Self::ViewAuditLog => "View Audit Log",
            Self::SendMessages => "Send Messages",
            Self::EmbedLinks => "Embed Links",
            Self::AddReactions => "Add Reactions",
            Self::MentionEveryone => "Mention Everyone",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub bot: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    /// Hierarchy position; higher outranks lower.
    #[serde(default)]
    pub position: i64,
    #[serde(default)]
    pub permissions: Vec<Permission>,
    #[serde(default)]
    pub mentionable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Channel {
    pub id: ChannelId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub user: User,
    pub nick: Option<String>,
    pub roles: Vec<RoleId>,
}

impl Member {
    pub fn id(&self) -> UserId {
        self.user.id
    }

    /// Nickname if set, otherwise the username.
    pub fn display_name(&self) -> &str {
        self.nick.as_deref().unwrap_or(&self.user.name)
    }

    pub fn mention(&self) -> String {
        format!("<@{}>", self.user.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guild {
    pub id: GuildId,
    pub name: String,
    pub owner_id: UserId,
    pub roles: Vec<Role>,
    pub channels: Vec<Channel>,
}

impl Guild {
    pub fn role(&self, id: RoleId) -> Option<&Role> {
        self.roles.iter().find(|r| r.id == id)
    }

    pub fn channel(&self, id: ChannelId) -> Option<&Channel> {
        self.channels.iter().find(|c| c.id == id)
    }

    /// Effective permissions of `member`: the union of the `@everyone` role
    /// (whose id equals the guild id) and every role the member holds.
    /// The owner implicitly holds everything via `Administrator`.
    pub fn permissions_of(&self, member: &Member) -> BTreeSet<Permission> {
        let mut perms: BTreeSet<Permission> = self
            .roles
            .iter()
            .filter(|r| r.id == self.id || member.roles.contains(&r.id))
            .flat_map(|r| r.permissions.iter().copied())
            .collect();
        if member.id() == self.owner_id {
            perms.insert(Permission::Administrator);
        }
        perms
    }

    /// Whether `member` holds `perm`, counting `Administrator` as all.
    pub fn has_permission(&self, member: &Member, perm: Permission) -> bool {
        let perms = self.permissions_of(member);
        perms.contains(&Permission::Administrator) || perms.contains(&perm)
    }

    /// The member's highest role, if they hold any.
    pub fn highest_role(&self, member: &Member) -> Option<&Role> {
        member
            .roles
            .iter()
            .filter_map(|id| self.role(*id))
            .max_by_key(|r| r.position)
    }

    /// Position of the member's highest role; `0` when they hold none.
    pub fn highest_position(&self, member: &Member) -> i64 {
        self.highest_role(member).map_or(0, |r| r.position)
    }
}

/// An invite as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildInvite {
    pub code: String,
    pub guild_id: GuildId,
    pub channel_id: Option<ChannelId>,
    pub inviter_id: Option<UserId>,
    pub uses: i64,
    pub max_uses: i64,
    /// Lifetime in seconds; `0` means permanent.
    pub max_age: i64,
    pub temporary: bool,
    /// Unix timestamp (seconds).
    pub created_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// Structured reply body. Rendering to the platform's wire format is the
/// API collaborator's job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Embed {
    pub title: Option<String>,
    pub description: String,
    pub fields: Vec<EmbedField>,
    pub footer: Option<String>,
}

impl Embed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }
}

/// Outbound message content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Embed(Embed),
}

impl Content {
    /// Flattened text form, used by the console transport and by tests.
    pub fn plain(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Embed(embed) => {
                if let Some(title) = &embed.title {
                    writeln!(f, "**{}**", title)?;
                }
                if !embed.description.is_empty() {
                    writeln!(f, "{}", embed.description.trim_end())?;
                }
                for field in &embed.fields {
                    writeln!(f, "{}: {}", field.name, field.value)?;
                }
                if let Some(footer) = &embed.footer {
                    write!(f, "[{}]", footer)?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Embed> for Content {
    fn from(embed: Embed) -> Self {
        Self::Embed(embed)
    }
}

/// A chat message received from the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub id: MessageId,
    pub channel_id: ChannelId,
    /// `None` for direct messages.
    pub guild_id: Option<GuildId>,
    pub author: User,
    pub content: String,
}

/// A reaction added to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionEvent {
    pub message_id: MessageId,
    pub channel_id: ChannelId,
    pub user_id: UserId,
    pub emoji: String,
}

/// Events the framework consumes from the gateway collaborator.
#[derive(Debug, Clone)]
pub enum GatewayEvent {
    MessageCreate(IncomingMessage),
    ReactionAdd(ReactionEvent),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(id: RoleId, position: i64, permissions: Vec<Permission>) -> Role {
        Role {
            id,
            name: format!("r{id}"),
            position,
            permissions,
            mentionable: false,
        }
    }

    fn guild() -> Guild {
        Guild {
            id: 1,
            name: "g".into(),
            owner_id: 99,
            roles: vec![
                role(1, 0, vec![Permission::SendMessages]),
                role(2, 5, vec![Permission::KickMembers]),
                role(3, 9, vec![Permission::Administrator]),
            ],
            channels: vec![],
        }
    }

    fn member(id: UserId, roles: Vec<RoleId>) -> Member {
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
    fn test_permissions_include_everyone_role() {
        let g = guild();
        let perms = g.permissions_of(&member(5, vec![2]));
        assert!(perms.contains(&Permission::SendMessages));
        assert!(perms.contains(&Permission::KickMembers));
        assert!(!perms.contains(&Permission::ManageRoles));
    }

    #[test]
    fn test_administrator_implies_everything() {
        let g = guild();
        assert!(g.has_permission(&member(5, vec![3]), Permission::ManageRoles));
        assert!(g.has_permission(&member(99, vec![]), Permission::BanMembers));
        assert!(!g.has_permission(&member(6, vec![]), Permission::BanMembers));
    }

    #[test]
    fn test_highest_position() {
        let g = guild();
        assert_eq!(g.highest_position(&member(5, vec![2, 3])), 9);
        assert_eq!(g.highest_position(&member(5, vec![])), 0);
    }

    #[test]
    fn test_content_plain_embed() {
        let mut embed = Embed::new().title("Ranks").description("a\nb");
        embed.footer = Some("Page 2/3".into());
        let text = Content::from(embed).plain();
        assert!(text.contains("**Ranks**"));
        assert!(text.ends_with("[Page 2/3]"));
    }
}
