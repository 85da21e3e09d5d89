//! Console transport.
//!
//! Each stdin line becomes a gateway event in the configured fixture guild.
//! Everything the bot does is printed as it happens.
//!
//! | Line                       | Event                                  |
//! |----------------------------|----------------------------------------|
//! | `text`                     | message from the configured author     |
//! | `/as <user_id> <text>`     | message from another fixture member    |
//! | `/dm <text>`               | direct message from the author         |
//! | `/react <message> <emoji>` | reaction by the author                 |

use crate::api::{
    Channel, GatewayEvent, Guild, IncomingMessage, Member, MemoryApi, Outbound, ReactionEvent,
    Role, User, UserId,
};
use crate::config::{BotConfig, ConsoleConfig};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Build a [`MemoryApi`] holding the console fixture guild.
///
/// The `@everyone` role, the configured channel, the owner and the bot are
/// added when the fixture leaves them out.
pub fn fixture_api(bot: &BotConfig, console: &ConsoleConfig) -> MemoryApi {
    let fixture = &console.guild;
    let mut roles = console.roles.clone();
    if !roles.iter().any(|r| r.id == fixture.id) {
        roles.push(Role {
            id: fixture.id,
            name: "@everyone".into(),
            position: 0,
            permissions: Vec::new(),
            mentionable: false,
        });
    }
    let mut channels = console.channels.clone();
    if !channels.iter().any(|c| c.id == console.channel_id) {
        channels.push(Channel {
            id: console.channel_id,
            name: "general".into(),
        });
    }

    let api = MemoryApi::new(bot.user_id);
    api.insert_guild(Guild {
        id: fixture.id,
        name: fixture.name.clone(),
        owner_id: fixture.owner_id,
        roles,
        channels,
    });

    for member in &console.members {
        api.insert_member(
            fixture.id,
            Member {
                user: User {
                    id: member.id,
                    name: member.name.clone(),
                    bot: member.bot,
                },
                nick: member.nick.clone(),
                roles: member.roles.clone(),
            },
        );
    }
    let known = |id: UserId| console.members.iter().any(|m| m.id == id);
    if !known(fixture.owner_id) {
        api.insert_member(fixture.id, plain_member(fixture.owner_id, "owner", false));
    }
    if !known(bot.user_id) {
        api.insert_member(fixture.id, plain_member(bot.user_id, &bot.name, true));
    }
    api
}

fn plain_member(id: UserId, name: &str, bot: bool) -> Member {
    Member {
        user: User {
            id,
            name: name.to_string(),
            bot,
        },
        nick: None,
        roles: Vec::new(),
    }
}

/// Print one outbound action.
pub fn print_outbound(action: &Outbound) {
    match action {
        Outbound::Send {
            channel_id,
            message_id,
            content,
        } => println!("[#{channel_id} msg {message_id}] {}", content.plain()),
        Outbound::Edit {
            message_id,
            content,
            ..
        } => println!("[edit msg {message_id}] {}", content.plain()),
        Outbound::Delete { message_id, .. } => println!("[delete msg {message_id}]"),
        Outbound::Dm {
            user_id, content, ..
        } => println!("[dm to {user_id}] {}", content.plain()),
        Outbound::Reaction { message_id, emoji } => println!("[react msg {message_id}] {emoji}"),
        Outbound::ClearReactions { message_id } => println!("[clear reactions msg {message_id}]"),
        Outbound::RoleEdit {
            role_id,
            mentionable,
            ..
        } => println!("[role {role_id}] mentionable = {mentionable}"),
    }
}

/// Turns console lines into gateway events.
pub struct Console {
    api: Arc<MemoryApi>,
    config: ConsoleConfig,
}

impl Console {
    pub fn new(api: Arc<MemoryApi>, config: ConsoleConfig) -> Self {
        Self { api, config }
    }

    fn user(&self, id: UserId) -> User {
        self.config
            .members
            .iter()
            .find(|m| m.id == id)
            .map(|m| User {
                id,
                name: m.name.clone(),
                bot: m.bot,
            })
            .unwrap_or_else(|| User {
                id,
                name: format!("user{id}"),
                bot: false,
            })
    }

    fn message(&self, author: UserId, guild: bool, content: &str) -> GatewayEvent {
        GatewayEvent::MessageCreate(IncomingMessage {
            id: self.api.next_message_id(),
            channel_id: self.config.channel_id,
            guild_id: guild.then_some(self.config.guild.id),
            author: self.user(author),
            content: content.to_string(),
        })
    }

    /// Parse one line. Blank and malformed lines yield `None`.
    pub fn parse_line(&self, line: &str) -> Option<GatewayEvent> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let author = self.config.author_id;

        if let Some(rest) = line.strip_prefix("/react ") {
            let (message, emoji) = rest.trim().split_once(' ')?;
            return Some(GatewayEvent::ReactionAdd(ReactionEvent {
                message_id: message.parse().ok()?,
                channel_id: self.config.channel_id,
                user_id: author,
                emoji: emoji.trim().to_string(),
            }));
        }
        if let Some(rest) = line.strip_prefix("/as ") {
            let (user, text) = rest.trim().split_once(' ')?;
            return Some(self.message(user.parse().ok()?, true, text));
        }
        if let Some(text) = line.strip_prefix("/dm ") {
            return Some(self.message(author, false, text));
        }
        Some(self.message(author, true, line))
    }

    /// Read stdin until EOF, forwarding events.
    pub async fn run(self, events: mpsc::Sender<GatewayEvent>) {
        info!(
            guild = self.config.guild.id,
            channel = self.config.channel_id,
            author = self.config.author_id,
            "Console transport ready"
        );
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => match self.parse_line(&line) {
                    Some(event) => {
                        if events.send(event).await.is_err() {
                            break;
                        }
                    }
                    None => warn!(line = %line, "Ignoring console line"),
                },
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "Failed to read console input");
                    break;
                }
            }
        }
        info!("Console input closed");
    }
}
