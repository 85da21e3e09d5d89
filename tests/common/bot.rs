//! In-process test bot.

use super::fixture::{self, CHANNEL, GUILD};
use imbot::Bot;
use imbot::api::{
    ChatApi, GatewayEvent, IncomingMessage, MemoryApi, MessageId, Outbound, ReactionEvent, User,
    UserId,
};
use imbot::config::Config;
use imbot::db::{Database, GuildSettings};
use imbot::framework::{CoreDeps, DispatchOutcome, ModuleAssembler};
use std::sync::Arc;

/// A fully assembled bot talking to a [`MemoryApi`].
pub struct TestBot {
    pub bot: Bot,
    pub api: Arc<MemoryApi>,
    pub db: Database,
}

impl TestBot {
    /// Bot with every module, in the fixture guild.
    pub async fn new() -> anyhow::Result<Self> {
        Self::with_config(fixture::CONFIG).await
    }

    pub async fn with_config(config: &str) -> anyhow::Result<Self> {
        Self::assemble(config, imbot::modules::all()).await
    }

    pub async fn assemble(config: &str, modules: ModuleAssembler) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(config)?;
        let api = Arc::new(MemoryApi::new(config.bot.user_id));
        api.insert_guild(fixture::guild());
        for member in fixture::members() {
            api.insert_member(GUILD, member);
        }

        let db = Database::new(":memory:").await?;
        let deps = CoreDeps {
            db: db.clone(),
            api: api.clone() as Arc<dyn ChatApi>,
            config: Arc::new(config),
        };
        let bot = Bot::with_modules(modules, deps)?;
        Ok(Self { bot, api, db })
    }

    /// Store settings for the fixture guild and drop the cached copy.
    pub async fn store_settings(&self, settings: GuildSettings) -> anyhow::Result<()> {
        self.db.settings().upsert(&settings).await?;
        self.bot.reload().await;
        Ok(())
    }

    fn incoming(&self, author: UserId, guild: bool, content: &str) -> IncomingMessage {
        let name = fixture::members()
            .into_iter()
            .find(|m| m.id() == author)
            .map_or_else(|| format!("user{author}"), |m| m.user.name);
        IncomingMessage {
            id: self.api.next_message_id(),
            channel_id: CHANNEL,
            guild_id: guild.then_some(GUILD),
            author: User {
                id: author,
                name,
                bot: author == fixture::BOT,
            },
            content: content.to_string(),
        }
    }

    /// Send a guild message and wait for its dispatch to finish.
    pub async fn send(&self, author: UserId, content: &str) -> DispatchOutcome {
        let message = self.incoming(author, true, content);
        self.dispatch(message).await
    }

    /// Send a direct message.
    pub async fn send_dm(&self, author: UserId, content: &str) -> DispatchOutcome {
        let message = self.incoming(author, false, content);
        self.dispatch(message).await
    }

    pub async fn dispatch(&self, message: IncomingMessage) -> DispatchOutcome {
        self.bot
            .handle_event(GatewayEvent::MessageCreate(message))
            .await
            .expect("message events are always dispatched")
    }

    pub async fn react(&self, user: UserId, message_id: MessageId, emoji: &str) {
        self.bot
            .handle_event(GatewayEvent::ReactionAdd(ReactionEvent {
                message_id,
                channel_id: CHANNEL,
                user_id: user,
                emoji: emoji.to_string(),
            }))
            .await;
    }

    /// Plain text of every message sent to the fixture channel.
    pub fn replies(&self) -> Vec<String> {
        self.api.sent_to(CHANNEL)
    }

    pub fn last_reply(&self) -> String {
        self.replies().pop().unwrap_or_default()
    }

    /// Id of the most recent message sent to the fixture channel.
    pub fn last_sent_id(&self) -> Option<MessageId> {
        self.api.outbound().iter().rev().find_map(|o| match o {
            Outbound::Send {
                channel_id,
                message_id,
                ..
            } if *channel_id == CHANNEL => Some(*message_id),
            _ => None,
        })
    }

    /// Current text of a sent message, edits applied.
    pub fn content_of(&self, message_id: MessageId) -> String {
        self.api
            .current_content(message_id)
            .map(|c| c.plain())
            .unwrap_or_default()
    }

    /// Emojis the bot reacted with on `message_id`.
    pub fn reactions_on(&self, message_id: MessageId) -> Vec<String> {
        self.api
            .outbound()
            .into_iter()
            .filter_map(|o| match o {
                Outbound::Reaction { message_id: m, emoji } if m == message_id => Some(emoji),
                _ => None,
            })
            .collect()
    }
}
