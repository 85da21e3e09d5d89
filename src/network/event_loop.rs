//! Gateway event loop.

use crate::api::GatewayEvent;
use crate::bot::Bot;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Capacity of the gateway event channel.
pub const EVENT_CHANNEL_SIZE: usize = 1024;

/// Consume events until the sender side closes, then wait for the events
/// already in flight.
///
/// Every event runs on its own task so a slow command never holds up the
/// next message. Failures are contained by the dispatcher.
pub async fn run_event_loop(bot: Arc<Bot>, mut events: mpsc::Receiver<GatewayEvent>) {
    let mut tasks = JoinSet::new();
    while let Some(event) = events.recv().await {
        let bot = Arc::clone(&bot);
        tasks.spawn(async move {
            bot.handle_event(event).await;
        });
        while let Some(done) = tasks.try_join_next() {
            if let Err(e) = done {
                warn!(error = %e, "Event task failed");
            }
        }
    }

    info!(in_flight = tasks.len(), "Event stream closed");
    while let Some(done) = tasks.join_next().await {
        if let Err(e) = done {
            warn!(error = %e, "Event task failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ChatApi, Guild, IncomingMessage, MemoryApi, User};
    use crate::config::Config;
    use crate::db::Database;
    use crate::framework::CoreDeps;

    #[tokio::test]
    async fn test_close_waits_for_in_flight_events() {
        let config: Config = toml::from_str("[bot]\nuser_id = 1000\n").unwrap();
        let api = Arc::new(MemoryApi::new(1000));
        api.insert_guild(Guild {
            id: 1,
            name: "g".into(),
            owner_id: 10,
            roles: vec![],
            channels: vec![],
        });
        let bot = Bot::build(CoreDeps {
            db: Database::new(":memory:").await.unwrap(),
            api: api.clone() as Arc<dyn ChatApi>,
            config: Arc::new(config),
        })
        .unwrap();

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_SIZE);
        for id in 0..3 {
            tx.send(GatewayEvent::MessageCreate(IncomingMessage {
                id,
                channel_id: 100,
                guild_id: None,
                author: User {
                    id: 10,
                    name: "owner".into(),
                    bot: false,
                },
                content: "!getBot".into(),
            }))
            .await
            .unwrap();
        }
        drop(tx);

        run_event_loop(Arc::new(bot), rx).await;
        assert_eq!(api.sent_to(100).len(), 3);
    }
}
