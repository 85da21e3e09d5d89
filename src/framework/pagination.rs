//! Pagination Controller.
//!
//! A paged reply is an embed edited in place. The owner navigates with the
//! reactions `⏮ ◀ ▶ ⏭`; everyone else is ignored. Sessions expire after a
//! period of inactivity, at which point the reactions are cleared and the
//! session forgotten. Navigation on one session is serialized through the
//! session's mutex; sessions never block each other.

use super::dashmap_ext::DashMapExt;
use crate::api::{ApiError, ChannelId, ChatApi, Content, Embed, MessageId, ReactionEvent, UserId};
use crate::telemetry::spans;
use dashmap::DashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{Instrument, debug, warn};

pub const FIRST: &str = "⏮";
pub const PREVIOUS: &str = "◀";
pub const NEXT: &str = "▶";
pub const LAST: &str = "⏭";

/// Reactions attached to multi-page replies, in display order.
pub const CONTROLS: [&str; 4] = [FIRST, PREVIOUS, NEXT, LAST];

/// Renders page `index` (zero-based).
pub type PageRenderer = Arc<dyn Fn(usize) -> Embed + Send + Sync>;

/// A navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    First,
    Previous,
    Next,
    Last,
    /// Zero-based page; clamped into range.
    To(i64),
}

impl Navigation {
    pub fn from_emoji(emoji: &str) -> Option<Self> {
        match emoji {
            FIRST => Some(Self::First),
            PREVIOUS => Some(Self::Previous),
            NEXT => Some(Self::Next),
            LAST => Some(Self::Last),
            _ => None,
        }
    }

    fn target(self, current: usize, total: usize) -> usize {
        let requested = match self {
            Self::First => 0,
            Self::Previous => current as i64 - 1,
            Self::Next => current as i64 + 1,
            Self::Last => total as i64 - 1,
            Self::To(page) => page,
        };
        clamp_page(requested, total)
    }
}

/// Clamp a zero-based page request into `[0, total)`.
pub fn clamp_page(requested: i64, total: usize) -> usize {
    let last = total.saturating_sub(1) as i64;
    requested.clamp(0, last) as usize
}

fn render(renderer: &PageRenderer, page: usize, total: usize) -> Content {
    let mut embed = renderer(page);
    embed.footer = Some(format!("Page {}/{}", page + 1, total));
    Content::Embed(embed)
}

struct Session {
    channel_id: ChannelId,
    owner_id: UserId,
    current: usize,
    total: usize,
    renderer: PageRenderer,
    deadline: Instant,
}

/// Owns every live pagination session.
pub struct PaginationController {
    api: Arc<dyn ChatApi>,
    sessions: DashMap<MessageId, Arc<Mutex<Session>>>,
    timeout: Duration,
}

impl PaginationController {
    pub fn new(api: Arc<dyn ChatApi>, timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            api,
            sessions: DashMap::new(),
            timeout,
        })
    }

    /// Send page `initial_page` (zero-based, clamped) of `total_pages` and
    /// attach navigation. Returns the id of the sent message.
    ///
    /// A single page is sent as-is and never registered.
    pub async fn start(
        self: &Arc<Self>,
        channel_id: ChannelId,
        owner_id: UserId,
        initial_page: i64,
        total_pages: usize,
        renderer: PageRenderer,
    ) -> Result<MessageId, ApiError> {
        let total = total_pages.max(1);
        let current = clamp_page(initial_page, total);
        let message_id = self
            .api
            .send(channel_id, render(&renderer, current, total))
            .await?;

        if total == 1 {
            return Ok(message_id);
        }

        for emoji in CONTROLS {
            self.api.add_reaction(channel_id, message_id, emoji).await?;
        }

        let session = Arc::new(Mutex::new(Session {
            channel_id,
            owner_id,
            current,
            total,
            renderer,
            deadline: Instant::now() + self.timeout,
        }));
        self.sessions.insert(message_id, session.clone());
        crate::metrics::set_pagination_sessions(self.sessions.len());
        debug!(message_id, page = current, total, "Pagination session started");

        self.spawn_expiry(message_id, session, owner_id);
        Ok(message_id)
    }

    fn spawn_expiry(self: &Arc<Self>, message_id: MessageId, session: Arc<Mutex<Session>>, owner_id: UserId) {
        let controller: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(
            async move {
                loop {
                    let deadline = session.lock().await.deadline;
                    tokio::time::sleep_until(deadline).await;

                    let Some(controller) = controller.upgrade() else {
                        return;
                    };
                    if controller.expire_if_due(message_id, &session).await {
                        return;
                    }
                }
            }
            .instrument(spans::pagination(message_id, owner_id)),
        );
    }

    /// Tear the session down if its deadline has passed. Returns `true` when
    /// the session is gone (expired now, or closed earlier).
    async fn expire_if_due(&self, message_id: MessageId, session: &Arc<Mutex<Session>>) -> bool {
        let registered = self
            .sessions
            .get_cloned(&message_id)
            .is_some_and(|s| Arc::ptr_eq(&s, session));
        if !registered {
            return true;
        }

        let guard = session.lock().await;
        if Instant::now() < guard.deadline {
            return false;
        }

        self.sessions
            .remove_if(&message_id, |_, s| Arc::ptr_eq(s, session));
        crate::metrics::set_pagination_sessions(self.sessions.len());
        if let Err(e) = self.api.clear_reactions(guard.channel_id, message_id).await {
            warn!(message_id, error = %e, "Failed to clear pagination reactions");
        }
        debug!(message_id, "Pagination session expired");
        true
    }

    /// Move session `message_id` as `user_id` requests.
    ///
    /// Returns the page now shown, or `None` when there is no such session or
    /// `user_id` does not own it. Navigation resets the inactivity deadline.
    pub async fn navigate(
        &self,
        message_id: MessageId,
        user_id: UserId,
        navigation: Navigation,
    ) -> Result<Option<usize>, ApiError> {
        let Some(session) = self.sessions.get_cloned(&message_id) else {
            return Ok(None);
        };
        let mut session = session.lock().await;
        if session.owner_id != user_id {
            return Ok(None);
        }

        session.deadline = Instant::now() + self.timeout;
        let target = navigation.target(session.current, session.total);
        if target != session.current {
            let content = render(&session.renderer, target, session.total);
            self.api.edit(session.channel_id, message_id, content).await?;
            session.current = target;
        }
        Ok(Some(session.current))
    }

    /// Route a reaction to its session. Returns `true` if it moved a session.
    pub async fn handle_reaction(&self, event: &ReactionEvent) -> Result<bool, ApiError> {
        let Some(navigation) = Navigation::from_emoji(&event.emoji) else {
            return Ok(false);
        };
        Ok(self
            .navigate(event.message_id, event.user_id, navigation)
            .await?
            .is_some())
    }

    /// End a session now. Returns `false` if it did not exist.
    pub async fn close(&self, message_id: MessageId) -> Result<bool, ApiError> {
        let Some((_, session)) = self.sessions.remove(&message_id) else {
            return Ok(false);
        };
        crate::metrics::set_pagination_sessions(self.sessions.len());
        let channel_id = session.lock().await.channel_id;
        self.api.clear_reactions(channel_id, message_id).await?;
        Ok(true)
    }

    /// Zero-based page shown by a live session.
    pub async fn current_page(&self, message_id: MessageId) -> Option<usize> {
        let session = self.sessions.get_cloned(&message_id)?;
        let current = session.lock().await.current;
        Some(current)
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MemoryApi, Outbound};

    const OWNER: UserId = 7;

    fn setup(timeout: Duration) -> (Arc<MemoryApi>, Arc<PaginationController>) {
        let api = Arc::new(MemoryApi::new(1));
        let controller = PaginationController::new(api.clone(), timeout);
        (api, controller)
    }

    fn pages() -> PageRenderer {
        Arc::new(|page| Embed::new().description(format!("body {page}")))
    }

    #[test]
    fn test_clamp_page() {
        assert_eq!(clamp_page(7, 5), 4);
        assert_eq!(clamp_page(-3, 5), 0);
        assert_eq!(clamp_page(2, 5), 2);
        assert_eq!(clamp_page(3, 0), 0);
    }

    #[tokio::test]
    async fn test_start_renders_and_attaches_controls() {
        let (api, controller) = setup(Duration::from_secs(120));
        let id = controller.start(5, OWNER, 9, 3, pages()).await.unwrap();

        let shown = api.current_content(id).unwrap().plain();
        assert!(shown.contains("body 2"));
        assert!(shown.ends_with("[Page 3/3]"));

        let reactions: Vec<String> = api
            .outbound()
            .into_iter()
            .filter_map(|o| match o {
                Outbound::Reaction { emoji, .. } => Some(emoji),
                _ => None,
            })
            .collect();
        assert_eq!(reactions, CONTROLS);
        assert_eq!(controller.active_sessions(), 1);
    }

    #[tokio::test]
    async fn test_single_page_is_not_registered() {
        let (api, controller) = setup(Duration::from_secs(120));
        let id = controller.start(5, OWNER, 0, 1, pages()).await.unwrap();
        assert_eq!(controller.active_sessions(), 0);
        assert!(api.current_content(id).unwrap().plain().ends_with("[Page 1/1]"));
        assert!(!api.outbound().iter().any(|o| matches!(o, Outbound::Reaction { .. })));
    }

    #[tokio::test]
    async fn test_navigation_clamps_and_ignores_strangers() {
        let (api, controller) = setup(Duration::from_secs(120));
        let id = controller.start(5, OWNER, 0, 5, pages()).await.unwrap();

        assert_eq!(controller.navigate(id, 99, Navigation::Last).await.unwrap(), None);
        assert_eq!(controller.current_page(id).await, Some(0));

        assert_eq!(
            controller.navigate(id, OWNER, Navigation::To(7)).await.unwrap(),
            Some(4)
        );
        assert_eq!(
            controller.navigate(id, OWNER, Navigation::Next).await.unwrap(),
            Some(4)
        );
        assert_eq!(
            controller.navigate(id, OWNER, Navigation::To(-3)).await.unwrap(),
            Some(0)
        );
        assert!(api.current_content(id).unwrap().plain().contains("[Page 1/5]"));

        let moved = controller
            .handle_reaction(&ReactionEvent {
                message_id: id,
                channel_id: 5,
                user_id: OWNER,
                emoji: NEXT.into(),
            })
            .await
            .unwrap();
        assert!(moved);
        assert_eq!(controller.current_page(id).await, Some(1));
    }

    #[tokio::test]
    async fn test_concurrent_navigation_is_serialized() {
        let (api, controller) = setup(Duration::from_secs(120));
        let id = controller.start(5, OWNER, 0, 5, pages()).await.unwrap();

        let (a, b, c) = tokio::join!(
            controller.navigate(id, OWNER, Navigation::Next),
            controller.navigate(id, OWNER, Navigation::Next),
            controller.navigate(id, OWNER, Navigation::Next),
        );
        let mut landed = vec![a.unwrap(), b.unwrap(), c.unwrap()];
        landed.sort();
        assert_eq!(landed, vec![Some(1), Some(2), Some(3)]);
        assert_eq!(controller.current_page(id).await, Some(3));
        assert!(api.current_content(id).unwrap().plain().contains("[Page 4/5]"));
    }

    #[tokio::test]
    async fn test_close() {
        let (api, controller) = setup(Duration::from_secs(120));
        let id = controller.start(5, OWNER, 0, 2, pages()).await.unwrap();
        assert!(controller.close(id).await.unwrap());
        assert!(!controller.close(id).await.unwrap());
        assert_eq!(controller.active_sessions(), 0);
        assert!(api
            .outbound()
            .contains(&Outbound::ClearReactions { message_id: id }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_and_deadline_reset() {
        let (api, controller) = setup(Duration::from_secs(120));
        let id = controller.start(5, OWNER, 0, 3, pages()).await.unwrap();

        tokio::time::sleep(Duration::from_secs(100)).await;
        controller.navigate(id, OWNER, Navigation::Next).await.unwrap();

        // Past the original deadline but inside the reset one.
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(controller.active_sessions(), 1);

        tokio::time::sleep(Duration::from_secs(61)).await;
        tokio::task::yield_now().await;
        assert_eq!(controller.active_sessions(), 0);
        assert!(api
            .outbound()
            .contains(&Outbound::ClearReactions { message_id: id }));
        assert_eq!(
            controller.navigate(id, OWNER, Navigation::Next).await.unwrap(),
            None
        );
    }
}
