//! The assembled bot: modules wired into a dispatcher, fed by gateway events.

use crate::api::{ChatApi, GatewayEvent};
use crate::error::ConfigurationError;
use crate::framework::{
    CoreDeps, DispatchOutcome, Dispatcher, ModuleAssembler, PaginationController, Registry,
};
use crate::modules;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct Bot {
    api: Arc<dyn ChatApi>,
    registry: Arc<Registry>,
    dispatcher: Arc<Dispatcher>,
    pagination: Arc<PaginationController>,
}

impl Bot {
    /// Assemble the bot with every built-in module.
    pub fn build(deps: CoreDeps) -> Result<Self, ConfigurationError> {
        Self::with_modules(modules::all(), deps)
    }

    pub fn with_modules(
        modules: ModuleAssembler,
        deps: CoreDeps,
    ) -> Result<Self, ConfigurationError> {
        let api = deps.api.clone();
        let assembly = modules.assemble(deps)?;
        Ok(Self {
            api,
            registry: assembly.registry,
            dispatcher: assembly.dispatcher,
            pagination: assembly.pagination,
        })
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn pagination(&self) -> &Arc<PaginationController> {
        &self.pagination
    }

    /// Drop every cached guild value; the next access reloads from storage.
    pub async fn reload(&self) {
        self.registry.invalidate_all().await;
    }

    /// Handle one gateway event. Returns the dispatch outcome for messages.
    pub async fn handle_event(&self, event: GatewayEvent) -> Option<DispatchOutcome> {
        match event {
            GatewayEvent::MessageCreate(message) => {
                crate::metrics::record_event("message");
                Some(self.dispatcher.dispatch(message).await)
            }
            GatewayEvent::ReactionAdd(reaction) => {
                crate::metrics::record_event("reaction");
                if reaction.user_id == self.api.current_user_id() {
                    return None;
                }
                match self.pagination.handle_reaction(&reaction).await {
                    Ok(handled) => {
                        debug!(message_id = reaction.message_id, handled, "Reaction processed");
                    }
                    Err(e) => {
                        warn!(message_id = reaction.message_id, error = %e, "Failed to handle reaction");
                    }
                }
                None
            }
        }
    }
}
