//! Moderation commands.

mod warn;

use crate::error::ConfigurationError;
use crate::framework::{
    ArgSpec, CommandDescriptor, CoreDeps, Module, ModuleRegistrar, Registry, RegistryBuilder,
    Resolver,
};
use crate::services::{self, ModerationService};

pub use warn::{WARN_DELETE_DELAY, WarnCommand};

pub struct ModerationModule;

impl Module for ModerationModule {
    fn name(&self) -> &'static str {
        "moderation"
    }

    fn provide(&self, registry: &mut RegistryBuilder, _deps: &CoreDeps) {
        services::punishment::provide(registry);
        services::moderation::provide(registry);
    }

    fn register(
        &self,
        commands: &mut ModuleRegistrar<'_>,
        registry: &Registry,
    ) -> Result<(), ConfigurationError> {
        let moderation = registry.service::<ModerationService>(services::MODERATION)?;

        commands.add(
            CommandDescriptor::new("warn")
                .arg(ArgSpec::required("member", Resolver::Member))
                .arg(ArgSpec::optional("reason", Resolver::String).rest())
                .group("Moderation")
                .description("Warn a member")
                .example("!warn @User spamming")
                .admin_only()
                .guild_only(),
            WarnCommand::new(moderation),
        );
        Ok(())
    }
}
