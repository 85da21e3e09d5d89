//! Server management commands.

mod mention_role;

use crate::api::Permission;
use crate::error::ConfigurationError;
use crate::framework::{ArgSpec, CommandDescriptor, Module, ModuleRegistrar, Registry, Resolver};

pub use mention_role::MentionRoleCommand;

pub struct ManagementModule;

impl Module for ManagementModule {
    fn name(&self) -> &'static str {
        "management"
    }

    fn register(
        &self,
        commands: &mut ModuleRegistrar<'_>,
        _registry: &Registry,
    ) -> Result<(), ConfigurationError> {
        commands.add(
            CommandDescriptor::new("mentionRole")
                .aliases(&["mention-role", "mr"])
                .arg(ArgSpec::required("role", Resolver::Role))
                .group("Management")
                .description("Mention a role that is not mentionable")
                .example("!mentionRole @Role")
                .example("!mentionRole \"Role with space\"")
                .bot_permissions(&[Permission::ManageRoles])
                .admin_only()
                .guild_only(),
            MentionRoleCommand,
        );
        Ok(())
    }
}
