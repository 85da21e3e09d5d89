//! Bot information commands.

mod get_bot;
mod help;

use crate::framework::{
    ArgSpec, CommandDescriptor, Module, ModuleRegistrar, Registry, Resolver,
};
use crate::error::ConfigurationError;

pub use get_bot::GetBotCommand;
pub use help::HelpCommand;

pub struct InfoModule;

impl Module for InfoModule {
    fn name(&self) -> &'static str {
        "info"
    }

    fn register(
        &self,
        commands: &mut ModuleRegistrar<'_>,
        _registry: &Registry,
    ) -> Result<(), ConfigurationError> {
        commands
            .add(
                CommandDescriptor::new("help")
                    .arg(ArgSpec::optional("command", Resolver::Command))
                    .group("Info")
                    .description("Show all commands, or details of one command")
                    .example("!help addRank"),
                HelpCommand,
            )
            .add(
                CommandDescriptor::new("getBot")
                    .aliases(&["get-bot", "invite-bot", "inviteBot"])
                    .group("Info")
                    .description("Get an invite link for the bot"),
                GetBotCommand,
            );
        Ok(())
    }
}
