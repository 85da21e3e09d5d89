//! Invite ranks and invite codes.

mod invite_codes;
mod ranks;

use crate::caches;
use crate::db::{Database, Rank};
use crate::error::ConfigurationError;
use crate::framework::{
    ArgSpec, CommandDescriptor, CoreDeps, FlagSpec, Module, ModuleRegistrar, Registry,
    RegistryBuilder, Resolver,
};
use crate::services::DATABASE;

pub use invite_codes::InviteCodesCommand;
pub use ranks::{AddRankCommand, RANKS_PER_PAGE, RanksCommand, RemoveRankCommand};

pub struct InvitesModule;

impl Module for InvitesModule {
    fn name(&self) -> &'static str {
        "invites"
    }

    fn provide(&self, registry: &mut RegistryBuilder, _deps: &CoreDeps) {
        caches::ranks::provide(registry);
    }

    fn register(
        &self,
        commands: &mut ModuleRegistrar<'_>,
        registry: &Registry,
    ) -> Result<(), ConfigurationError> {
        let db = registry.service::<Database>(DATABASE)?;
        let ranks = registry.cache::<Vec<Rank>>(caches::RANKS)?;

        commands
            .add(
                CommandDescriptor::new("ranks")
                    .aliases(&["show-ranks", "showRanks"])
                    .arg(ArgSpec::optional("page", Resolver::NUMBER))
                    .flag(FlagSpec::switch("compact").short('c'))
                    .group("Ranks")
                    .description("Show all ranks")
                    .guild_only(),
                RanksCommand::new(ranks.clone()),
            )
            .add(
                CommandDescriptor::new("addRank")
                    .aliases(&["add-rank", "set-rank", "setRank"])
                    .arg(ArgSpec::required("role", Resolver::Role))
                    .arg(ArgSpec::required(
                        "invites",
                        Resolver::Number {
                            min: Some(0),
                            max: None,
                        },
                    ))
                    .arg(ArgSpec::optional("description", Resolver::String).rest())
                    .group("Ranks")
                    .description("Add a new rank, or update an existing one")
                    .example("!addRank @Role 5")
                    .example("!addRank \"Role with space\" 10 Wow, already 10 people!")
                    .admin_only()
                    .guild_only(),
                AddRankCommand::new(Database::clone(&db), ranks.clone()),
            )
            .add(
                CommandDescriptor::new("removeRank")
                    .aliases(&["remove-rank"])
                    .arg(ArgSpec::required("role", Resolver::Role))
                    .group("Ranks")
                    .description("Remove a rank")
                    .admin_only()
                    .guild_only(),
                RemoveRankCommand::new(Database::clone(&db), ranks),
            )
            .add(
                CommandDescriptor::new("inviteCodes")
                    .aliases(&[
                        "inviteCode",
                        "invite-code",
                        "invite-codes",
                        "getInviteCode",
                        "get-invite-code",
                        "get-invite-codes",
                        "showInviteCode",
                        "show-invite-code",
                    ])
                    .group("Invites")
                    .description("Get a list of all your invite codes")
                    .guild_only(),
                InviteCodesCommand::new(Database::clone(&db)),
            );
        Ok(())
    }
}
