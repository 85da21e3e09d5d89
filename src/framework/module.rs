//! Feature modules and startup composition.
//!
//! A module contributes registry entries (caches, services) and commands.
//! Loading is two-phase: every module's entries go into the registry
//! before any command is built, so a module may bind commands to entries
//! provided by another module.

use super::command::{Command, CommandDescriptor, CommandHandler};
use super::dispatcher::{Dispatcher, DispatcherBuilder};
use super::pagination::PaginationController;
use super::registry::{Registry, RegistryBuilder};
use crate::api::ChatApi;
use crate::caches;
use crate::config::Config;
use crate::db::{Database, GuildSettings};
use crate::error::ConfigurationError;
use crate::services::DATABASE;
use std::sync::Arc;
use tracing::info;

/// Process-wide collaborators handed to module factories.
#[derive(Clone)]
pub struct CoreDeps {
    pub db: Database,
    pub api: Arc<dyn ChatApi>,
    pub config: Arc<Config>,
}

/// A named group of commands that can be disabled per guild.
pub trait Module: Send + Sync {
    /// Name stamped on every command of the module. Matched against a
    /// guild's disabled-module list ignoring case.
    fn name(&self) -> &'static str;

    /// Register the caches and services this module owns.
    fn provide(&self, _registry: &mut RegistryBuilder, _deps: &CoreDeps) {}

    /// Register commands, resolving registry handles up front.
    fn register(
        &self,
        commands: &mut ModuleRegistrar<'_>,
        registry: &Registry,
    ) -> Result<(), ConfigurationError>;
}

/// Command sink handed to [`Module::register`].
pub struct ModuleRegistrar<'a> {
    module: &'static str,
    builder: &'a mut DispatcherBuilder,
}

impl<'a> ModuleRegistrar<'a> {
    pub fn new(module: &'static str, builder: &'a mut DispatcherBuilder) -> Self {
        Self { module, builder }
    }

    /// Add a command owned by this module.
    pub fn add(
        &mut self,
        mut descriptor: CommandDescriptor,
        handler: impl CommandHandler + 'static,
    ) -> &mut Self {
        descriptor.module = self.module.to_string();
        self.builder.register(Command::new(descriptor, handler));
        self
    }
}

/// A fully wired bot core.
pub struct Assembly {
    pub registry: Arc<Registry>,
    pub dispatcher: Arc<Dispatcher>,
    pub pagination: Arc<PaginationController>,
}

/// Builds the registry and dispatcher from a list of modules.
#[derive(Default)]
pub struct ModuleAssembler {
    modules: Vec<Box<dyn Module>>,
}

impl ModuleAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, module: impl Module + 'static) -> Self {
        self.modules.push(Box::new(module));
        self
    }

    /// Wire everything. Any registration error aborts startup.
    pub fn assemble(self, deps: CoreDeps) -> Result<Assembly, ConfigurationError> {
        let mut entries = RegistryBuilder::new();
        let db = deps.db.clone();
        entries.service(DATABASE, &[], move |_| Ok(db.clone()));
        caches::settings::provide(&mut entries, &deps);
        for module in &self.modules {
            module.provide(&mut entries, &deps);
        }
        let registry = Arc::new(entries.build()?);

        let mut commands = DispatcherBuilder::new();
        for module in &self.modules {
            let mut registrar = ModuleRegistrar::new(module.name(), &mut commands);
            module.register(&mut registrar, &registry)?;
        }
        let table = commands.finish()?;

        let config = &deps.config;
        let pagination = PaginationController::new(deps.api.clone(), config.pagination.timeout());
        let settings = registry.cache::<GuildSettings>(caches::SETTINGS)?;

        info!(
            modules = self.modules.len(),
            commands = table.len(),
            entries = registry.names().count(),
            "Bot core assembled"
        );

        let dispatcher = Dispatcher::new(
            table,
            settings,
            deps.api.clone(),
            pagination.clone(),
            Arc::new(config.bot.clone()),
            config.dispatch.clone(),
        );

        Ok(Assembly {
            registry,
            dispatcher: Arc::new(dispatcher),
            pagination,
        })
    }
}
