//! Command framework.
//!
//! Turns chat messages into typed command invocations:
//! - `command`: command descriptors and the handler trait
//! - `resolver`: typed argument resolvers
//! - `args`: flag and positional argument parsing
//! - `dispatcher`: command table, guard chain and execution
//! - `registry`: named services and guild-scoped caches
//! - `module`: feature modules and startup composition
//! - `pagination`: reaction-driven page browsing

pub mod args;
pub mod command;
pub mod context;
pub mod dashmap_ext;
pub mod dispatcher;
pub mod module;
pub mod pagination;
pub mod registry;
pub mod resolver;

pub use args::{FlagValues, ParsedArgs, parse_arguments};
pub use command::{
    ArgSpec, ArgValue, Command, CommandDescriptor, CommandHandler, FlagKind, FlagSpec,
    PermissionRequirement, Resolver,
};
pub use context::{CommandContext, ResolvedInvocation};
pub use dispatcher::{CommandTable, DispatchOutcome, Dispatcher, DispatcherBuilder};
pub use module::{Assembly, CoreDeps, Module, ModuleAssembler, ModuleRegistrar};
pub use pagination::{Navigation, PageRenderer, PaginationController};
pub use registry::{CacheLoader, EntryScope, Registry, RegistryBuilder, ScopeKey, ScopedCache};
pub use resolver::ResolveScope;
