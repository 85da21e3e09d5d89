//! Feature modules.
//!
//! Each module bundles the commands of one feature area and the caches or
//! services they need. Guilds can disable a module by name.

pub mod info;
pub mod invites;
pub mod management;
pub mod moderation;

use crate::framework::ModuleAssembler;

pub use info::InfoModule;
pub use invites::InvitesModule;
pub use management::ManagementModule;
pub use moderation::ModerationModule;

/// Every built-in module.
pub fn all() -> ModuleAssembler {
    ModuleAssembler::new()
        .with(InfoModule)
        .with(InvitesModule)
        .with(ModerationModule)
        .with(ManagementModule)
}
