//! Event transport.
//!
//! The gateway collaborator delivers [`GatewayEvent`](crate::api::GatewayEvent)s
//! over a channel; the event loop hands each one to the bot on its own task.
//! The console transport stands in for the real gateway.

pub mod console;
mod event_loop;

pub use console::Console;
pub use event_loop::{EVENT_CHANNEL_SIZE, run_event_loop};
