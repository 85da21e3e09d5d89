//! Integration test common infrastructure.
//!
//! Provides an in-process bot wired to a [`imbot::api::MemoryApi`] fixture
//! guild and an in-memory database, plus helpers for asserting on replies.

pub mod bot;
pub mod fixture;

#[allow(unused_imports)]
pub use bot::TestBot;
#[allow(unused_imports)]
pub use fixture::*;
