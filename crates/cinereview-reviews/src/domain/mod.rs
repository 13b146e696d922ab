//! Review domain types, commands and events.

pub mod commands;
pub mod events;
pub mod review;
