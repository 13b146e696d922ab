//! Domain layer for the Accounts context.

pub mod commands;
pub mod stats;
pub mod user;
