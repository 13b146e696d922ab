//! Domain layer for the Catalog context.

pub mod commands;
pub mod genre;
pub mod movie;
