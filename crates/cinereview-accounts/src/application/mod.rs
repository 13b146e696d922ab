//! Application layer for the Accounts context.

pub mod admin_service;
pub mod auth_service;
pub mod user_service;
