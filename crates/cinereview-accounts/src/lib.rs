//! CineReview: Accounts context.
//!
//! User registration and login, role-based access, profile and password
//! changes, and the admin panel's statistics and audit-log views.

pub mod application;
pub mod domain;
pub mod ports;
pub mod security;
