//! CineReview Core: shared domain abstractions.
//!
//! This crate defines the traits and types that every context crate
//! depends on: the clock, the domain error, pagination and the audit log
//! capabilities. It contains no infrastructure code.

pub mod audit;
pub mod clock;
pub mod error;
pub mod pagination;
