//! CineReview: Catalog context.
//!
//! Movies and genres: their validation rules, the services that manage
//! them, and the repository capabilities the store implements.

pub mod application;
pub mod domain;
pub mod ports;
