//! Application layer for the Catalog context.

pub mod genre_service;
pub mod movie_service;
