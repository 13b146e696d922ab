//! CineReview: Reviews context.
//!
//! Owns the review lifecycle: creation, partial update and deletion with
//! ownership rules, the one-review-per-movie-per-author invariant, and the
//! best-effort event pipeline that recomputes a movie's average rating and
//! writes the audit trail after every mutation.

pub mod application;
pub mod domain;
pub mod ports;
