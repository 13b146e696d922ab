//! Review service, event channel and event consumer.

pub mod event_channel;
pub mod event_consumer;
pub mod review_service;
