//! `codebro` Server
//!
//! Slack bot backend. Signed webhooks are verified and acknowledged at once;
//! the actual work runs afterwards on ordered, single-consumer queues.

pub mod api;
pub mod auth;
pub mod commands;
pub mod config;
pub mod events;
pub mod queue;
pub mod slack;
