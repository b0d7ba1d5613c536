//! fuel-bot: Airline Manager market watcher.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod clock;
pub mod game;
pub mod market;
pub mod notifier;
pub mod poller;
