//! hemdash — home energy management dashboard client.
//!
//! The library holds the session state manager and everything it talks to;
//! the `hemdash` binary wraps it in a terminal dashboard and a few
//! one-shot commands.

pub mod activity;
pub mod api;
pub mod config;
pub mod session;
pub mod store;
pub mod timers;
pub mod web;
