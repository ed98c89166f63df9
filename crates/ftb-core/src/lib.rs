//! Core domain + application logic for the forum topic bot.
//!
//! This crate is intentionally framework-agnostic. Telegram / OpenAI live
//! behind ports (traits) implemented in adapter crates; the routing table,
//! the dispatch gate and the command handlers only ever see those ports.

pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod moderator;
pub mod ports;
pub mod routing;

pub use errors::{Error, Result};
