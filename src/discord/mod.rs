//! Discord bot integration.
//!
//! This module provides the gateway session that watches the monitored
//! channel for `!` commands and posts acknowledgments back.

pub mod client;
pub mod handler;

pub use client::DiscordConnection;
