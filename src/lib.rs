//! # Lobbybot - Game-Listing Bot for Multiplayer Chat Lobbies
//!
//! Lobbybot sits in a lobby chat room and tracks the multiplayer games its
//! occupants announce: peers register a game when they host one, update it
//! as players join and leave, and withdraw it when it ends (or when they
//! vanish from the room). The bot keeps a bounded, insertion-ordered
//! registry of those announcements and publishes a consistent snapshot of
//! the full list back to the room after every change.
//!
//! ## Features
//!
//! - **Bounded Registry**: FIFO eviction caps memory under adversarial or
//!   buggy peers; capacity is a fixed policy constant.
//! - **Input Sanitization**: Announcements are loosely-typed mappings from
//!   untrusted peers; names are truncated rather than rejected, malformed
//!   data fails cleanly with no partial mutation.
//! - **Drift Tracking**: Each game keeps an immutable snapshot of its
//!   announcement-time players and player count, so mid-session changes
//!   are detectable against that baseline.
//! - **Substrate-Agnostic**: The messaging network (session, auth, room
//!   membership) is an external collaborator reached over tokio channels.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lobbybot::config::Config;
//! use lobbybot::lobby::LobbyServer;
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!
//!     // Channel ends normally owned by the messaging substrate
//!     let (_events_tx, events_rx) = mpsc::unbounded_channel();
//!     let (outbound_tx, _outbound_rx) = mpsc::unbounded_channel();
//!
//!     let mut server = LobbyServer::new(config, events_rx, outbound_tx);
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`lobby`] - Core functionality: game registry, wire model, event loop
//! - [`config`] - Configuration management
//! - [`logutil`] - Log sanitization for peer-controlled strings

pub mod config;
pub mod lobby;
pub mod logutil;
