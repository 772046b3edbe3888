//! # Lobby Core Module
//!
//! Everything the bot does with a lobby room lives here:
//!
//! - [`games`] - the game registry: bounded, insertion-ordered store of
//!   announced games with validated insertion and FIFO eviction
//! - [`wire`] - the in-process event/payload model shared with the
//!   messaging substrate
//! - [`server`] - the event adapter wiring inbound events to registry
//!   calls and publishing snapshots
//!
//! ## Data flow
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   Messaging     │───→│   LobbyServer   │───→│  GameRegistry   │
//! │   Substrate     │    │  (event loop)   │    │  (bounded FIFO) │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//!        ↑                        │
//!        └──── published list ────┘
//! ```
//!
//! The substrate (session setup, authentication, room membership) is an
//! external collaborator reached only through tokio channels; see
//! [`wire::LobbyEvent`] and [`wire::OutboundMessage`] for the contract.

pub mod games;
pub mod server;
pub mod wire;

pub use server::LobbyServer;
