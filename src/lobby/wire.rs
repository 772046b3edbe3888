//! In-process wire model between the messaging substrate and the lobby
//! server.
//!
//! The bot sits on a chat presence network it does not manage itself:
//! session setup, authentication and room membership belong to the
//! substrate. What crosses the boundary are [`LobbyEvent`]s coming in and
//! [`OutboundMessage`]s going out, both over tokio channels, so the server
//! core can be driven (and tested) without any real network connection.
//!
//! The inbound payload shape follows the lobby gamelist protocol: a command
//! envelope (`register`, `unregister`, `changestate`, `getlist`) with the
//! game data as a free-form JSON mapping. Malformed envelopes produce a
//! [`CommandParseError`]; the server logs and drops them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::games::{GameRecord, PlayerJid};

/// A gamelist command as announced by a peer.
#[derive(Debug, Clone, PartialEq)]
pub enum GameListCommand {
    /// Announce a new game (or re-announce, replacing the old record).
    Register(Value),
    /// Withdraw the peer's announced game.
    Unregister,
    /// Change the live fields of the peer's announced game.
    ChangeState(Value),
    /// Ask for the current game list.
    GetList,
}

/// One inbound event from the messaging substrate.
#[derive(Debug, Clone, PartialEq)]
pub enum LobbyEvent {
    /// Gamelist traffic from a room occupant.
    GameList {
        from: PlayerJid,
        command: GameListCommand,
    },
    /// An occupant left the room; their announced game (if any) is
    /// implicitly withdrawn.
    OccupantLeft(PlayerJid),
}

/// Errors turning a raw command envelope into a [`GameListCommand`].
#[derive(Debug, Error)]
pub enum CommandParseError {
    #[error("gamelist envelope is not a mapping")]
    NotAMapping,
    #[error("gamelist envelope has no command")]
    MissingCommand,
    #[error("unknown gamelist command: {0}")]
    UnknownCommand(String),
}

impl GameListCommand {
    /// Parse a raw gamelist envelope of the form
    /// `{"command": "register", "game": {...}}`. The game mapping is passed
    /// through untouched; validating it is the registry's job.
    pub fn parse(envelope: &Value) -> Result<Self, CommandParseError> {
        let map = envelope
            .as_object()
            .ok_or(CommandParseError::NotAMapping)?;
        let command = map
            .get("command")
            .and_then(Value::as_str)
            .ok_or(CommandParseError::MissingCommand)?;
        let game = map.get("game").cloned().unwrap_or(Value::Null);

        match command {
            "register" => Ok(GameListCommand::Register(game)),
            "unregister" => Ok(GameListCommand::Unregister),
            "changestate" => Ok(GameListCommand::ChangeState(game)),
            "getlist" => Ok(GameListCommand::GetList),
            other => Err(CommandParseError::UnknownCommand(other.to_string())),
        }
    }
}

/// One game entry in the published list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishedGame {
    /// Jid of the announcing peer.
    pub owner: PlayerJid,
    #[serde(flatten)]
    pub game: GameRecord,
}

/// The full game-list payload handed to the transport for publishing.
/// Games appear in registry insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameListPayload {
    pub games: Vec<PublishedGame>,
}

impl GameListPayload {
    pub fn from_snapshot(snapshot: Vec<(PlayerJid, GameRecord)>) -> Self {
        GameListPayload {
            games: snapshot
                .into_iter()
                .map(|(owner, game)| PublishedGame { owner, game })
                .collect(),
        }
    }
}

/// An outbound message for the substrate to deliver. `to: None` means
/// broadcast to the whole room.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub to: Option<PlayerJid>,
    pub payload: GameListPayload,
}
