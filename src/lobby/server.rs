//! Lobby server: the event adapter between the messaging substrate and the
//! game registry.
//!
//! The server owns the [`GameRegistry`] and is the only writer to it. It
//! consumes [`LobbyEvent`]s from a single mpsc stream, so registry
//! mutations are inherently serialized - one event is fully applied before
//! the next is looked at, and no internal locking is needed. Snapshots
//! published to the room are owned copies taken between events, never a
//! half-applied view.
//!
//! Legality of state transitions is deliberately not enforced here or in
//! the registry: the registry is a passive store, and a peer can announce
//! whatever state it likes for its own game. What the server does track is
//! drift - when an update moves a game's live players or player count away
//! from its announcement-time baseline, that gets logged.

use anyhow::Result;
use log::{debug, info, warn};
use tokio::sync::mpsc;

use super::games::{GameRegistry, PlayerJid};
use super::wire::{GameListCommand, GameListPayload, LobbyEvent, OutboundMessage};
use crate::config::Config;
use crate::logutil::escape_log;

/// Event loop host for the lobby bot.
///
/// Inbound events arrive on an [`mpsc::UnboundedReceiver`], outbound
/// game-list payloads leave on an [`mpsc::UnboundedSender`]; both ends
/// belong to the messaging substrate. Tests drive [`LobbyServer::handle_event`]
/// directly and read the outbound channel.
pub struct LobbyServer {
    config: Config,
    games: GameRegistry,
    events_rx: mpsc::UnboundedReceiver<LobbyEvent>,
    outbound_tx: mpsc::UnboundedSender<OutboundMessage>,
}

impl LobbyServer {
    pub fn new(
        config: Config,
        events_rx: mpsc::UnboundedReceiver<LobbyEvent>,
        outbound_tx: mpsc::UnboundedSender<OutboundMessage>,
    ) -> Self {
        LobbyServer {
            config,
            games: GameRegistry::new(),
            events_rx,
            outbound_tx,
        }
    }

    /// Run the event loop until the substrate closes the inbound channel.
    pub async fn run(&mut self) -> Result<()> {
        info!(
            "Serving game list for room {} on {}",
            self.config.lobby.room, self.config.lobby.domain
        );
        while let Some(event) = self.events_rx.recv().await {
            self.handle_event(event);
        }
        info!("Lobby event stream closed, shutting down");
        Ok(())
    }

    /// Apply one inbound event: translate it into registry calls and
    /// publish the updated list when the registry changed. Complete per
    /// event - there is no partially-applied state between calls.
    pub fn handle_event(&mut self, event: LobbyEvent) {
        match event {
            LobbyEvent::GameList { from, command } => match command {
                GameListCommand::Register(game) => {
                    if self.games.add_game(&from, Some(&game)) {
                        self.broadcast_game_list();
                    }
                }
                GameListCommand::Unregister => {
                    if self.games.remove_game(&from) {
                        self.broadcast_game_list();
                    }
                }
                GameListCommand::ChangeState(game) => {
                    if self.games.update_game(&from, Some(&game)) {
                        self.log_drift(&from);
                        self.broadcast_game_list();
                    }
                }
                GameListCommand::GetList => {
                    debug!("Game list requested by {}", escape_log(from.as_str()));
                    self.send_game_list(Some(from));
                }
            },
            LobbyEvent::OccupantLeft(jid) => {
                // A vanished occupant can no longer host; withdraw quietly
                // if they never announced a game.
                if self.games.remove_game(&jid) {
                    info!(
                        "Removed game from {} who left the room",
                        escape_log(jid.as_str())
                    );
                    self.broadcast_game_list();
                }
            }
        }
    }

    fn log_drift(&self, jid: &PlayerJid) {
        if let Some(game) = self.games.get(jid) {
            if game.players_drifted() || game.nbp_drifted() {
                debug!(
                    "Game from {} drifted from its announcement: players {:?} (was {:?}), nbp {} (was {})",
                    escape_log(jid.as_str()),
                    game.players,
                    game.players_init,
                    escape_log(&game.nbp),
                    escape_log(&game.nbp_init)
                );
            }
        }
    }

    fn broadcast_game_list(&self) {
        self.send_game_list(None);
    }

    fn send_game_list(&self, to: Option<PlayerJid>) {
        let payload = GameListPayload::from_snapshot(self.games.get_all_games());
        debug!("Publishing game list with {} entries", payload.games.len());
        if self.outbound_tx.send(OutboundMessage { to, payload }).is_err() {
            warn!("Outbound channel closed, dropping game list publication");
        }
    }

    /// Current number of announced games (for the status command).
    pub fn game_count(&self) -> usize {
        self.games.len()
    }
}
