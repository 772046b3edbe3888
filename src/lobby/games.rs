//! Registry of games currently announced in the lobby.
//!
//! This is the single source of truth for "games in progress or forming".
//! Announcements arrive from untrusted peers as loosely-typed JSON mappings,
//! so everything is sanitized on the way in: names are truncated instead of
//! rejected, missing fields get explicit defaults, and every rejection is a
//! plain `false` return so a hostile peer can never destabilize the bot.
//!
//! The registry is bounded: when a buggy or malicious peer floods it with
//! announcements under distinct identities, the oldest entry is evicted in
//! pure insertion order (FIFO, not LRU - how recently a record was read or
//! updated is irrelevant). Eviction is policy, not an error.
//!
//! Mutation is expected from a single event-loop task (see
//! [`super::server`]), so no internal locking is needed; snapshots returned
//! by [`GameRegistry::get_all_games`] are owned copies and stay consistent
//! regardless of later mutations.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::logutil::escape_log;

/// Maximum stored game name length, in characters. Longer names are
/// truncated on insert, never rejected.
pub const MAX_GAME_NAME_LEN: usize = 256;

/// Default registry capacity. Chosen generously so legitimately active
/// games are never evicted under normal lobby load.
pub const DEFAULT_CAPACITY: usize = 2048;

/// The network identity of the participant who announced a game
/// (`user@domain/resource`). Supplied by the messaging layer; the registry
/// never constructs one, it only compares and hashes them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerJid(String);

impl PlayerJid {
    pub fn new(jid: impl Into<String>) -> Self {
        PlayerJid(jid.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PlayerJid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerJid {
    fn from(jid: &str) -> Self {
        PlayerJid(jid.to_string())
    }
}

/// Lifecycle tag of an announced game.
///
/// Transitions are driven entirely by peer announcements relayed through
/// [`GameRegistry::update_game`]; the registry performs no autonomous
/// transitions and does not validate legality (`running` back to `init` is
/// accepted). Trust boundary: a peer controls the state of its own record
/// and can set arbitrary values, which land in [`GameState::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GameState {
    /// Just announced, players still joining.
    Init,
    /// Lobby open, game not yet started.
    Waiting,
    /// Game in progress.
    Running,
    /// Any unrecognized peer-supplied tag, preserved verbatim.
    Other(String),
}

impl From<String> for GameState {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "init" => GameState::Init,
            "waiting" => GameState::Waiting,
            "running" => GameState::Running,
            _ => GameState::Other(tag),
        }
    }
}

impl From<GameState> for String {
    fn from(state: GameState) -> Self {
        state.as_str().to_string()
    }
}

impl GameState {
    pub fn as_str(&self) -> &str {
        match self {
            GameState::Init => "init",
            GameState::Waiting => "waiting",
            GameState::Running => "running",
            GameState::Other(tag) => tag,
        }
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One announced game, normalized from the peer's raw announcement.
///
/// `players_init` and `nbp_init` are snapshots of `players`/`nbp` taken at
/// insertion time and never overwritten by later updates; they are the
/// baseline against which mid-session drift (a player leaving, the player
/// count changing) is measured. Re-announcing under the same jid replaces
/// the whole record and re-baselines both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Player names as currently announced.
    pub players: Vec<String>,
    /// Game name, at most [`MAX_GAME_NAME_LEN`] characters.
    pub name: String,
    /// Free-form "current/max players" token; opaque to the registry.
    pub nbp: String,
    pub state: GameState,
    #[serde(rename = "players-init")]
    pub players_init: Vec<String>,
    #[serde(rename = "nbp-init")]
    pub nbp_init: String,
    /// Any other announced fields (map name, victory condition, ...),
    /// carried through verbatim so the published list keeps them.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GameRecord {
    /// Build a record from a raw announcement mapping, snapshotting the
    /// `*_init` baseline fields.
    fn from_announcement(data: &Map<String, Value>) -> Self {
        let players = string_list(data.get("players"));
        let name = truncate_name(&string_field(data.get("name")));
        let nbp = string_field(data.get("nbp"));
        let state = data
            .get("state")
            .and_then(Value::as_str)
            .map(|tag| GameState::from(tag.to_string()))
            .unwrap_or(GameState::Init);

        let mut extra = Map::new();
        for (key, value) in data {
            if !is_known_field(key) {
                extra.insert(key.clone(), value.clone());
            }
        }

        GameRecord {
            players_init: players.clone(),
            nbp_init: nbp.clone(),
            players,
            name,
            nbp,
            state,
            extra,
        }
    }

    /// Merge an update mapping into the live fields. The `*_init` baseline
    /// is never touched, even if the peer sends it.
    fn apply_update(&mut self, data: &Map<String, Value>) {
        for (key, value) in data {
            match key.as_str() {
                "players" => self.players = string_list(Some(value)),
                "name" => self.name = truncate_name(&string_field(Some(value))),
                "nbp" => self.nbp = string_field(Some(value)),
                "state" => {
                    if let Some(tag) = value.as_str() {
                        self.state = GameState::from(tag.to_string());
                    }
                }
                "players-init" | "nbp-init" => {}
                _ => {
                    self.extra.insert(key.clone(), value.clone());
                }
            }
        }
    }

    /// Whether the live player list has diverged from the insertion-time
    /// baseline (e.g. somebody left mid-session).
    pub fn players_drifted(&self) -> bool {
        self.players != self.players_init
    }

    /// Whether the live player-count token has diverged from the
    /// insertion-time baseline.
    pub fn nbp_drifted(&self) -> bool {
        self.nbp != self.nbp_init
    }
}

fn is_known_field(key: &str) -> bool {
    matches!(
        key,
        "players" | "name" | "nbp" | "state" | "players-init" | "nbp-init"
    )
}

/// Render a loosely-typed announcement value as a string. Peers send
/// numbers where strings are expected often enough that coercing beats
/// rejecting the whole announcement.
fn string_field(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn truncate_name(name: &str) -> String {
    name.chars().take(MAX_GAME_NAME_LEN).collect()
}

/// Accept only a non-empty JSON object as game data; everything else
/// (absent, null, empty object, string, array) is invalid input.
fn valid_mapping(raw: Option<&Value>) -> Option<&Map<String, Value>> {
    match raw {
        Some(Value::Object(map)) if !map.is_empty() => Some(map),
        _ => None,
    }
}

/// Bounded, insertion-ordered store of announced games, keyed by the
/// announcing peer's jid.
///
/// All mutating operations report failure as a boolean `false` with no
/// partial mutation - malformed input from the network must never surface
/// as an error or panic. Capacity pressure is resolved silently by FIFO
/// eviction.
#[derive(Debug)]
pub struct GameRegistry {
    games: HashMap<PlayerJid, GameRecord>,
    /// Insertion order, oldest first. Re-announcement moves a jid to the
    /// back; eviction always pops the front.
    order: VecDeque<PlayerJid>,
    capacity: usize,
}

impl GameRegistry {
    /// Create a registry with the default capacity bound.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a registry with an explicit capacity bound. Capacity is a
    /// fixed policy constant in production; this exists so tests can
    /// exercise eviction without thousands of inserts.
    pub fn with_capacity(capacity: usize) -> Self {
        GameRegistry {
            games: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Register a newly announced game under `jid`, replacing any prior
    /// record for that jid (re-announcement counts as a fresh insertion:
    /// the record moves to the back of the order and its `*_init` baseline
    /// is reset). Evicts the oldest record when over capacity.
    ///
    /// Returns `false` without mutating anything when `jid` is empty or
    /// `raw` is not a non-empty mapping.
    pub fn add_game(&mut self, jid: &PlayerJid, raw: Option<&Value>) -> bool {
        if jid.is_empty() {
            warn!("Ignoring game announcement without a sender jid");
            return false;
        }
        let Some(data) = valid_mapping(raw) else {
            warn!(
                "Ignoring game announcement with invalid data from {}",
                escape_log(jid.as_str())
            );
            return false;
        };

        let record = GameRecord::from_announcement(data);
        debug!(
            "Adding game \"{}\" ({}) from {}",
            escape_log(&record.name),
            record.state,
            escape_log(jid.as_str())
        );

        if self.games.insert(jid.clone(), record).is_some() {
            // Replacement: drop the stale order slot, the push below
            // re-inserts it at the back.
            self.order.retain(|known| known != jid);
        }
        self.order.push_back(jid.clone());

        while self.games.len() > self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.games.remove(&oldest);
                    debug!(
                        "Evicted oldest game announcement from {}",
                        escape_log(oldest.as_str())
                    );
                }
                None => break,
            }
        }

        true
    }

    /// Remove the game announced by `jid`. Returns `false` if there is no
    /// record for that jid.
    pub fn remove_game(&mut self, jid: &PlayerJid) -> bool {
        if self.games.remove(jid).is_none() {
            warn!(
                "Game for {} didn't exist",
                escape_log(jid.as_str())
            );
            return false;
        }
        self.order.retain(|known| known != jid);
        debug!("Removed game from {}", escape_log(jid.as_str()));
        true
    }

    /// Update the live fields of an existing game in place, leaving the
    /// `*_init` baseline untouched so drift stays measurable. Returns
    /// `false` for unknown jids or invalid data, with no mutation.
    pub fn update_game(&mut self, jid: &PlayerJid, raw: Option<&Value>) -> bool {
        let Some(data) = valid_mapping(raw) else {
            warn!(
                "Ignoring game update with invalid data from {}",
                escape_log(jid.as_str())
            );
            return false;
        };
        let Some(record) = self.games.get_mut(jid) else {
            warn!(
                "Game state change requested for unknown game from {}",
                escape_log(jid.as_str())
            );
            return false;
        };

        record.apply_update(data);
        debug!(
            "Game from {} is now in state {}",
            escape_log(jid.as_str()),
            record.state
        );
        true
    }

    /// Point-in-time snapshot of all announced games, in insertion order.
    /// The snapshot is an owned copy: later mutations never show through.
    pub fn get_all_games(&self) -> Vec<(PlayerJid, GameRecord)> {
        self.order
            .iter()
            .filter_map(|jid| self.games.get(jid).map(|game| (jid.clone(), game.clone())))
            .collect()
    }

    pub fn get(&self, jid: &PlayerJid) -> Option<&GameRecord> {
        self.games.get(jid)
    }

    pub fn contains(&self, jid: &PlayerJid) -> bool {
        self.games.contains_key(jid)
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

impl Default for GameRegistry {
    fn default() -> Self {
        Self::new()
    }
}
