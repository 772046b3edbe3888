//! Behavior tests for the game registry: validated insertion, removal,
//! updates, truncation, ordering and FIFO eviction.

use lobbybot::lobby::games::{
    GameRegistry, GameState, PlayerJid, DEFAULT_CAPACITY, MAX_GAME_NAME_LEN,
};
use serde_json::{json, Value};

fn game_data() -> Value {
    json!({
        "players": ["player1", "player2"],
        "name": "game",
        "nbp": "foo",
        "state": "init",
    })
}

#[test]
fn add_populates_record_and_init_snapshot() {
    let mut games = GameRegistry::new();
    let jid = PlayerJid::from("player1@domain.tld");

    assert!(games.add_game(&jid, Some(&game_data())));

    let all = games.get_all_games();
    assert_eq!(all.len(), 1);
    let (owner, record) = &all[0];
    assert_eq!(owner, &jid);
    assert_eq!(record.players, vec!["player1", "player2"]);
    assert_eq!(record.name, "game");
    assert_eq!(record.nbp, "foo");
    assert_eq!(record.state, GameState::Init);
    assert_eq!(record.players_init, vec!["player1", "player2"]);
    assert_eq!(record.nbp_init, "foo");
}

#[test]
fn add_with_invalid_input_is_rejected_without_mutation() {
    let cases: Vec<(&str, Option<Value>)> = vec![
        ("", Some(game_data())),
        ("player1@domain.tld", Some(json!({}))),
        ("player1@domain.tld", None),
        ("player1@domain.tld", Some(Value::Null)),
        ("player1@domain.tld", Some(json!(""))),
        ("player1@domain.tld", Some(json!(["players"]))),
    ];

    let mut games = GameRegistry::new();
    for (jid, data) in cases {
        let jid = PlayerJid::from(jid);
        assert!(
            !games.add_game(&jid, data.as_ref()),
            "add_game should reject jid={jid:?} data={data:?}"
        );
        assert!(games.is_empty());
    }
}

#[test]
fn failed_adds_are_idempotent() {
    let mut games = GameRegistry::new();
    let jid = PlayerJid::from("player1@domain.tld");
    assert!(games.add_game(&jid, Some(&game_data())));
    let before = games.get_all_games();

    for _ in 0..10 {
        assert!(!games.add_game(&PlayerJid::from(""), Some(&game_data())));
        assert!(!games.add_game(&jid, Some(&json!({}))));
    }

    assert_eq!(games.get_all_games(), before);
}

#[test]
fn long_game_names_are_truncated() {
    let mut games = GameRegistry::new();
    let jid = PlayerJid::from("player1@domain.tld");
    let data = json!({
        "players": ["player1", "player2"],
        "name": "a".repeat(300),
        "nbp": "foo",
        "state": "init",
    });

    assert!(games.add_game(&jid, Some(&data)));

    let record = games.get(&jid).unwrap();
    assert_eq!(record.name.chars().count(), MAX_GAME_NAME_LEN);
    assert_eq!(record.name, "a".repeat(256));
}

#[test]
fn multibyte_names_are_truncated_on_character_boundaries() {
    let mut games = GameRegistry::new();
    let jid = PlayerJid::from("player1@domain.tld");
    let data = json!({
        "players": ["player1"],
        "name": "ä".repeat(300),
        "nbp": "foo",
    });

    assert!(games.add_game(&jid, Some(&data)));
    assert_eq!(
        games.get(&jid).unwrap().name,
        "ä".repeat(MAX_GAME_NAME_LEN)
    );
}

#[test]
fn remove_deletes_only_the_requested_game() {
    let mut games = GameRegistry::new();
    let jid1 = PlayerJid::from("player1@domain.tld");
    let jid2 = PlayerJid::from("player3@domain.tld");
    let data2 = json!({
        "players": ["player3", "player4"],
        "name": "game2",
        "nbp": "bar",
        "state": "init",
    });

    assert!(games.add_game(&jid1, Some(&game_data())));
    assert!(games.add_game(&jid2, Some(&data2)));
    assert_eq!(games.len(), 2);

    assert!(games.remove_game(&jid1));
    let all = games.get_all_games();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].0, jid2);
    assert_eq!(all[0].1.name, "game2");

    assert!(games.remove_game(&jid2));
    assert!(games.get_all_games().is_empty());
}

#[test]
fn remove_unknown_game_is_a_clean_noop() {
    let mut games = GameRegistry::new();
    let jid = PlayerJid::from("player1@domain.tld");
    assert!(games.add_game(&jid, Some(&game_data())));

    assert!(!games.remove_game(&PlayerJid::from("foo@bar.tld")));
    assert_eq!(games.len(), 1);
    assert!(games.contains(&jid));
}

#[test]
fn snapshot_iterates_in_insertion_order() {
    let mut games = GameRegistry::new();
    for name in ["c@d.tld", "a@b.tld", "e@f.tld"] {
        assert!(games.add_game(&PlayerJid::from(name), Some(&game_data())));
    }

    let order: Vec<String> = games
        .get_all_games()
        .into_iter()
        .map(|(jid, _)| jid.to_string())
        .collect();
    assert_eq!(order, vec!["c@d.tld", "a@b.tld", "e@f.tld"]);
}

#[test]
fn reannouncement_moves_to_back_and_rebaselines() {
    let mut games = GameRegistry::new();
    let jid1 = PlayerJid::from("player1@domain.tld");
    let jid2 = PlayerJid::from("player2@domain.tld");
    assert!(games.add_game(&jid1, Some(&game_data())));
    assert!(games.add_game(&jid2, Some(&game_data())));

    let fresh = json!({
        "players": ["player1"],
        "name": "rehosted",
        "nbp": "1/4",
        "state": "waiting",
    });
    assert!(games.add_game(&jid1, Some(&fresh)));

    let all = games.get_all_games();
    assert_eq!(all.len(), 2);
    // Re-announcement counts as a fresh insertion: jid1 is now newest
    assert_eq!(all[0].0, jid2);
    assert_eq!(all[1].0, jid1);

    let record = &all[1].1;
    assert_eq!(record.name, "rehosted");
    assert_eq!(record.players_init, vec!["player1"]);
    assert_eq!(record.nbp_init, "1/4");
    assert_eq!(record.state, GameState::Waiting);
}

#[test]
fn capacity_overflow_evicts_the_oldest_record() {
    let capacity = 3;
    let mut games = GameRegistry::with_capacity(capacity);
    let jids: Vec<PlayerJid> = (0..capacity + 1)
        .map(|i| PlayerJid::new(format!("player{i}@domain.tld")))
        .collect();

    for jid in &jids {
        assert!(games.add_game(jid, Some(&game_data())));
    }

    assert_eq!(games.len(), capacity);
    assert!(!games.contains(&jids[0]), "oldest record should be evicted");
    for jid in &jids[1..] {
        assert!(games.contains(jid));
    }
}

#[test]
fn eviction_ignores_read_and_update_access() {
    let mut games = GameRegistry::with_capacity(2);
    let jid1 = PlayerJid::from("player1@domain.tld");
    let jid2 = PlayerJid::from("player2@domain.tld");
    assert!(games.add_game(&jid1, Some(&game_data())));
    assert!(games.add_game(&jid2, Some(&game_data())));

    // Touch the oldest record every way short of re-announcing it
    let _ = games.get(&jid1);
    let _ = games.get_all_games();
    assert!(games.update_game(&jid1, Some(&json!({"nbp": "2/2"}))));

    // A third insert still evicts jid1: eviction is insertion order only
    let jid3 = PlayerJid::from("player3@domain.tld");
    assert!(games.add_game(&jid3, Some(&game_data())));
    assert!(!games.contains(&jid1));
    assert!(games.contains(&jid2));
    assert!(games.contains(&jid3));
}

#[test]
fn default_capacity_is_generous() {
    assert!(DEFAULT_CAPACITY >= 1000);
}

#[test]
fn update_changes_live_fields_but_not_baseline() {
    let mut games = GameRegistry::new();
    let jid = PlayerJid::from("player1@domain.tld");
    assert!(games.add_game(&jid, Some(&game_data())));

    let update = json!({
        "players": ["player1"],
        "nbp": "1/2",
        "state": "running",
    });
    assert!(games.update_game(&jid, Some(&update)));

    let record = games.get(&jid).unwrap();
    assert_eq!(record.players, vec!["player1"]);
    assert_eq!(record.nbp, "1/2");
    assert_eq!(record.state, GameState::Running);
    assert_eq!(record.players_init, vec!["player1", "player2"]);
    assert_eq!(record.nbp_init, "foo");
    assert!(record.players_drifted());
    assert!(record.nbp_drifted());
}

#[test]
fn update_cannot_overwrite_the_init_baseline() {
    let mut games = GameRegistry::new();
    let jid = PlayerJid::from("player1@domain.tld");
    assert!(games.add_game(&jid, Some(&game_data())));

    let hostile = json!({
        "players-init": ["attacker"],
        "nbp-init": "evil",
        "state": "running",
    });
    assert!(games.update_game(&jid, Some(&hostile)));

    let record = games.get(&jid).unwrap();
    assert_eq!(record.players_init, vec!["player1", "player2"]);
    assert_eq!(record.nbp_init, "foo");
    assert_eq!(record.state, GameState::Running);
}

#[test]
fn update_rejects_unknown_jid_and_invalid_data() {
    let mut games = GameRegistry::new();
    let jid = PlayerJid::from("player1@domain.tld");
    assert!(games.add_game(&jid, Some(&game_data())));
    let before = games.get_all_games();

    assert!(!games.update_game(&PlayerJid::from("foo@bar.tld"), Some(&json!({"nbp": "2"}))));
    assert!(!games.update_game(&jid, None));
    assert!(!games.update_game(&jid, Some(&json!({}))));
    assert!(!games.update_game(&jid, Some(&json!("running"))));

    assert_eq!(games.get_all_games(), before);
}

#[test]
fn arbitrary_state_values_are_stored_verbatim() {
    // Trust boundary: peers control their own record's state tag, and the
    // registry does not judge transition legality.
    let mut games = GameRegistry::new();
    let jid = PlayerJid::from("player1@domain.tld");
    assert!(games.add_game(&jid, Some(&game_data())));

    assert!(games.update_game(&jid, Some(&json!({"state": "running"}))));
    assert!(games.update_game(&jid, Some(&json!({"state": "init"}))));
    assert!(games.update_game(&jid, Some(&json!({"state": "totally-made-up"}))));

    let record = games.get(&jid).unwrap();
    assert_eq!(record.state, GameState::Other("totally-made-up".to_string()));
    assert_eq!(record.state.as_str(), "totally-made-up");
}

#[test]
fn full_announce_then_withdraw_scenario() {
    let mut games = GameRegistry::new();
    let jid = PlayerJid::from("A@domain.tld");
    let data = json!({
        "players": ["p1", "p2"],
        "name": "g",
        "nbp": "1/2",
        "state": "init",
    });

    assert!(games.add_game(&jid, Some(&data)));

    let all = games.get_all_games();
    assert_eq!(all.len(), 1);
    let (owner, record) = &all[0];
    assert_eq!(owner.as_str(), "A@domain.tld");
    assert_eq!(record.players, vec!["p1", "p2"]);
    assert_eq!(record.name, "g");
    assert_eq!(record.nbp, "1/2");
    assert_eq!(record.state, GameState::Init);
    assert_eq!(record.players_init, vec!["p1", "p2"]);
    assert_eq!(record.nbp_init, "1/2");

    assert!(games.remove_game(&jid));
    assert!(games.get_all_games().is_empty());
}
