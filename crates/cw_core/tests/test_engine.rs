use cw_common::{Group, Role, TeamColor};
use cw_config::{AgentCount, Config};
use cw_core::{GameEngine, Invalidation, RevealSample};
use cw_test_helpers::prelude::*;
use std::time::{Duration, Instant};

#[test]
fn test_board_size_follows_agent_counts() {
    for seed in 0..10 {
        let mut engine = GameEngine::with_seed(&Config::default(), seed);
        engine.new_game().unwrap();

        let first = engine.first();
        assert_eq!(engine.board().len(), 25);
        assert_eq!(engine.teams().get(first).cards_total, 9);
        assert_eq!(engine.teams().get(first.other()).cards_total, 8);
    }
}

#[test]
fn test_small_board_from_workspace_config() {
    let workspace = workspace_with_config(SMALL_BOARD_TOML);
    let config = Config::load(workspace.path()).unwrap();

    let mut engine = GameEngine::with_seed(&config, 21);
    engine.new_game().unwrap();

    assert_eq!(engine.board().len(), config.game.board_size(engine.first()));
    assert_eq!(engine.board().len(), 6);
    assert_eq!(engine.player().name, "Fixture");
}

#[test]
fn test_team_without_agents_keeps_baseline_total() {
    let mut config = Config::default();
    config.game.agents = vec![
        AgentCount::new(Group::Red, 3),
        AgentCount::new(Group::Bystander, 2),
    ];

    let mut engine = GameEngine::with_seed(&config, 4);
    engine.new_game().unwrap();

    assert_eq!(engine.teams().blue.cards_total, 8);
    let expected = 5 + usize::from(engine.first() == TeamColor::Red);
    assert_eq!(engine.board().len(), expected);
}

#[test]
fn test_unknown_decks_fall_back_to_default() {
    let mut config = Config::default();
    config.game.decks = vec!["Does Not Exist".to_string()];

    let mut engine = GameEngine::with_seed(&config, 4);
    engine.new_game().unwrap();
    assert_eq!(engine.board().len(), 25);
}

#[test]
fn test_full_round_with_hold_reveals() {
    let config = small_board_config("Holder", TeamColor::Red);
    let mut engine = GameEngine::with_seed(&config, 30);
    engine.new_game().unwrap();
    assert_eq!(engine.take_invalidation(), Some(Invalidation::Full));

    let reds: Vec<usize> = engine
        .board()
        .iter()
        .enumerate()
        .filter(|(_, c)| c.group == Group::Red)
        .map(|(i, _)| i)
        .collect();

    let mut clock = Instant::now();
    for index in reds {
        assert!(engine.start_reveal(index, clock).unwrap());
        clock += Duration::from_millis(60);
        assert_eq!(
            engine.sample_reveal(clock),
            Some(RevealSample::Revealed { index })
        );
        assert_eq!(engine.take_invalidation(), Some(Invalidation::Incremental));
    }

    let red = &engine.teams().red;
    assert!(red.wins);
    assert_eq!(red.label, "Red WINS");
    assert_eq!(engine.winner(), Some(TeamColor::Red));
}

#[test]
fn test_snapshot_is_plain_data() {
    let mut engine = GameEngine::with_seed(&fast_config("Snap", TeamColor::Blue), 2);
    engine.new_game().unwrap();
    engine.save_profile("Snap", TeamColor::Blue, Role::Chooser);

    let snapshot = engine.snapshot();
    let json = serde_json::to_value(&snapshot).unwrap();

    assert_eq!(json["board"].as_array().unwrap().len(), 25);
    assert_eq!(json["player"]["role"], "chooser");
    assert!(json["teams"]["blue"]["players"]
        .as_object()
        .unwrap()
        .contains_key(&snapshot.player.id));
    assert!(json["board"][0]["visualClass"]["blank"].as_bool().unwrap());
}

#[test]
fn test_reveal_all_shows_board_without_scoring() {
    let mut engine = GameEngine::with_seed(&small_board_config("Show", TeamColor::Red), 4);
    engine.new_game().unwrap();
    let clock = Instant::now();
    assert!(engine.start_reveal(0, clock).unwrap());

    engine.reveal_all();

    assert!(engine.board().iter().all(|card| card.revealed));
    assert!(engine.board().iter().all(|card| card.visual_class.group.is_some()));
    assert_eq!(engine.reveal_in_progress(), None);
    assert_eq!(engine.teams().red.cards_found, 0);
    assert_eq!(engine.teams().blue.cards_found, 0);
    assert_eq!(engine.winner(), None);
}
