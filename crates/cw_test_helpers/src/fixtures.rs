//! Ready-made configurations
//!
//! Session tests use millisecond timers so that joins, flushes and holds
//! settle quickly under real time.

use cw_common::{Group, TeamColor};
use cw_config::{AgentCount, Config};

/// A five-card board: 2 red, 1 blue, 1 bystander, 1 assassin (+1 for first)
pub const SMALL_BOARD_TOML: &str = r#"
[game]
reveal_time_sec = 0.05
decks = ["Classic"]

[[game.agents]]
group = "red"
count = 2

[[game.agents]]
group = "blue"
count = 1

[[game.agents]]
group = "bystanders"
count = 1

[[game.agents]]
group = "assassin"
count = 1

[player]
name = "Fixture"
team = "red"
"#;

/// Default rules with fast timers and a fixed player name
pub fn fast_config(player: &str, team: TeamColor) -> Config {
    let mut config = Config::default();
    config.player.name = player.to_string();
    config.player.team = team;
    config.game.reveal_time_sec = 0.05;
    config.network.flush_interval_ms = 10;
    config.network.join_backoff_ms = 20;
    config.network.reveal_sample_ms = 5;
    config
}

/// Same as [`fast_config`] with the board from [`SMALL_BOARD_TOML`]
pub fn small_board_config(player: &str, team: TeamColor) -> Config {
    let mut config = fast_config(player, team);
    config.game.agents = vec![
        AgentCount::new(Group::Red, 2),
        AgentCount::new(Group::Blue, 1),
        AgentCount::new(Group::Bystander, 1),
        AgentCount::new(Group::Assassin, 1),
    ];
    config
}
