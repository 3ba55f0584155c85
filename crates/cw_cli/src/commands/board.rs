//! Plain-text board rendering

use cw_core::{Card, GameSnapshot};
use std::fmt::Write;

const COLUMNS: usize = 5;

/// How one card reads to the local viewer
pub fn card_cell(index: usize, card: &Card) -> String {
    let class = card.visual_class;
    let tag = match class.group {
        Some(group) if class.spy => format!("({})", group.as_str()),
        Some(group) => group.as_str().to_uppercase(),
        None if card.reveal_progress > 0.0 => format!("{:>3.0}%", card.reveal_progress * 100.0),
        None => String::new(),
    };
    format!("{:>2} {:<14}{:<12}", index, card.name, tag)
}

pub fn render(snapshot: &GameSnapshot) -> String {
    let mut out = String::new();

    for row in snapshot.board.chunks(COLUMNS).enumerate() {
        let (row_index, cards) = row;
        let line: Vec<String> = cards
            .iter()
            .enumerate()
            .map(|(col, card)| card_cell(row_index * COLUMNS + col, card))
            .collect();
        let _ = writeln!(out, "{}", line.join(" ").trim_end());
    }

    let _ = writeln!(out);
    for team in [&snapshot.teams.red, &snapshot.teams.blue] {
        let players: Vec<&str> = team.players.values().map(|p| p.name.as_str()).collect();
        let _ = writeln!(out, "{}  [{}]", team.label, players.join(", "));
    }
    let _ = writeln!(
        out,
        "Turn: {}   First: {}   You: {} ({}, {})",
        snapshot.turn, snapshot.first, snapshot.player.name, snapshot.player.team, snapshot.player.role
    );
    out
}
