//! Team rosters and scores

use cw_common::{PlayerProfile, TeamColor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cards a team is assumed to need before the board is dealt
pub const BASELINE_CARDS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub name: String,
    pub players: BTreeMap<String, PlayerProfile>,
    pub label: String,
    /// Seconds spent on this team's turns
    #[serde(default)]
    pub time_taken: u64,
    pub cards_found: usize,
    pub cards_total: usize,
    pub wins: bool,
}

impl Team {
    pub fn new(name: impl Into<String>) -> Self {
        let mut team = Self {
            name: name.into(),
            players: BTreeMap::new(),
            label: String::new(),
            time_taken: 0,
            cards_found: 0,
            cards_total: BASELINE_CARDS,
            wins: false,
        };
        team.refresh();
        team
    }

    /// Scores back to the start of a round; the roster is kept
    pub fn reset(&mut self) {
        self.cards_found = 0;
        self.cards_total = BASELINE_CARDS;
        self.wins = false;
    }

    /// Count one found card, never past the total
    pub fn score(&mut self) {
        self.cards_found = (self.cards_found + 1).min(self.cards_total);
    }

    /// Recompute label and win state. Safe to call any number of times.
    pub fn refresh(&mut self) {
        self.label = format!("{} - {}/{}", self.name, self.cards_found, self.cards_total);

        if self.wins || self.cards_found == self.cards_total {
            self.label = format!("{} WINS", self.name);
            self.wins = true;
        }
    }
}

/// The two competing teams
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teams {
    pub red: Team,
    pub blue: Team,
}

impl Default for Teams {
    fn default() -> Self {
        Self {
            red: Team::new("Red"),
            blue: Team::new("Blue"),
        }
    }
}

impl Teams {
    pub fn get(&self, color: TeamColor) -> &Team {
        match color {
            TeamColor::Red => &self.red,
            TeamColor::Blue => &self.blue,
        }
    }

    pub fn get_mut(&mut self, color: TeamColor) -> &mut Team {
        match color {
            TeamColor::Red => &mut self.red,
            TeamColor::Blue => &mut self.blue,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (TeamColor, &Team)> {
        [(TeamColor::Red, &self.red), (TeamColor::Blue, &self.blue)].into_iter()
    }

    pub fn refresh(&mut self) {
        self.red.refresh();
        self.blue.refresh();
    }

    /// Drop a player from both rosters
    pub fn remove_player(&mut self, player_id: &str) {
        self.red.players.remove(player_id);
        self.blue.players.remove(player_id);
    }

    /// Put a player on exactly one roster
    pub fn seat_player(&mut self, profile: PlayerProfile) {
        self.remove_player(&profile.id);
        self.get_mut(profile.team)
            .players
            .insert(profile.id.clone(), profile);
    }

    /// The team that has won, if any
    pub fn winner(&self) -> Option<TeamColor> {
        self.iter().find(|(_, team)| team.wins).map(|(color, _)| color)
    }
}
