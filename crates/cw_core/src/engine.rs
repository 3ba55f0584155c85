//! Authoritative game rules
//!
//! The engine owns the board, both teams and the round settings. It knows
//! nothing about peers: every mutation records a pending [`Invalidation`]
//! which the session layer drains and fans out to its connections.

use crate::card::Card;
use crate::deck::shuffle;
use crate::decks::DeckCatalog;
use crate::names::{random_id, random_player_name};
use crate::team::Teams;
use cw_common::{CodewordError, Group, PlayerProfile, Result, Role, TeamColor};
use cw_config::{Config, GameConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::time::Instant;

/// What remote peers need after a local mutation. `Full` dominates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Invalidation {
    Incremental,
    Full,
}

#[derive(Debug, Clone, Copy)]
struct HoldReveal {
    index: usize,
    started: Instant,
}

/// Result of sampling a hold-to-reveal in progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RevealSample {
    Holding { index: usize, progress: f64 },
    Revealed { index: usize },
}

/// Plain-data view of the game for a presentation layer
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub board: Vec<Card>,
    pub teams: Teams,
    pub first: TeamColor,
    pub turn: TeamColor,
    pub player: PlayerProfile,
    pub revealing: Option<usize>,
}

pub struct GameEngine {
    settings: GameConfig,
    catalog: DeckCatalog,
    player: PlayerProfile,
    board: Vec<Card>,
    teams: Teams,
    first: TeamColor,
    turn: TeamColor,
    hold: Option<HoldReveal>,
    pending: Option<Invalidation>,
    rng: StdRng,
}

impl GameEngine {
    /// Engine with OS-seeded randomness
    pub fn new(config: &Config) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Engine whose shuffles, first-team choice and generated names are reproducible
    pub fn with_seed(config: &Config, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &Config, mut rng: StdRng) -> Self {
        let catalog = DeckCatalog::from_config(config);
        let name = if config.player.name.trim().is_empty() {
            random_player_name(&catalog, &mut rng)
        } else {
            config.player.name.clone()
        };

        let player = PlayerProfile {
            id: random_id(&mut rng, 10),
            name,
            team: config.player.team,
            role: config.player.role,
        };

        let mut teams = Teams::default();
        teams.seat_player(player.clone());

        Self {
            settings: config.game.clone(),
            catalog,
            player,
            board: Vec::new(),
            teams,
            first: TeamColor::Red,
            turn: TeamColor::Red,
            hold: None,
            pending: None,
            rng,
        }
    }

    pub fn board(&self) -> &[Card] {
        &self.board
    }

    pub fn teams(&self) -> &Teams {
        &self.teams
    }

    pub fn first(&self) -> TeamColor {
        self.first
    }

    pub fn turn(&self) -> TeamColor {
        self.turn
    }

    pub fn player(&self) -> &PlayerProfile {
        &self.player
    }

    pub fn settings(&self) -> &GameConfig {
        &self.settings
    }

    /// Deck selection and agent counts take effect on the next `new_game`
    pub fn settings_mut(&mut self) -> &mut GameConfig {
        &mut self.settings
    }

    pub fn catalog(&self) -> &DeckCatalog {
        &self.catalog
    }

    /// Index of the card currently being held, if any
    pub fn reveal_in_progress(&self) -> Option<usize> {
        self.hold.map(|h| h.index)
    }

    pub fn winner(&self) -> Option<TeamColor> {
        self.teams.winner()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            board: self.board.clone(),
            teams: self.teams.clone(),
            first: self.first,
            turn: self.turn,
            player: self.player.clone(),
            revealing: self.reveal_in_progress(),
        }
    }

    /// Start fresh with a newly dealt board.
    ///
    /// Fails with `InsufficientCards` when the selected decks cannot cover
    /// the configured agents; the current round is then left as it was.
    pub fn new_game(&mut self) -> Result<()> {
        let mut deck = self
            .catalog
            .build_composite(&self.settings.decks, &mut self.rng);

        let first = if self.rng.gen_bool(0.5) {
            TeamColor::Red
        } else {
            TeamColor::Blue
        };

        let mut teams = self.teams.clone();
        teams.red.reset();
        teams.blue.reset();

        let mut board = Vec::with_capacity(self.settings.board_size(first));
        for agent in &self.settings.agents {
            let mut count = agent.count;
            // The opening team gets one extra card
            if agent.group == first.group() {
                count += 1;
            }

            if let Some(color) = agent.group.team() {
                teams.get_mut(color).cards_total = count;
            }

            board.extend(deck.draw(count)?.map(|name| Card::new(name, agent.group)));
        }

        shuffle(&mut board, &mut self.rng);

        if self.player.is_spy() {
            self.player.role = Role::Player;
            teams.seat_player(self.player.clone());
        }

        self.board = board;
        self.teams = teams;
        self.first = first;
        self.turn = first;
        self.hold = None;

        self.recompute_team_state();
        self.invalidate(Invalidation::Full);
        self.refresh_classes();

        tracing::info!(
            "New game from '{}': {} cards, {} goes first",
            deck.name(),
            self.board.len(),
            first
        );
        Ok(())
    }

    /// Begin holding a card. Returns `false` when the hold is not allowed:
    /// spymasters cannot reveal, revealed cards stay revealed and only one
    /// card can be held at a time.
    pub fn start_reveal(&mut self, index: usize, now: Instant) -> Result<bool> {
        let card = self.card(index)?;
        if self.player.is_spy() || card.revealed || self.hold.is_some() {
            return Ok(false);
        }

        self.board[index].set_progress(0.0);
        self.hold = Some(HoldReveal {
            index,
            started: now,
        });
        tracing::debug!("Holding card {} ({})", index, self.board[index].name);
        Ok(true)
    }

    /// Advance the held card's progress. Commits the reveal once progress
    /// reaches 1.0; the hold ends at that point.
    pub fn sample_reveal(&mut self, now: Instant) -> Option<RevealSample> {
        let hold = self.hold?;
        let reveal_time = self.settings.reveal_time().as_secs_f64();
        let elapsed = now.saturating_duration_since(hold.started).as_secs_f64();

        let progress = if reveal_time > 0.0 {
            (elapsed / reveal_time).clamp(0.0, 1.0)
        } else {
            1.0
        };

        if progress < 1.0 {
            self.board[hold.index].set_progress(progress);
            return Some(RevealSample::Holding {
                index: hold.index,
                progress,
            });
        }

        self.hold = None;
        match self.commit_reveal(hold.index) {
            Ok(_) => Some(RevealSample::Revealed { index: hold.index }),
            Err(e) => {
                tracing::warn!("Dropping hold on card {}: {}", hold.index, e);
                None
            }
        }
    }

    /// Let go of the held card without revealing it
    pub fn stop_reveal(&mut self) -> bool {
        match self.hold.take() {
            Some(hold) => {
                if let Some(card) = self.board.get_mut(hold.index) {
                    card.set_progress(0.0);
                }
                true
            }
            None => false,
        }
    }

    /// Reveal a card and score it.
    ///
    /// The assassin hands the win to the team *not* holding the turn and
    /// scores nothing. Returns `false` if the card was already revealed.
    pub fn commit_reveal(&mut self, index: usize) -> Result<bool> {
        let viewer_is_spy = self.player.is_spy();
        let len = self.board.len();
        let card = self
            .board
            .get_mut(index)
            .ok_or(CodewordError::CardOutOfRange { index, len })?;

        if card.revealed {
            return Ok(false);
        }

        card.set_revealed(true, viewer_is_spy);
        let group = card.group;
        let name = card.name.clone();

        if self.hold.is_some_and(|h| h.index == index) {
            self.hold = None;
        }

        match group {
            Group::Assassin => {
                let winners = self.turn.other();
                self.teams.get_mut(winners).wins = true;
                tracing::info!("Assassin '{}' revealed on {}'s turn, {} wins", name, self.turn, winners);
            }
            other => {
                if let Some(color) = other.team() {
                    self.teams.get_mut(color).score();
                }
                tracing::info!("Revealed '{}' ({})", name, other);
            }
        }

        self.recompute_team_state();
        self.invalidate(Invalidation::Incremental);
        Ok(true)
    }

    /// Refresh team labels and win flags
    pub fn recompute_team_state(&mut self) {
        self.teams.refresh();
    }

    /// Save the local player's profile and seat them on their team
    pub fn save_profile(&mut self, name: impl Into<String>, team: TeamColor, role: Role) {
        self.player.name = name.into();
        self.player.team = team;
        self.player.role = role;

        if self.player.is_spy() {
            self.stop_reveal();
        }

        self.teams.seat_player(self.player.clone());
        self.recompute_team_state();
        self.refresh_classes();
        self.invalidate(Invalidation::Incremental);
    }

    /// Hand the turn to the other team
    pub fn end_turn(&mut self) {
        self.turn = self.turn.other();
        tracing::info!("{}'s turn", self.turn);
        self.invalidate(Invalidation::Incremental);
    }

    /// Show every card locally, without scoring
    pub fn reveal_all(&mut self) {
        let viewer_is_spy = self.player.is_spy();
        self.hold = None;
        for card in &mut self.board {
            card.set_revealed(true, viewer_is_spy);
        }
    }

    /// Recompute every card's classification for the local viewer
    pub fn refresh_classes(&mut self) {
        let viewer_is_spy = self.player.is_spy();
        for card in &mut self.board {
            card.refresh_class(viewer_is_spy);
        }
    }

    /// Replace the board and teams wholesale with state from the host
    pub fn replace_state(&mut self, board: Vec<Card>, teams: Teams, first: TeamColor, turn: TeamColor) {
        self.board = board;
        self.teams = teams;
        self.first = first;
        self.turn = turn;
        self.hold = None;

        self.recompute_team_state();
        self.refresh_classes();
    }

    /// Apply a reveal reported by a peer.
    ///
    /// With `scoring` the reveal counts exactly like a local commit. Without
    /// it only the card flips; the sender's team totals arrive separately.
    /// Returns `true` if the card was newly revealed.
    pub fn apply_remote_reveal(&mut self, index: usize, scoring: bool) -> Result<bool> {
        if scoring {
            return self.commit_reveal(index);
        }

        let viewer_is_spy = self.player.is_spy();
        let len = self.board.len();
        let card = self
            .board
            .get_mut(index)
            .ok_or(CodewordError::CardOutOfRange { index, len })?;

        if card.revealed {
            return Ok(false);
        }
        card.set_revealed(true, viewer_is_spy);

        if self.hold.is_some_and(|h| h.index == index) {
            self.hold = None;
        }
        Ok(true)
    }

    /// Take team state from the host as-is
    pub fn overwrite_teams(&mut self, teams: Teams) {
        self.teams = teams;
        self.recompute_team_state();
    }

    /// Adopt roster entries reported by a peer; scores are left alone.
    /// The local player's own entry is never taken from a peer.
    pub fn merge_rosters(&mut self, incoming: &Teams) -> bool {
        let mut changed = false;
        for (color, team) in incoming.iter() {
            for (id, profile) in &team.players {
                if *id == self.player.id {
                    continue;
                }
                let mut seated = profile.clone();
                seated.team = color;
                if self.teams.get(color).players.get(id) != Some(&seated) {
                    self.teams.seat_player(seated);
                    changed = true;
                }
            }
        }

        if changed {
            self.invalidate(Invalidation::Incremental);
        }
        changed
    }

    /// Put the local player back on their roster if state from a peer
    /// dropped or changed their entry. Returns `true` if a seat was taken.
    pub fn ensure_seated(&mut self) -> bool {
        if self.teams.get(self.player.team).players.get(&self.player.id) == Some(&self.player) {
            return false;
        }
        self.teams.seat_player(self.player.clone());
        self.invalidate(Invalidation::Incremental);
        true
    }

    /// Returns `true` if the turn actually changed
    pub fn set_turn(&mut self, turn: TeamColor) -> bool {
        let changed = self.turn != turn;
        self.turn = turn;
        changed
    }

    pub fn set_first(&mut self, first: TeamColor) {
        self.first = first;
    }

    pub fn invalidate(&mut self, kind: Invalidation) {
        self.pending = Some(self.pending.map_or(kind, |p| p.max(kind)));
    }

    /// Drain the invalidation recorded since the last call
    pub fn take_invalidation(&mut self) -> Option<Invalidation> {
        self.pending.take()
    }

    fn card(&self, index: usize) -> Result<&Card> {
        self.board.get(index).ok_or(CodewordError::CardOutOfRange {
            index,
            len: self.board.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cw_config::AgentCount;
    use std::time::Duration;

    fn engine(seed: u64) -> GameEngine {
        let mut config = Config::default();
        config.player.name = "Tester".to_string();
        GameEngine::with_seed(&config, seed)
    }

    /// Find the first unrevealed card of a group
    fn find(engine: &GameEngine, group: Group) -> usize {
        engine
            .board()
            .iter()
            .position(|c| c.group == group && !c.revealed)
            .unwrap()
    }

    #[test]
    fn test_new_game_deals_default_board() {
        let mut engine = engine(1);
        engine.new_game().unwrap();

        let first = engine.first();
        assert_eq!(engine.turn(), first);
        assert_eq!(engine.board().len(), 25);
        assert_eq!(engine.teams().get(first).cards_total, 9);
        assert_eq!(engine.teams().get(first.other()).cards_total, 8);

        let count = |g| engine.board().iter().filter(|c| c.group == g).count();
        assert_eq!(count(first.group()), 9);
        assert_eq!(count(Group::Bystander), 7);
        assert_eq!(count(Group::Assassin), 1);
        assert_eq!(engine.take_invalidation(), Some(Invalidation::Full));
    }

    #[test]
    fn test_same_seed_same_board() {
        let mut a = engine(77);
        let mut b = engine(77);
        a.new_game().unwrap();
        b.new_game().unwrap();
        assert_eq!(a.board(), b.board());
        assert_eq!(a.first(), b.first());
    }

    #[test]
    fn test_board_is_not_clustered() {
        let mut engine = engine(5);
        engine.new_game().unwrap();
        let groups: Vec<Group> = engine.board().iter().map(|c| c.group).collect();
        let mut sorted = groups.clone();
        sorted.sort();
        assert_ne!(groups, sorted);
    }

    #[test]
    fn test_insufficient_cards_keeps_previous_round() {
        let mut engine = engine(2);
        engine.new_game().unwrap();
        let before = engine.board().to_vec();

        engine.settings_mut().agents = vec![AgentCount::new(Group::Bystander, 10_000)];
        let err = engine.new_game().unwrap_err();
        assert!(matches!(err, CodewordError::InsufficientCards { .. }));
        assert_eq!(engine.board(), before.as_slice());
    }

    #[test]
    fn test_commit_scores_matching_team() {
        let mut engine = engine(3);
        engine.new_game().unwrap();
        engine.take_invalidation();

        let index = find(&engine, Group::Red);
        assert!(engine.commit_reveal(index).unwrap());
        assert_eq!(engine.teams().red.cards_found, 1);
        assert_eq!(engine.teams().blue.cards_found, 0);
        assert_eq!(engine.take_invalidation(), Some(Invalidation::Incremental));

        // Second commit of the same card is a no-op
        assert!(!engine.commit_reveal(index).unwrap());
        assert_eq!(engine.teams().red.cards_found, 1);
    }

    #[test]
    fn test_assassin_hands_win_to_other_team() {
        let mut engine = engine(4);
        engine.new_game().unwrap();
        let turn = engine.turn();

        let index = find(&engine, Group::Assassin);
        engine.commit_reveal(index).unwrap();

        assert!(engine.teams().get(turn.other()).wins);
        assert!(!engine.teams().get(turn).wins);
        assert_eq!(engine.teams().red.cards_found, 0);
        assert_eq!(engine.teams().blue.cards_found, 0);
        assert_eq!(engine.winner(), Some(turn.other()));
    }

    #[test]
    fn test_finding_every_card_wins() {
        let mut engine = engine(6);
        engine.new_game().unwrap();

        while let Some(index) = engine
            .board()
            .iter()
            .position(|c| c.group == Group::Blue && !c.revealed)
        {
            engine.commit_reveal(index).unwrap();
        }

        let blue = &engine.teams().blue;
        assert_eq!(blue.cards_found, blue.cards_total);
        assert!(blue.wins);
        assert_eq!(blue.label, "Blue WINS");
    }

    #[test]
    fn test_hold_progress_then_commit_once() {
        let mut engine = engine(8);
        engine.new_game().unwrap();
        let index = find(&engine, Group::Bystander);
        let start = Instant::now();

        assert!(engine.start_reveal(index, start).unwrap());
        // Second hold is refused while one is running
        assert!(!engine.start_reveal(find(&engine, Group::Red), start).unwrap());

        let mut last = 0.0;
        for ms in [100, 200, 300, 400] {
            match engine.sample_reveal(start + Duration::from_millis(ms)) {
                Some(RevealSample::Holding { progress, .. }) => {
                    assert!(progress > last && progress < 1.0);
                    last = progress;
                }
                other => panic!("unexpected sample {:?}", other),
            }
        }

        assert_eq!(
            engine.sample_reveal(start + Duration::from_millis(900)),
            Some(RevealSample::Revealed { index })
        );
        assert!(engine.board()[index].revealed);
        assert_eq!(engine.board()[index].reveal_progress, 0.0);
        assert_eq!(engine.sample_reveal(start + Duration::from_secs(2)), None);
    }

    #[test]
    fn test_stop_reveal_resets_progress() {
        let mut engine = engine(9);
        engine.new_game().unwrap();
        let index = find(&engine, Group::Red);
        let start = Instant::now();

        engine.start_reveal(index, start).unwrap();
        engine.sample_reveal(start + Duration::from_millis(250));
        assert!(engine.board()[index].reveal_progress > 0.0);

        assert!(engine.stop_reveal());
        assert_eq!(engine.board()[index].reveal_progress, 0.0);
        assert!(!engine.board()[index].revealed);
        assert_eq!(engine.reveal_in_progress(), None);
    }

    #[test]
    fn test_spymaster_cannot_reveal() {
        let mut engine = engine(10);
        engine.new_game().unwrap();
        engine.save_profile("Spy", TeamColor::Blue, Role::Spymaster);

        let index = find(&engine, Group::Red);
        assert!(!engine.start_reveal(index, Instant::now()).unwrap());
        assert!(engine.board().iter().all(|c| c.revealed || c.visual_class.spy));

        // A new round demotes the spymaster
        engine.new_game().unwrap();
        assert_eq!(engine.player().role, Role::Player);
    }

    #[test]
    fn test_remote_reveal_without_scoring() {
        let mut engine = engine(11);
        engine.new_game().unwrap();
        engine.take_invalidation();

        let index = find(&engine, Group::Red);
        assert!(engine.apply_remote_reveal(index, false).unwrap());
        assert!(!engine.apply_remote_reveal(index, false).unwrap());
        assert_eq!(engine.teams().red.cards_found, 0);
        assert_eq!(engine.take_invalidation(), None);

        assert!(engine.apply_remote_reveal(99, false).is_err());
    }

    #[test]
    fn test_merge_rosters_skips_local_player() {
        let mut engine = engine(12);
        let mut incoming = Teams::default();
        incoming
            .blue
            .players
            .insert("peer".to_string(), PlayerProfile::new("peer", "Remote", TeamColor::Red));
        let mut me = engine.player().clone();
        me.name = "Impostor".to_string();
        incoming.red.players.insert(me.id.clone(), me);

        assert!(engine.merge_rosters(&incoming));
        assert_eq!(engine.teams().blue.players["peer"].team, TeamColor::Blue);
        assert_eq!(engine.teams().red.players[&engine.player().id].name, "Tester");
        assert!(!engine.merge_rosters(&incoming));
    }

    #[test]
    fn test_end_turn_alternates() {
        let mut engine = engine(13);
        engine.new_game().unwrap();
        let first = engine.first();
        engine.end_turn();
        assert_eq!(engine.turn(), first.other());
        engine.end_turn();
        assert_eq!(engine.turn(), first);
    }

    #[test]
    fn test_ensure_seated_after_overwrite() {
        let mut engine = engine(14);
        assert!(!engine.ensure_seated());

        engine.overwrite_teams(Teams::default());
        assert!(engine.ensure_seated());
        assert_eq!(engine.take_invalidation(), Some(Invalidation::Incremental));
        assert!(engine.teams().red.players.contains_key(&engine.player().id));
        assert!(!engine.ensure_seated());
    }
}
