//! Engine state to and from wire messages
//!
//! The host's state wins every conflict. A client replaces its board with
//! each full message and takes teams from every message; the host only
//! takes reveals, roster entries and the turn from its clients.

use crate::protocol::{CardDelta, CardFull, SyncKind, SyncMessage};
use crate::registry::ConnectionEntry;
use crate::{Result, SyncError};
use cw_common::TeamColor;
use cw_core::{GameEngine, Invalidation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerRole {
    Host,
    Client,
}

/// What applying one inbound message changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// `false` when the message was ignored for this role
    pub applied: bool,
    /// Board indices that became revealed
    pub revealed: Vec<usize>,
    /// New turn, if it changed
    pub turn_changed: Option<TeamColor>,
}

#[derive(Debug, Clone, Copy)]
pub struct StateSynchronizer {
    role: PeerRole,
}

impl StateSynchronizer {
    pub fn new(role: PeerRole) -> Self {
        Self { role }
    }

    pub fn role(&self) -> PeerRole {
        self.role
    }

    pub fn is_host(&self) -> bool {
        self.role == PeerRole::Host
    }

    pub fn full_message(engine: &GameEngine) -> SyncMessage {
        SyncMessage::Full {
            cards: engine.board().iter().map(CardFull::from).collect(),
            teams: engine.teams().clone(),
            first: engine.first(),
            turn: engine.turn(),
        }
    }

    pub fn delta_message(engine: &GameEngine) -> SyncMessage {
        SyncMessage::Delta {
            cards: engine
                .board()
                .iter()
                .map(|card| CardDelta {
                    revealed: card.revealed,
                })
                .collect(),
            teams: engine.teams().clone(),
            first: engine.first(),
            turn: engine.turn(),
        }
    }

    /// Full if the connection was flagged for it, otherwise a delta
    pub fn message_for(entry: &ConnectionEntry, engine: &GameEngine) -> SyncMessage {
        if entry.needs_full_sync {
            Self::full_message(engine)
        } else {
            Self::delta_message(engine)
        }
    }

    /// Send the connection what it needs and clear its flags. On failure
    /// the flags stay set.
    pub fn push(entry: &mut ConnectionEntry, engine: &GameEngine) -> Result<SyncKind> {
        let message = Self::message_for(entry, engine);
        entry.link().send(&message)?;
        entry.mark_pushed();

        tracing::trace!("Pushed {:?} to {}", message.kind(), entry.peer());
        Ok(message.kind())
    }

    /// Apply an inbound message. Nothing is applied when it is rejected.
    pub fn apply(&self, engine: &mut GameEngine, message: SyncMessage) -> Result<ApplyOutcome> {
        match message {
            SyncMessage::Full { .. } if self.is_host() => {
                tracing::debug!("Host ignores full sync from a client");
                Ok(ApplyOutcome::default())
            }
            SyncMessage::Full {
                cards,
                teams,
                first,
                turn,
            } => {
                let previous = engine.turn();
                let board = cards.into_iter().map(CardFull::into_card).collect();
                engine.replace_state(board, teams, first, turn);
                engine.ensure_seated();

                Ok(ApplyOutcome {
                    applied: true,
                    revealed: Vec::new(),
                    turn_changed: (previous != turn).then_some(turn),
                })
            }
            SyncMessage::Delta {
                cards,
                teams,
                first,
                turn,
            } => {
                if cards.len() != engine.board().len() {
                    return Err(SyncError::MalformedSyncMessage(format!(
                        "delta has {} cards, board has {}",
                        cards.len(),
                        engine.board().len()
                    )));
                }

                let mut revealed = Vec::new();
                for (index, card) in cards.iter().enumerate() {
                    // Reveals are monotonic, a false flag never hides a card
                    if card.revealed && engine.apply_remote_reveal(index, self.is_host())? {
                        revealed.push(index);
                    }
                }

                let turn_changed = engine.set_turn(turn).then_some(turn);
                if self.is_host() {
                    engine.merge_rosters(&teams);
                    if turn_changed.is_some() {
                        engine.invalidate(Invalidation::Incremental);
                    }
                } else {
                    engine.overwrite_teams(teams);
                    engine.set_first(first);
                    engine.refresh_classes();
                    engine.ensure_seated();
                }

                Ok(ApplyOutcome {
                    applied: true,
                    revealed,
                    turn_changed,
                })
            }
        }
    }

    /// Host side of a message from a peer that has not been sent the
    /// current board yet. Its reveals and turn refer to a board the host
    /// no longer has, so only roster entries are taken.
    pub fn apply_unsynced(&self, engine: &mut GameEngine, message: SyncMessage) -> ApplyOutcome {
        match message {
            SyncMessage::Delta { teams, .. } if self.is_host() => ApplyOutcome {
                applied: engine.merge_rosters(&teams),
                ..ApplyOutcome::default()
            },
            _ => ApplyOutcome::default(),
        }
    }
}
