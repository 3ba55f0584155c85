//! Sync protocol message types

use cw_common::{Group, TeamColor};
use cw_core::{Card, CardClass, Teams};
use serde::{Deserialize, Serialize};

/// A card as carried by a full sync
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardFull {
    pub name: String,
    pub group: Group,
    pub revealed: bool,
    /// Sender's presentation flags; receivers recompute their own
    #[serde(rename = "className", default)]
    pub class_name: CardClass,
}

impl From<&Card> for CardFull {
    fn from(card: &Card) -> Self {
        Self {
            name: card.name.clone(),
            group: card.group,
            revealed: card.revealed,
            class_name: card.visual_class,
        }
    }
}

impl CardFull {
    /// Rebuild a local card from name and group. The class is derived again
    /// by the engine for the local viewer.
    pub fn into_card(self) -> Card {
        let mut card = Card::new(self.name, self.group);
        card.revealed = self.revealed;
        card
    }
}

/// A card as carried by an incremental sync
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDelta {
    pub revealed: bool,
}

/// Which message a connection receives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncKind {
    Full,
    Delta,
}

/// Messages exchanged between a host and its clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SyncMessage {
    /// Complete board and teams
    #[serde(rename = "new")]
    Full {
        cards: Vec<CardFull>,
        teams: Teams,
        first: TeamColor,
        turn: TeamColor,
    },

    /// Reveal flags aligned to the receiver's board, plus complete teams
    #[serde(rename = "delta")]
    Delta {
        cards: Vec<CardDelta>,
        teams: Teams,
        first: TeamColor,
        turn: TeamColor,
    },
}

impl SyncMessage {
    pub fn kind(&self) -> SyncKind {
        match self {
            SyncMessage::Full { .. } => SyncKind::Full,
            SyncMessage::Delta { .. } => SyncKind::Delta,
        }
    }

    pub fn turn(&self) -> TeamColor {
        match self {
            SyncMessage::Full { turn, .. } | SyncMessage::Delta { turn, .. } => *turn,
        }
    }

    pub fn card_count(&self) -> usize {
        match self {
            SyncMessage::Full { cards, .. } => cards.len(),
            SyncMessage::Delta { cards, .. } => cards.len(),
        }
    }

    /// Serialize message to JSON bytes
    pub fn to_bytes(&self) -> crate::Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Deserialize message from JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> crate::Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| crate::SyncError::MalformedSyncMessage(e.to_string()))
    }

    /// Serialize message to a JSON text frame
    pub fn to_text(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize message from a JSON text frame
    pub fn from_text(text: &str) -> crate::Result<Self> {
        Self::from_bytes(text.as_bytes())
    }
}
