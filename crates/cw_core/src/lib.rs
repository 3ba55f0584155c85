//! # Codeword game core
//!
//! Deck supply, board construction and the scoring rules for one round.
//!
//! ```rust
//! use cw_config::Config;
//! use cw_core::GameEngine;
//!
//! let mut engine = GameEngine::with_seed(&Config::default(), 7);
//! engine.new_game().unwrap();
//! assert_eq!(engine.board().len(), 25);
//! ```

pub mod card;
pub mod deck;
pub mod decks;
pub mod engine;
pub mod names;
pub mod team;

pub use card::{Card, CardClass};
pub use deck::Deck;
pub use decks::{DeckCatalog, DeckSpec, DEFAULT_DECK};
pub use engine::{GameEngine, GameSnapshot, Invalidation, RevealSample};
pub use team::{Team, Teams};
