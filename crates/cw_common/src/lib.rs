//! Common types and errors for Codeword
//!
//! This crate provides the shared vocabulary (card groups, teams, player
//! profiles) and the domain error type used across all Codeword components.

pub mod telemetry;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Core error types for Codeword game operations
#[derive(Error, Debug)]
pub enum CodewordError {
    #[error("Not enough cards: requested {requested}, {available} available")]
    InsufficientCards { requested: usize, available: usize },

    #[error("Card index {index} out of range (board has {len} cards)")]
    CardOutOfRange { index: usize, len: usize },

    #[error("Only the host can perform this action")]
    NotHost,

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Invalid input: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Which pile a card belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    Red,
    Blue,
    #[serde(alias = "bystanders")]
    Bystander,
    Assassin,
}

impl Group {
    /// The scoring team this group counts towards, if any
    pub fn team(self) -> Option<TeamColor> {
        match self {
            Group::Red => Some(TeamColor::Red),
            Group::Blue => Some(TeamColor::Blue),
            Group::Bystander | Group::Assassin => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Group::Red => "red",
            Group::Blue => "blue",
            Group::Bystander => "bystander",
            Group::Assassin => "assassin",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Group {
    type Err = CodewordError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "red" => Ok(Group::Red),
            "blue" => Ok(Group::Blue),
            "bystander" | "bystanders" => Ok(Group::Bystander),
            "assassin" => Ok(Group::Assassin),
            other => Err(CodewordError::ValidationError(format!(
                "unknown card group '{}'",
                other
            ))),
        }
    }
}

/// One of the two competing teams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamColor {
    Red,
    Blue,
}

impl TeamColor {
    pub const ALL: [TeamColor; 2] = [TeamColor::Red, TeamColor::Blue];

    /// The opposing team
    pub fn other(self) -> Self {
        match self {
            TeamColor::Red => TeamColor::Blue,
            TeamColor::Blue => TeamColor::Red,
        }
    }

    /// The card group owned by this team
    pub fn group(self) -> Group {
        match self {
            TeamColor::Red => Group::Red,
            TeamColor::Blue => Group::Blue,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TeamColor::Red => "red",
            TeamColor::Blue => "blue",
        }
    }
}

impl fmt::Display for TeamColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TeamColor {
    type Err = CodewordError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "red" => Ok(TeamColor::Red),
            "blue" => Ok(TeamColor::Blue),
            other => Err(CodewordError::ValidationError(format!(
                "unknown team '{}'",
                other
            ))),
        }
    }
}

/// Player roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Player,
    /// Sees every card's group
    Spymaster,
    Chooser,
}

impl FromStr for Role {
    type Err = CodewordError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "player" => Ok(Role::Player),
            "spymaster" | "spy" => Ok(Role::Spymaster),
            "chooser" => Ok(Role::Chooser),
            other => Err(CodewordError::ValidationError(format!(
                "unknown role '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Player => "player",
            Role::Spymaster => "spymaster",
            Role::Chooser => "chooser",
        })
    }
}

/// A participant as listed on a team roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub id: String,
    pub name: String,
    pub team: TeamColor,
    #[serde(default)]
    pub role: Role,
}

impl PlayerProfile {
    pub fn new(id: impl Into<String>, name: impl Into<String>, team: TeamColor) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            team,
            role: Role::Player,
        }
    }

    /// Spymasters see all card groups
    pub fn is_spy(&self) -> bool {
        self.role == Role::Spymaster
    }

    pub fn is_chooser(&self) -> bool {
        self.role == Role::Chooser
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, CodewordError>;

/// Exit code constants for the `codeword` binary
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 1;
pub const EXIT_USAGE: i32 = 2;
pub const EXIT_CONFIG_ERROR: i32 = 101;
