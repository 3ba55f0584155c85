//! Configuration management for Codeword
//!
//! This crate handles loading and validating `.codeword/config.toml`

use cw_common::{CodewordError, Group, Result, Role, TeamColor};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Location of the config file relative to the working directory
pub const CONFIG_FILE: &str = ".codeword/config.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Directory the config was loaded from (set programmatically, not in TOML)
    #[serde(skip)]
    pub root: PathBuf,

    /// Round settings
    #[serde(default)]
    pub game: GameConfig,

    /// Local player defaults
    #[serde(default)]
    pub player: PlayerConfig,

    /// Transport and timer settings
    #[serde(default)]
    pub network: NetworkConfig,

    /// Extra word decks on top of the built-in ones
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decks: Vec<CustomDeck>,
}

/// Game configuration ([game])
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// How long a card must be held before it is revealed
    #[serde(default = "default_reveal_time_sec")]
    pub reveal_time_sec: f64,

    /// Names of the decks merged into the draw pile
    #[serde(default = "default_decks")]
    pub decks: Vec<String>,

    /// Cards dealt per group, in dealing order
    #[serde(default = "default_agents")]
    pub agents: Vec<AgentCount>,
}

/// One `[[game.agents]]` entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentCount {
    pub group: Group,
    pub count: usize,
}

impl AgentCount {
    pub fn new(group: Group, count: usize) -> Self {
        Self { group, count }
    }
}

fn default_reveal_time_sec() -> f64 {
    0.5
}
fn default_agents() -> Vec<AgentCount> {
    vec![
        AgentCount::new(Group::Red, 8),
        AgentCount::new(Group::Blue, 8),
        AgentCount::new(Group::Bystander, 7),
        AgentCount::new(Group::Assassin, 1),
    ]
}
fn default_decks() -> Vec<String> {
    vec!["Classic".to_string()]
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            reveal_time_sec: default_reveal_time_sec(),
            decks: default_decks(),
            agents: default_agents(),
        }
    }
}

impl GameConfig {
    pub fn reveal_time(&self) -> Duration {
        Duration::from_secs_f64(self.reveal_time_sec.max(0.0))
    }

    /// Number of cards a board holds when `first` opens the round
    pub fn board_size(&self, first: TeamColor) -> usize {
        self.agents
            .iter()
            .map(|a| a.count + usize::from(a.group == first.group()))
            .sum()
    }
}

/// Player configuration ([player])
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Display name; a random one is generated when empty
    #[serde(default)]
    pub name: String,

    #[serde(default = "default_team")]
    pub team: TeamColor,

    #[serde(default)]
    pub role: Role,
}

fn default_team() -> TeamColor {
    TeamColor::Red
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            team: default_team(),
            role: Role::Player,
        }
    }
}

/// Network configuration ([network])
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Host every game code resolves to
    #[serde(default = "default_rendezvous_host")]
    pub rendezvous_host: String,

    #[serde(default = "default_base_port")]
    pub base_port: u16,

    /// Game codes are spread over `base_port..base_port + port_span`
    #[serde(default = "default_port_span")]
    pub port_span: u16,

    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,

    #[serde(default = "default_join_backoff_ms")]
    pub join_backoff_ms: u64,

    #[serde(default = "default_reveal_sample_ms")]
    pub reveal_sample_ms: u64,
}

fn default_rendezvous_host() -> String {
    "127.0.0.1".to_string()
}
fn default_base_port() -> u16 {
    47_000
}
fn default_port_span() -> u16 {
    2_000
}
fn default_flush_interval_ms() -> u64 {
    250
}
fn default_join_backoff_ms() -> u64 {
    500
}
fn default_reveal_sample_ms() -> u64 {
    25
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rendezvous_host: default_rendezvous_host(),
            base_port: default_base_port(),
            port_span: default_port_span(),
            flush_interval_ms: default_flush_interval_ms(),
            join_backoff_ms: default_join_backoff_ms(),
            reveal_sample_ms: default_reveal_sample_ms(),
        }
    }
}

/// A word deck declared with `[[decks]]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomDeck {
    pub name: String,
    pub words: Vec<String>,
}

impl Config {
    /// Load configuration from workspace root
    pub fn load(workspace_root: &Path) -> Result<Self> {
        let config_path = workspace_root.join(CONFIG_FILE);

        if !config_path.exists() {
            tracing::debug!("No config at {:?}, using defaults", config_path);
            return Ok(Self {
                root: workspace_root.to_path_buf(),
                ..Default::default()
            });
        }

        let mut config = Self::from_path(&config_path)?;
        config.root = workspace_root.to_path_buf();
        Ok(config)
    }

    /// Load configuration from an explicit TOML file
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CodewordError::ConfigError(format!("Failed to read config: {}", e)))?;

        let mut config: Config = toml::from_str(&content)
            .map_err(|e| CodewordError::ConfigError(format!("Failed to parse config: {}", e)))?;

        config.root = path
            .parent()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_default();

        config
            .validate()
            .map_err(|e| CodewordError::ConfigError(e.to_string()))?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.game.agents.is_empty() {
            anyhow::bail!("game.agents cannot be empty");
        }
        for (i, agent) in self.game.agents.iter().enumerate() {
            if self.game.agents[..i].iter().any(|a| a.group == agent.group) {
                anyhow::bail!("game.agents lists group '{}' more than once", agent.group);
            }
        }
        if !self.game.reveal_time_sec.is_finite() || self.game.reveal_time_sec <= 0.0 {
            anyhow::bail!("game.reveal_time_sec must be a positive number");
        }
        if self.network.flush_interval_ms == 0 || self.network.reveal_sample_ms == 0 {
            anyhow::bail!("network intervals must be greater than zero");
        }
        if self.network.port_span == 0 {
            anyhow::bail!("network.port_span must be greater than zero");
        }
        if u32::from(self.network.base_port) + u32::from(self.network.port_span) > u32::from(u16::MAX) {
            anyhow::bail!("network.base_port + network.port_span must fit in a port number");
        }
        for deck in &self.decks {
            if deck.name.trim().is_empty() {
                anyhow::bail!("custom decks need a name");
            }
            if deck.words.is_empty() {
                anyhow::bail!("deck '{}' has no words", deck.name);
            }
        }
        Ok(())
    }

    /// Render as TOML (used by `codeword config`)
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CodewordError::ConfigError(format!("Failed to render config: {}", e)))
    }
}
