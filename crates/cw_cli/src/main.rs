//! Codeword CLI - play a peer-to-peer word game from the terminal
//!
//! Usage: codeword <command> [options]

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use cw_common::{CodewordError, Role, TeamColor, EXIT_CONFIG_ERROR, EXIT_ERROR};
use cw_config::Config;
use std::path::PathBuf;

/// Environment variable pointing at a config file
const CONFIG_ENV: &str = "CODEWORD_CONFIG";

#[derive(Parser)]
#[command(
    name = "codeword",
    version = "0.1.0",
    about = "Codeword - a peer-to-peer party word game"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose/debug logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file (defaults to $CODEWORD_CONFIG, then .codeword/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Host or join the game with this code
    Play {
        /// Shared game code
        code: String,

        /// Display name for this session
        #[arg(long)]
        name: Option<String>,

        /// Team to sit on (red or blue)
        #[arg(long)]
        team: Option<TeamColor>,

        /// player, spymaster or chooser
        #[arg(long)]
        role: Option<Role>,

        /// Peer transport
        #[arg(long, value_enum, default_value_t = TransportKind::Ws)]
        transport: TransportKind,

        /// Seed shuffles and generated names
        #[arg(long)]
        seed: Option<u64>,
    },

    /// List the available word decks
    Decks {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Suggest a random player name
    Name {
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print the effective configuration
    Config,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TransportKind {
    /// WebSocket on the rendezvous host
    Ws,
    /// In-process only, for a single-terminal game
    Memory,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    cw_common::telemetry::init_tracing(cli.verbose, cli.json_logs);
    tracing::debug!("Codeword CLI started");

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(EXIT_CONFIG_ERROR);
        }
    };

    let result = match cli.command {
        Commands::Play {
            code,
            name,
            team,
            role,
            transport,
            seed,
        } => commands::play::cmd_play(config, code, name, team, role, transport, seed).await,
        Commands::Decks { json } => commands::info::cmd_decks(&config, json),
        Commands::Name { seed } => commands::info::cmd_name(&config, seed),
        Commands::Config => commands::info::cmd_config(&config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(EXIT_ERROR);
    }
}

fn load_config(explicit: Option<&std::path::Path>) -> Result<Config, CodewordError> {
    if let Some(path) = explicit {
        return Config::from_path(path);
    }
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Config::from_path(&PathBuf::from(path));
    }
    let cwd = std::env::current_dir()?;
    Config::load(&cwd)
}
