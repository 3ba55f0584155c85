//! `codeword play`: a line-oriented game session
//!
//! Reads commands from stdin and prints notifications to stderr while the
//! session runs in the background.

use super::board::render;
use crate::TransportKind;
use anyhow::{bail, Context, Result};
use cw_common::{Role, TeamColor};
use cw_config::Config;
use cw_core::GameEngine;
use cw_sync::{
    MemoryNetwork, NotifyLevel, SessionConfig, SessionHandle, SessionManager, SyncError, Transport,
    WsTransport,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

const HELP: &str = "\
Commands:
  reveal <n>                   hold card n until it flips
  cancel                       let go of the held card
  end                          end your team's turn
  new                          deal a new board (host only)
  profile <name> <team> <role> change name, team (red/blue) and role
  board                        show the board
  json                         dump the game state as JSON
  help                         this text
  quit                         leave the game";

/// One parsed input line
#[derive(Debug, PartialEq)]
enum Input {
    Reveal(usize),
    Cancel,
    End,
    New,
    Profile(String, TeamColor, Role),
    Board,
    Json,
    Help,
    Quit,
}

fn parse_input(line: &str) -> Result<Option<Input>> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };

    let input = match verb.to_ascii_lowercase().as_str() {
        "reveal" | "r" => {
            let index = words.next().context("reveal needs a card number")?;
            Input::Reveal(index.parse().with_context(|| format!("'{}' is not a card number", index))?)
        }
        "cancel" | "c" => Input::Cancel,
        "end" => Input::End,
        "new" => Input::New,
        "profile" => {
            let (Some(name), Some(team), Some(role)) = (words.next(), words.next(), words.next()) else {
                bail!("usage: profile <name> <team> <role>");
            };
            Input::Profile(name.to_string(), team.parse()?, role.parse()?)
        }
        "board" | "b" => Input::Board,
        "json" => Input::Json,
        "help" | "?" => Input::Help,
        "quit" | "exit" | "q" => Input::Quit,
        other => bail!("unknown command '{}', try 'help'", other),
    };
    Ok(Some(input))
}

#[allow(clippy::too_many_arguments)]
pub async fn cmd_play(
    mut config: Config,
    code: String,
    name: Option<String>,
    team: Option<TeamColor>,
    role: Option<Role>,
    transport: TransportKind,
    seed: Option<u64>,
) -> Result<()> {
    if let Some(name) = name {
        config.player.name = name;
    }
    if let Some(team) = team {
        config.player.team = team;
    }
    if let Some(role) = role {
        config.player.role = role;
    }

    let engine = match seed {
        Some(seed) => GameEngine::with_seed(&config, seed),
        None => GameEngine::new(&config),
    };
    let session = SessionConfig::from_network(code, &config.network);

    match transport {
        TransportKind::Ws => run(session, engine, WsTransport::new(config.network.clone())).await,
        TransportKind::Memory => run(session, engine, MemoryNetwork::new().transport()).await,
    }
}

async fn run<T: Transport>(session: SessionConfig, engine: GameEngine, transport: T) -> Result<()> {
    let (manager, handle) = SessionManager::new(session, engine, transport)?;
    let mut notifications = handle.subscribe();
    let task = manager.spawn();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_input(&line) {
                    Ok(Some(Input::Quit)) => break,
                    Ok(Some(input)) => {
                        if let Err(e) = execute(&handle, input).await {
                            eprintln!("! {}", e);
                        }
                    }
                    Ok(None) => {}
                    Err(e) => eprintln!("! {}", e),
                }
            }
            note = notifications.recv() => match note {
                Ok(note) => {
                    let marker = match note.level {
                        NotifyLevel::Info => "-",
                        NotifyLevel::Success => "+",
                        NotifyLevel::Warning => "?",
                        NotifyLevel::Error => "!",
                    };
                    eprintln!("{} [{}] {}", marker, note.timestamp.format("%H:%M:%S"), note.message);
                }
                Err(RecvError::Lagged(skipped)) => tracing::debug!("Skipped {} notifications", skipped),
                Err(RecvError::Closed) => break,
            },
        }
    }

    match handle.shutdown().await {
        Ok(()) | Err(SyncError::SessionClosed) => {}
        Err(e) => return Err(e.into()),
    }
    task.await??;
    Ok(())
}

async fn execute(handle: &SessionHandle, input: Input) -> Result<()> {
    match input {
        Input::Reveal(index) => {
            if !handle.start_reveal(index).await? {
                eprintln!("! card {} cannot be revealed right now", index);
            }
        }
        Input::Cancel => {
            handle.stop_reveal().await?;
        }
        Input::End => handle.end_turn().await?,
        Input::New => handle.new_game().await?,
        Input::Profile(name, team, role) => handle.save_profile(name, team, role).await?,
        Input::Board => {
            let snapshot = handle.snapshot().await?;
            print!("{}", render(&snapshot.game));
        }
        Input::Json => {
            let snapshot = handle.snapshot().await?;
            println!("{}", serde_json::to_string_pretty(&snapshot.game)?);
        }
        Input::Help => println!("{}", HELP),
        Input::Quit => {}
    }
    Ok(())
}
