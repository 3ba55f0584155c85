//! Session lifecycle
//!
//! A [`SessionManager`] is one dispatcher task that owns the game engine,
//! the connection registry and the transport endpoint. Local actions reach
//! it through a cloneable [`SessionHandle`]; transport events and timers
//! are multiplexed with `tokio::select!`, so nothing is shared or locked.
//!
//! ```text
//! Unstarted -> AttemptingHost -> Hosting
//!                    |
//!                    v
//!             AttemptingJoin <-> Joined
//! ```

use crate::config::SessionConfig;
use crate::notify::{Notification, Notifier};
use crate::protocol::{SyncKind, SyncMessage};
use crate::registry::{ConnectionEntry, ConnectionRegistry};
use crate::synchronizer::{PeerRole, StateSynchronizer};
use crate::timer::TimerHandle;
use crate::transport::{Endpoint, PeerId, PeerLink, Transport, TransportEvent};
use crate::{Result, SyncError};
use cw_common::{CodewordError, Role, TeamColor};
use cw_core::{GameEngine, GameSnapshot, Invalidation, RevealSample};
use std::time::Instant;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unstarted,
    AttemptingHost,
    Hosting,
    AttemptingJoin,
    Joined,
    Closed,
}

/// Session and game state at one instant
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub code: String,
    pub local_id: Option<PeerId>,
    pub peers: Vec<PeerId>,
    pub game: GameSnapshot,
}

enum Command {
    StartReveal {
        index: usize,
        reply: oneshot::Sender<Result<bool>>,
    },
    StopReveal {
        reply: oneshot::Sender<bool>,
    },
    NewGame {
        reply: oneshot::Sender<Result<()>>,
    },
    EndTurn {
        reply: oneshot::Sender<()>,
    },
    SaveProfile {
        name: String,
        team: TeamColor,
        role: Role,
        reply: oneshot::Sender<()>,
    },
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

#[derive(Debug)]
enum TimerEvent {
    Flush(PeerId),
    SampleReveal,
    RetryJoin,
}

/// Cloneable front door to a running session
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    notifier: Notifier,
}

impl SessionHandle {
    async fn request<R>(&self, make: impl FnOnce(oneshot::Sender<R>) -> Command) -> Result<R> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(make(reply))
            .await
            .map_err(|_| SyncError::SessionClosed)?;
        rx.await.map_err(|_| SyncError::SessionClosed)
    }

    /// Start holding a card. `Ok(false)` if the hold was refused.
    pub async fn start_reveal(&self, index: usize) -> Result<bool> {
        self.request(|reply| Command::StartReveal { index, reply })
            .await?
    }

    /// Let go of the held card. `Ok(false)` if nothing was held.
    pub async fn stop_reveal(&self) -> Result<bool> {
        self.request(|reply| Command::StopReveal { reply }).await
    }

    /// Deal a new board. Only the host may do this.
    pub async fn new_game(&self) -> Result<()> {
        self.request(|reply| Command::NewGame { reply }).await?
    }

    pub async fn end_turn(&self) -> Result<()> {
        self.request(|reply| Command::EndTurn { reply }).await
    }

    pub async fn save_profile(&self, name: impl Into<String>, team: TeamColor, role: Role) -> Result<()> {
        let name = name.into();
        self.request(|reply| Command::SaveProfile {
            name,
            team,
            role,
            reply,
        })
        .await
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Stop the session and close every connection
    pub async fn shutdown(&self) -> Result<()> {
        self.request(|reply| Command::Shutdown { reply }).await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifier.subscribe()
    }
}

pub struct SessionManager<T: Transport> {
    config: SessionConfig,
    transport: T,
    engine: GameEngine,
    registry: ConnectionRegistry,
    synchronizer: StateSynchronizer,
    state: SessionState,
    endpoint: Option<Endpoint>,
    /// A client has received its first full state
    synced: bool,
    reveal_timer: Option<TimerHandle>,
    join_timer: Option<TimerHandle>,
    timers_tx: mpsc::UnboundedSender<TimerEvent>,
    timers_rx: mpsc::UnboundedReceiver<TimerEvent>,
    commands: mpsc::Receiver<Command>,
    notifier: Notifier,
}

impl<T: Transport> SessionManager<T> {
    pub fn new(config: SessionConfig, engine: GameEngine, transport: T) -> Result<(Self, SessionHandle)> {
        config.validate()?;

        let (commands_tx, commands) = mpsc::channel(32);
        let (timers_tx, timers_rx) = mpsc::unbounded_channel();
        let notifier = Notifier::new(config.notification_capacity);

        let handle = SessionHandle {
            commands: commands_tx,
            notifier: notifier.clone(),
        };
        let manager = Self {
            config,
            transport,
            engine,
            registry: ConnectionRegistry::new(),
            synchronizer: StateSynchronizer::new(PeerRole::Client),
            state: SessionState::Unstarted,
            endpoint: None,
            synced: false,
            reveal_timer: None,
            join_timer: None,
            timers_tx,
            timers_rx,
            commands,
            notifier,
        };
        Ok((manager, handle))
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run the session on its own task
    pub fn spawn(self) -> JoinHandle<Result<()>> {
        tokio::spawn(self.run())
    }

    /// Host or join, then dispatch until shut down or every handle is dropped
    pub async fn run(mut self) -> Result<()> {
        self.attempt_host().await;

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown { reply }) => {
                        self.close();
                        let _ = reply.send(());
                        break;
                    }
                    Some(command) => self.handle_command(command),
                    None => {
                        self.close();
                        break;
                    }
                },
                Some(timer) = self.timers_rx.recv() => self.handle_timer(timer).await,
                event = next_event(&mut self.endpoint) => self.handle_transport(event).await,
            }
        }

        tracing::info!("Session for '{}' closed", self.config.code);
        Ok(())
    }

    async fn attempt_host(&mut self) {
        self.state = SessionState::AttemptingHost;
        match self.transport.listen(&self.config.code).await {
            Ok(endpoint) => {
                self.endpoint = Some(endpoint);
                self.synchronizer = StateSynchronizer::new(PeerRole::Host);
                self.state = SessionState::Hosting;
                self.notifier
                    .success(format!("Hosting a new game with id {}", self.config.code));

                if let Err(e) = self.engine.new_game() {
                    self.notifier.error(format!(
                        "Could not deal a board: {}. No board is dealt; fix the config and start a new game.",
                        e
                    ));
                }
                self.drain_invalidation();
            }
            Err(SyncError::HostUnavailable(_)) => {
                tracing::info!("'{}' is already hosted, joining", self.config.code);
                self.attempt_join().await;
            }
            Err(e) => {
                tracing::warn!("Could not host '{}': {}", self.config.code, e);
                self.attempt_join().await;
            }
        }
    }

    async fn attempt_join(&mut self) {
        self.state = SessionState::AttemptingJoin;
        self.synchronizer = StateSynchronizer::new(PeerRole::Client);
        self.synced = false;
        self.join_timer = None;

        match self.transport.connect(&self.config.code).await {
            Ok(endpoint) => {
                self.endpoint = Some(endpoint);
                self.notifier
                    .warning(format!("Connecting to the server at {}", self.config.code));
            }
            Err(e) => {
                tracing::debug!("Join of '{}' failed: {}", self.config.code, e);
                self.schedule_rejoin();
            }
        }
    }

    fn schedule_rejoin(&mut self) {
        self.state = SessionState::AttemptingJoin;
        self.join_timer = Some(TimerHandle::after(
            self.config.join_backoff,
            self.timers_tx.clone(),
            TimerEvent::RetryJoin,
        ));
    }

    /// Drop the transport and every connection, then retry the join
    fn lose_host(&mut self, reason: &str) {
        self.notifier
            .error(format!("Lost the connection to the host ({}). Reconnecting.", reason));
        self.registry.clear();
        self.endpoint = None;
        self.synced = false;
        self.schedule_rejoin();
    }

    fn close(&mut self) {
        self.reveal_timer = None;
        self.join_timer = None;
        self.registry.clear();
        self.endpoint = None;
        self.state = SessionState::Closed;
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::StartReveal { index, reply } => {
                let result = self
                    .engine
                    .start_reveal(index, Instant::now())
                    .map_err(SyncError::from);
                if matches!(result, Ok(true)) {
                    self.reveal_timer = Some(TimerHandle::interval(
                        self.config.reveal_sample,
                        self.timers_tx.clone(),
                        || TimerEvent::SampleReveal,
                    ));
                }
                let _ = reply.send(result);
            }
            Command::StopReveal { reply } => {
                self.reveal_timer = None;
                let _ = reply.send(self.engine.stop_reveal());
            }
            Command::NewGame { reply } => {
                let result = if self.synchronizer.is_host() {
                    self.reveal_timer = None;
                    self.engine.new_game().map_err(SyncError::from)
                } else {
                    Err(SyncError::Game(CodewordError::NotHost))
                };
                if result.is_ok() {
                    self.notifier.info("Dealt a new board");
                }
                let _ = reply.send(result);
            }
            Command::EndTurn { reply } => {
                self.engine.end_turn();
                self.notifier.info(format!("{}'s turn", self.engine.turn()));
                let _ = reply.send(());
            }
            Command::SaveProfile {
                name,
                team,
                role,
                reply,
            } => {
                self.engine.save_profile(name, team, role);
                if self.engine.reveal_in_progress().is_none() {
                    self.reveal_timer = None;
                }
                let _ = reply.send(());
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
            Command::Shutdown { reply } => {
                let _ = reply.send(());
            }
        }
        self.drain_invalidation();
    }

    async fn handle_timer(&mut self, timer: TimerEvent) {
        match timer {
            TimerEvent::Flush(peer) => self.flush(&peer),
            TimerEvent::SampleReveal => match self.engine.sample_reveal(Instant::now()) {
                Some(RevealSample::Holding { .. }) => {}
                Some(RevealSample::Revealed { index }) => {
                    self.reveal_timer = None;
                    if let Some(card) = self.engine.board().get(index) {
                        tracing::debug!("Committed reveal of {} ({})", index, card.name);
                    }
                    if let Some(winner) = self.engine.winner() {
                        self.notifier.success(format!("{} wins!", winner));
                    }
                    self.drain_invalidation();
                }
                None => self.reveal_timer = None,
            },
            TimerEvent::RetryJoin => {
                self.join_timer = None;
                if self.state == SessionState::AttemptingJoin && self.endpoint.is_none() {
                    self.attempt_join().await;
                }
            }
        }
    }

    async fn handle_transport(&mut self, event: Option<TransportEvent>) {
        let Some(event) = event else {
            // The endpoint can never produce another event
            self.endpoint = None;
            if self.synchronizer.is_host() {
                self.notifier.error("Lost the host endpoint, hosting again");
                self.registry.clear();
                self.attempt_host().await;
            } else {
                self.lose_host("endpoint closed");
            }
            return;
        };

        match event {
            TransportEvent::Open { peer, link } => self.open(peer, link),
            TransportEvent::Data { peer, frame } => self.receive(&peer, &frame),
            TransportEvent::Close { peer } => {
                if self.synchronizer.is_host() {
                    if self.registry.remove(&peer).is_some() {
                        self.notifier.info(format!("{} disconnected.", peer));
                    }
                } else {
                    self.lose_host("closed");
                }
            }
            TransportEvent::Error { peer, error } => {
                if self.synchronizer.is_host() {
                    self.registry.remove(&peer);
                    self.notifier.warning(format!("Connection to {} failed: {}", peer, error));
                } else {
                    self.lose_host(&error.to_string());
                }
            }
            TransportEvent::Disconnected => {
                if self.synchronizer.is_host() {
                    self.notifier
                        .warning("Disconnected from the rendezvous, keeping open connections");
                } else {
                    self.lose_host("disconnected");
                }
            }
        }
    }

    fn open(&mut self, peer: PeerId, link: PeerLink) {
        let flush = {
            let peer = peer.clone();
            TimerHandle::interval(self.config.flush_interval, self.timers_tx.clone(), move || {
                TimerEvent::Flush(peer.clone())
            })
        };
        let mut entry = ConnectionEntry::new(link).with_flush_timer(flush);

        if self.synchronizer.is_host() {
            entry.invalidate(Invalidation::Full);
            self.registry.insert(entry);
            self.flush(&peer);
            self.notifier.success(format!("{} connected.", peer));
        } else {
            // Held back by `synced` until the host's first full state lands
            entry.invalidate(Invalidation::Incremental);
            self.registry.insert(entry);
            self.state = SessionState::Joined;
            self.notifier
                .success(format!("Connected to the server at {}", self.config.code));
        }
    }

    fn receive(&mut self, peer: &str, frame: &str) {
        let message = match SyncMessage::from_text(frame) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("Dropping frame from {}: {}", peer, e);
                return;
            }
        };
        let kind = message.kind();

        let awaiting_full = self.synchronizer.is_host()
            && self.registry.get(peer).is_some_and(|entry| entry.needs_full_sync);
        let applied = if awaiting_full {
            tracing::warn!("{} has not seen the current board, keeping only its roster", peer);
            Ok(self.synchronizer.apply_unsynced(&mut self.engine, message))
        } else {
            self.synchronizer.apply(&mut self.engine, message)
        };

        match applied {
            Ok(outcome) => {
                if !outcome.applied {
                    return;
                }
                if let Some(turn) = outcome.turn_changed {
                    self.notifier.info(format!("{}'s turn", turn));
                }

                if self.synchronizer.is_host() {
                    self.registry.invalidate_except(peer, Invalidation::Incremental);
                } else if kind == SyncKind::Full {
                    self.synced = true;
                    if let Some(entry) = self.registry.get_mut(peer) {
                        entry.mark_pushed();
                    }
                }

                if !outcome.revealed.is_empty() {
                    if let Some(winner) = self.engine.winner() {
                        self.notifier.success(format!("{} wins!", winner));
                    }
                }
                if self.engine.reveal_in_progress().is_none() {
                    self.reveal_timer = None;
                }
                self.drain_invalidation();
            }
            Err(e) => {
                self.notifier
                    .warning(format!("Ignoring sync message from {}: {}", peer, e));
            }
        }
    }

    fn flush(&mut self, peer: &str) {
        if !self.synchronizer.is_host() && !self.synced {
            return;
        }
        let Some(entry) = self.registry.get_mut(peer) else {
            return;
        };
        if !entry.stale {
            return;
        }

        if let Err(e) = StateSynchronizer::push(entry, &self.engine) {
            if self.synchronizer.is_host() {
                self.registry.remove(peer);
                self.notifier.warning(format!("Dropped {}: {}", peer, e));
            } else {
                self.lose_host(&e.to_string());
            }
        }
    }

    /// Forward the engine's pending invalidation to every connection
    fn drain_invalidation(&mut self) {
        if let Some(kind) = self.engine.take_invalidation() {
            self.registry.invalidate_all(kind);
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            code: self.config.code.clone(),
            local_id: self.endpoint.as_ref().map(|e| e.local_id().to_string()),
            peers: self.registry.peers(),
            game: self.engine.snapshot(),
        }
    }
}

async fn next_event(endpoint: &mut Option<Endpoint>) -> Option<TransportEvent> {
    match endpoint {
        Some(endpoint) => endpoint.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::memory::MemoryNetwork;
    use cw_config::Config;
    use std::time::Duration;

    fn session(network: &MemoryNetwork, name: &str) -> (SessionManager<crate::MemoryTransport>, SessionHandle) {
        let mut config = Config::default();
        config.player.name = name.to_string();
        config.network.flush_interval_ms = 10;
        config.network.join_backoff_ms = 20;
        let session = SessionConfig::from_network("otter", &config.network);
        SessionManager::new(session, GameEngine::with_seed(&config, 1), network.transport()).unwrap()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let network = MemoryNetwork::new();
        let mut session = SessionConfig::from_network("otter", &cw_config::NetworkConfig::default());
        session.code = String::new();
        let engine = GameEngine::with_seed(&Config::default(), 1);
        assert!(matches!(
            SessionManager::new(session, engine, network.transport()),
            Err(SyncError::ConfigError(_))
        ));
    }

    #[tokio::test]
    async fn test_first_peer_hosts() {
        let network = MemoryNetwork::new();
        let (manager, handle) = session(&network, "Host");
        assert_eq!(manager.state(), SessionState::Unstarted);
        let task = manager.spawn();

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.state, SessionState::Hosting);
        assert_eq!(snapshot.local_id.as_deref(), Some("otter"));
        assert_eq!(snapshot.game.board.len(), 25);
        assert!(network.is_hosted("otter"));

        handle.shutdown().await.unwrap();
        task.await.unwrap().unwrap();
        assert!(!network.is_hosted("otter"));
        assert!(matches!(handle.snapshot().await, Err(SyncError::SessionClosed)));
    }

    #[tokio::test]
    async fn test_client_cannot_deal() {
        let network = MemoryNetwork::new();
        let (host, host_handle) = session(&network, "Host");
        let host_task = host.spawn();
        host_handle.snapshot().await.unwrap();

        let (client, client_handle) = session(&network, "Client");
        let client_task = client.spawn();

        assert!(matches!(
            client_handle.new_game().await,
            Err(SyncError::Game(CodewordError::NotHost))
        ));

        let mut notifications = host_handle.subscribe();
        host_handle.new_game().await.unwrap();
        // Connection notices may arrive first
        let dealt = tokio::time::timeout(Duration::from_secs(1), async {
            loop {
                let note = notifications.recv().await.unwrap();
                if note.message == "Dealt a new board" {
                    break note;
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(dealt.level, crate::NotifyLevel::Info);

        client_handle.shutdown().await.unwrap();
        host_handle.shutdown().await.unwrap();
        client_task.await.unwrap().unwrap();
        host_task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_failed_first_deal_still_hosts_with_empty_board() {
        let network = MemoryNetwork::new();
        let mut config = Config::default();
        config.game.agents = vec![cw_config::AgentCount::new(cw_common::Group::Red, 100_000)];
        let session = SessionConfig::from_network("otter", &config.network);
        let (manager, handle) =
            SessionManager::new(session, GameEngine::with_seed(&config, 1), network.transport()).unwrap();
        let mut notifications = handle.subscribe();
        let task = manager.spawn();

        let failed = tokio::time::timeout(Duration::from_secs(1), async {
            loop {
                let note = notifications.recv().await.unwrap();
                if note.message.starts_with("Could not deal") {
                    break note;
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(failed.level, crate::NotifyLevel::Error);
        assert!(failed.message.contains("No board is dealt"));

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.state, SessionState::Hosting);
        assert!(snapshot.game.board.is_empty());
        assert!(matches!(
            handle.new_game().await,
            Err(SyncError::Game(CodewordError::InsufficientCards { .. }))
        ));

        handle.shutdown().await.unwrap();
        task.await.unwrap().unwrap();
    }
}
