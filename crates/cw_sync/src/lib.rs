//! # Codeword Sync
//!
//! Host-authoritative state synchronization between peers of one game.
//!
//! ## Architecture
//!
//! - **Protocol**: JSON `new` (full) and `delta` (incremental) messages
//! - **Registry**: one entry per open connection with `stale` / `needs_full_sync` flags
//! - **Synchronizer**: builds the message a connection needs and applies inbound ones
//! - **Session**: a single dispatcher task that hosts or joins, flushes and reconnects
//! - **Transport**: in-process broker for tests, WebSocket for real games
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cw_config::Config;
//! use cw_core::GameEngine;
//! use cw_sync::{SessionConfig, SessionManager, WsTransport};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let session = SessionConfig::from_network("purple-otter", &config.network);
//!     let transport = WsTransport::new(config.network.clone());
//!
//!     let (manager, handle) = SessionManager::new(session, GameEngine::new(&config), transport)?;
//!     let task = manager.spawn();
//!
//!     handle.start_reveal(3).await?;
//!     handle.shutdown().await?;
//!     task.await??;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod notify;
pub mod protocol;
pub mod registry;
pub mod session;
pub mod synchronizer;
pub mod timer;
pub mod transport;

pub use config::SessionConfig;
pub use notify::{Notification, NotifyLevel, Notifier};
pub use protocol::{CardDelta, CardFull, SyncKind, SyncMessage};
pub use registry::{ConnectionEntry, ConnectionRegistry};
pub use session::{SessionHandle, SessionManager, SessionSnapshot, SessionState};
pub use synchronizer::{ApplyOutcome, PeerRole, StateSynchronizer};
pub use timer::TimerHandle;
pub use transport::memory::{MemoryNetwork, MemoryTransport};
pub use transport::ws::WsTransport;
pub use transport::{Endpoint, PeerId, PeerLink, Transport, TransportEvent};

use cw_common::CodewordError;

/// Common result type for sync operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors that can occur during sync operations
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Game code '{0}' is already hosted")]
    HostUnavailable(String),

    #[error("Transport disconnected")]
    TransportDisconnected,

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Malformed sync message: {0}")]
    MalformedSyncMessage(String),

    #[error("WebSocket error: {0}")]
    WebSocketError(Box<tokio_tungstenite::tungstenite::Error>),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Session closed")]
    SessionClosed,

    #[error(transparent)]
    Game(#[from] CodewordError),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] anyhow::Error),
}

impl From<tokio_tungstenite::tungstenite::Error> for SyncError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        SyncError::WebSocketError(Box::new(e))
    }
}
