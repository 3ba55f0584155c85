//! Peer transports
//!
//! A transport hands out [`Endpoint`]s: `listen` binds a game code as the
//! host, `connect` opens an ephemeral identity and dials the host. Each
//! endpoint yields [`TransportEvent`]s in order; outbound frames go through
//! the [`PeerLink`] delivered with `Open`.

pub mod memory;
pub mod ws;

use crate::protocol::SyncMessage;
use crate::{Result, SyncError};
use std::fmt;
use std::future::Future;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub type PeerId = String;

#[derive(Debug)]
pub enum TransportEvent {
    /// A connection is ready; `link` sends to `peer`
    Open { peer: PeerId, link: PeerLink },
    Data { peer: PeerId, frame: String },
    Close { peer: PeerId },
    Error { peer: PeerId, error: SyncError },
    /// The endpoint itself lost its rendezvous
    Disconnected,
}

#[derive(Debug, Clone)]
enum LinkSink {
    /// Text frames written by a socket task
    Frames(mpsc::UnboundedSender<String>),
    /// Delivered straight into the remote endpoint's event queue
    Events {
        from: PeerId,
        tx: mpsc::UnboundedSender<TransportEvent>,
    },
}

/// Outbound half of one connection
#[derive(Debug, Clone)]
pub struct PeerLink {
    peer: PeerId,
    sink: LinkSink,
}

impl PeerLink {
    pub(crate) fn frames(peer: impl Into<PeerId>, tx: mpsc::UnboundedSender<String>) -> Self {
        Self {
            peer: peer.into(),
            sink: LinkSink::Frames(tx),
        }
    }

    pub(crate) fn events(
        peer: impl Into<PeerId>,
        from: impl Into<PeerId>,
        tx: mpsc::UnboundedSender<TransportEvent>,
    ) -> Self {
        Self {
            peer: peer.into(),
            sink: LinkSink::Events {
                from: from.into(),
                tx,
            },
        }
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn send(&self, message: &SyncMessage) -> Result<()> {
        self.send_text(message.to_text()?)
    }

    /// Send a raw frame, bypassing the codec
    pub fn send_text(&self, frame: impl Into<String>) -> Result<()> {
        let frame = frame.into();
        let sent = match &self.sink {
            LinkSink::Frames(tx) => tx.send(frame).is_ok(),
            LinkSink::Events { from, tx } => tx
                .send(TransportEvent::Data {
                    peer: from.clone(),
                    frame,
                })
                .is_ok(),
        };

        if sent {
            Ok(())
        } else {
            Err(SyncError::TransportDisconnected)
        }
    }
}

/// One side's presence on the network. Dropping it stops its tasks and
/// closes its connections.
pub struct Endpoint {
    local_id: PeerId,
    events: mpsc::UnboundedReceiver<TransportEvent>,
    tasks: Vec<JoinHandle<()>>,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Endpoint {
    pub(crate) fn new(local_id: impl Into<PeerId>, events: mpsc::UnboundedReceiver<TransportEvent>) -> Self {
        Self {
            local_id: local_id.into(),
            events,
            tasks: Vec::new(),
            release: None,
        }
    }

    pub(crate) fn with_task(mut self, task: JoinHandle<()>) -> Self {
        self.tasks.push(task);
        self
    }

    pub(crate) fn on_release(mut self, release: impl FnOnce() + Send + 'static) -> Self {
        self.release = Some(Box::new(release));
        self
    }

    pub fn local_id(&self) -> &str {
        &self.local_id
    }

    /// Next event, or `None` once nothing can produce events any more
    pub async fn recv(&mut self) -> Option<TransportEvent> {
        self.events.recv().await
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("local_id", &self.local_id)
            .field("tasks", &self.tasks.len())
            .finish()
    }
}

impl Drop for Endpoint {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

/// Ordered, best-effort point-to-point channel between peers
pub trait Transport: Send + Sync + 'static {
    /// Bind `code` as a fixed identity. Fails with `HostUnavailable` if
    /// someone already holds it.
    fn listen(&self, code: &str) -> impl Future<Output = Result<Endpoint>> + Send;

    /// Open an ephemeral identity and dial the holder of `code`. The first
    /// event on success is `Open` for the host.
    fn connect(&self, code: &str) -> impl Future<Output = Result<Endpoint>> + Send;
}

pub(crate) fn ephemeral_id() -> PeerId {
    cw_core::names::random_id(&mut rand::thread_rng(), 12)
}
