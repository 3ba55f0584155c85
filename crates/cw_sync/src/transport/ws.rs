//! WebSocket transport
//!
//! Every game code maps to a fixed port on the rendezvous host, so the
//! first peer to bind it is the host and everyone else dials it.

use super::{ephemeral_id, Endpoint, PeerId, PeerLink, Transport, TransportEvent};
use crate::{Result, SyncError};
use cw_config::NetworkConfig;
use futures_util::{SinkExt, StreamExt};
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::JoinSet;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, connect_async, WebSocketStream};

#[derive(Debug, Clone)]
pub struct WsTransport {
    network: NetworkConfig,
}

impl WsTransport {
    pub fn new(network: NetworkConfig) -> Self {
        Self { network }
    }

    /// `base_port + (first two bytes of sha256(code) mod port_span)`
    pub fn port_for(&self, code: &str) -> u16 {
        let digest = Sha256::digest(code.as_bytes());
        let spread = u16::from_be_bytes([digest[0], digest[1]]) % self.network.port_span.max(1);
        self.network.base_port.saturating_add(spread)
    }

    pub fn url_for(&self, code: &str) -> String {
        format!("ws://{}:{}", self.network.rendezvous_host, self.port_for(code))
    }
}

impl Transport for WsTransport {
    async fn listen(&self, code: &str) -> Result<Endpoint> {
        let addr = (self.network.rendezvous_host.as_str(), self.port_for(code));
        let listener = match TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(e) if e.kind() == ErrorKind::AddrInUse => {
                return Err(SyncError::HostUnavailable(code.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!("Listening for '{}' on {}", code, self.url_for(code));
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(accept_loop(listener, tx));
        Ok(Endpoint::new(code, rx).with_task(task))
    }

    async fn connect(&self, code: &str) -> Result<Endpoint> {
        let url = self.url_for(code);
        tracing::debug!("Dialing {}", url);
        let (socket, _) = connect_async(url.as_str()).await?;

        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_socket(code.to_string(), socket, tx));
        Ok(Endpoint::new(ephemeral_id(), rx).with_task(task))
    }
}

/// Accept connections until aborted. Dropping this task's `JoinSet`
/// aborts every connection it spawned.
async fn accept_loop(listener: TcpListener, events: UnboundedSender<TransportEvent>) {
    let mut connections = JoinSet::new();
    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    connections.spawn(serve_incoming(stream, addr.to_string(), events.clone()));
                }
                Err(e) => {
                    tracing::error!("Listener failed: {}", e);
                    let _ = events.send(TransportEvent::Disconnected);
                    break;
                }
            },
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
        }
    }
}

async fn serve_incoming(stream: TcpStream, peer: PeerId, events: UnboundedSender<TransportEvent>) {
    match accept_async(stream).await {
        Ok(socket) => run_socket(peer, socket, events).await,
        Err(e) => tracing::warn!("Handshake with {} failed: {}", peer, e),
    }
}

/// Pump one socket: outbound frames from the link, inbound frames to events
async fn run_socket<S>(peer: PeerId, socket: WebSocketStream<S>, events: UnboundedSender<TransportEvent>)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (mut sink, mut stream) = socket.split();
    let (tx, mut outbound) = mpsc::unbounded_channel::<String>();

    let link = PeerLink::frames(peer.clone(), tx);
    if events
        .send(TransportEvent::Open {
            peer: peer.clone(),
            link,
        })
        .is_err()
    {
        return;
    }

    loop {
        tokio::select! {
            frame = outbound.recv() => match frame {
                Some(text) => {
                    if let Err(e) = sink.send(Message::Text(text)).await {
                        let _ = events.send(TransportEvent::Error { peer: peer.clone(), error: e.into() });
                        break;
                    }
                }
                // Every link clone is gone, nobody will write again
                None => {
                    let _ = sink.close().await;
                    break;
                }
            },
            inbound = stream.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    let _ = events.send(TransportEvent::Data { peer: peer.clone(), frame: text });
                }
                Some(Ok(Message::Close(_))) | None => {
                    let _ = events.send(TransportEvent::Close { peer: peer.clone() });
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    let _ = events.send(TransportEvent::Error { peer: peer.clone(), error: e.into() });
                    break;
                }
            },
        }
    }
    tracing::debug!("Socket to {} finished", peer);
}
