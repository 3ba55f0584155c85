//! In-process transport
//!
//! A [`MemoryNetwork`] is a rendezvous broker shared by every endpoint in
//! the process. Frames go straight into the receiving endpoint's event
//! queue, so ordering per connection is preserved.

use super::{ephemeral_id, Endpoint, PeerId, PeerLink, Transport, TransportEvent};
use crate::{Result, SyncError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc::{self, UnboundedSender};

struct HostSlot {
    events: UnboundedSender<TransportEvent>,
    clients: HashMap<PeerId, UnboundedSender<TransportEvent>>,
}

#[derive(Default)]
struct Broker {
    hosts: HashMap<String, HostSlot>,
}

#[derive(Clone, Default)]
pub struct MemoryNetwork {
    inner: Arc<Mutex<Broker>>,
}

impl MemoryNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transport(&self) -> MemoryTransport {
        MemoryTransport {
            network: self.clone(),
        }
    }

    pub fn is_hosted(&self, code: &str) -> bool {
        self.lock()
            .map(|broker| broker.hosts.get(code).is_some_and(|slot| !slot.events.is_closed()))
            .unwrap_or(false)
    }

    /// Clients currently connected to `code`
    pub fn client_count(&self, code: &str) -> usize {
        self.lock()
            .ok()
            .and_then(|broker| broker.hosts.get(code).map(|slot| slot.clients.len()))
            .unwrap_or(0)
    }

    /// Cut every client of `code` off the rendezvous. Clients see
    /// `Disconnected`, the host sees `Close` for each of them.
    pub fn sever(&self, code: &str) {
        let Ok(mut broker) = self.lock() else {
            return;
        };
        if let Some(slot) = broker.hosts.get_mut(code) {
            for (peer, client) in slot.clients.drain() {
                let _ = client.send(TransportEvent::Disconnected);
                let _ = slot.events.send(TransportEvent::Close { peer });
            }
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Broker>> {
        self.inner
            .lock()
            .map_err(|_| SyncError::TransportError("memory broker poisoned".to_string()))
    }

    fn release_host(&self, code: &str, events: &UnboundedSender<TransportEvent>) {
        let Ok(mut broker) = self.lock() else {
            return;
        };
        let owned = broker
            .hosts
            .get(code)
            .is_some_and(|slot| slot.events.same_channel(events));
        if !owned {
            return;
        }
        if let Some(slot) = broker.hosts.remove(code) {
            for client in slot.clients.values() {
                let _ = client.send(TransportEvent::Close {
                    peer: code.to_string(),
                });
            }
        }
    }

    fn release_client(&self, code: &str, local_id: &str) {
        let Ok(mut broker) = self.lock() else {
            return;
        };
        if let Some(slot) = broker.hosts.get_mut(code) {
            if slot.clients.remove(local_id).is_some() {
                let _ = slot.events.send(TransportEvent::Close {
                    peer: local_id.to_string(),
                });
            }
        }
    }
}

/// [`Transport`] over a [`MemoryNetwork`]
#[derive(Clone)]
pub struct MemoryTransport {
    network: MemoryNetwork,
}

impl MemoryTransport {
    pub fn new(network: MemoryNetwork) -> Self {
        Self { network }
    }

    pub fn network(&self) -> &MemoryNetwork {
        &self.network
    }

    fn bind(&self, code: &str) -> Result<Endpoint> {
        let (tx, rx) = mpsc::unbounded_channel();
        {
            let mut broker = self.network.lock()?;
            if let Some(slot) = broker.hosts.get(code) {
                if !slot.events.is_closed() {
                    return Err(SyncError::HostUnavailable(code.to_string()));
                }
            }
            broker.hosts.insert(
                code.to_string(),
                HostSlot {
                    events: tx.clone(),
                    clients: HashMap::new(),
                },
            );
        }

        tracing::debug!("Memory host bound to '{}'", code);
        let network = self.network.clone();
        let code = code.to_string();
        Ok(Endpoint::new(code.clone(), rx).on_release(move || network.release_host(&code, &tx)))
    }

    fn dial(&self, code: &str) -> Result<Endpoint> {
        let local_id = ephemeral_id();
        let (tx, rx) = mpsc::unbounded_channel();
        {
            let mut broker = self.network.lock()?;
            let slot = broker
                .hosts
                .get_mut(code)
                .filter(|slot| !slot.events.is_closed())
                .ok_or_else(|| SyncError::TransportError(format!("no host for '{}'", code)))?;

            slot.events
                .send(TransportEvent::Open {
                    peer: local_id.clone(),
                    link: PeerLink::events(local_id.clone(), code, tx.clone()),
                })
                .map_err(|_| SyncError::TransportDisconnected)?;

            let _ = tx.send(TransportEvent::Open {
                peer: code.to_string(),
                link: PeerLink::events(code, local_id.clone(), slot.events.clone()),
            });
            slot.clients.insert(local_id.clone(), tx);
        }

        tracing::debug!("Memory client {} dialed '{}'", local_id, code);
        let network = self.network.clone();
        let code = code.to_string();
        let id = local_id.clone();
        Ok(Endpoint::new(local_id, rx).on_release(move || network.release_client(&code, &id)))
    }
}

impl Transport for MemoryTransport {
    async fn listen(&self, code: &str) -> Result<Endpoint> {
        self.bind(code)
    }

    async fn connect(&self, code: &str) -> Result<Endpoint> {
        self.dial(code)
    }
}
