//! Open connections and their dirty flags

use crate::timer::TimerHandle;
use crate::transport::{PeerId, PeerLink};
use cw_core::Invalidation;
use std::collections::BTreeMap;

/// One open connection.
///
/// `stale` means the peer has not been sent the current state;
/// `needs_full_sync` upgrades the next push to a full message. Dropping
/// the entry cancels its flush timer.
#[derive(Debug)]
pub struct ConnectionEntry {
    link: PeerLink,
    pub stale: bool,
    pub needs_full_sync: bool,
    flush_timer: Option<TimerHandle>,
}

impl ConnectionEntry {
    pub fn new(link: PeerLink) -> Self {
        Self {
            link,
            stale: false,
            needs_full_sync: false,
            flush_timer: None,
        }
    }

    pub fn with_flush_timer(mut self, timer: TimerHandle) -> Self {
        self.flush_timer = Some(timer);
        self
    }

    pub fn peer(&self) -> &str {
        self.link.peer()
    }

    pub fn link(&self) -> &PeerLink {
        &self.link
    }

    pub fn has_flush_timer(&self) -> bool {
        self.flush_timer.is_some()
    }

    pub fn invalidate(&mut self, kind: Invalidation) {
        self.stale = true;
        if kind == Invalidation::Full {
            self.needs_full_sync = true;
        }
    }

    /// The current state reached the peer
    pub fn mark_pushed(&mut self) {
        self.stale = false;
        self.needs_full_sync = false;
    }
}

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    entries: BTreeMap<PeerId, ConnectionEntry>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a connection, replacing (and cancelling) any entry for the same peer
    pub fn insert(&mut self, entry: ConnectionEntry) -> Option<ConnectionEntry> {
        self.entries.insert(entry.peer().to_string(), entry)
    }

    pub fn remove(&mut self, peer: &str) -> Option<ConnectionEntry> {
        self.entries.remove(peer)
    }

    pub fn get(&self, peer: &str) -> Option<&ConnectionEntry> {
        self.entries.get(peer)
    }

    pub fn get_mut(&mut self, peer: &str) -> Option<&mut ConnectionEntry> {
        self.entries.get_mut(peer)
    }

    pub fn contains(&self, peer: &str) -> bool {
        self.entries.contains_key(peer)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn peers(&self) -> Vec<PeerId> {
        self.entries.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConnectionEntry> {
        self.entries.values()
    }

    pub fn invalidate_all(&mut self, kind: Invalidation) {
        for entry in self.entries.values_mut() {
            entry.invalidate(kind);
        }
    }

    /// Mark every connection but `peer` stale
    pub fn invalidate_except(&mut self, peer: &str, kind: Invalidation) {
        for (id, entry) in self.entries.iter_mut() {
            if id != peer {
                entry.invalidate(kind);
            }
        }
    }

    /// Drop every entry and with them every flush timer
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn entry(peer: &str) -> ConnectionEntry {
        let (tx, _rx) = mpsc::unbounded_channel();
        ConnectionEntry::new(PeerLink::frames(peer, tx))
    }

    #[test]
    fn test_full_invalidation_dominates() {
        let mut entry = entry("a");
        entry.invalidate(Invalidation::Full);
        entry.invalidate(Invalidation::Incremental);
        assert!(entry.stale);
        assert!(entry.needs_full_sync);

        entry.mark_pushed();
        assert!(!entry.stale);
        assert!(!entry.needs_full_sync);
    }

    #[test]
    fn test_invalidate_except_skips_sender() {
        let mut registry = ConnectionRegistry::new();
        for peer in ["a", "b", "c"] {
            registry.insert(entry(peer));
        }

        registry.invalidate_except("b", Invalidation::Incremental);
        assert!(registry.get("a").unwrap().stale);
        assert!(!registry.get("b").unwrap().stale);
        assert!(registry.get("c").unwrap().stale);
        assert!(!registry.get("c").unwrap().needs_full_sync);

        registry.invalidate_all(Invalidation::Full);
        assert!(registry.iter().all(|e| e.stale && e.needs_full_sync));
    }

    #[tokio::test(start_paused = true)]
    async fn test_removing_entry_cancels_flush_timer() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let timer = TimerHandle::interval(std::time::Duration::from_millis(250), tx, || ());

        let mut registry = ConnectionRegistry::new();
        registry.insert(entry("a").with_flush_timer(timer));
        assert!(registry.get("a").unwrap().has_flush_timer());

        registry.remove("a");
        tokio::time::sleep(std::time::Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
        assert!(registry.is_empty());
    }
}
