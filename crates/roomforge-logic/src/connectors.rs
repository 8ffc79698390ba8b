//! Connector graph: which sockets are joined, plus per-socket usage counts.
//!
//! Keyed by synthetic `SocketId`s, never by object identity.

use std::collections::HashMap;

use crate::layout::SocketId;

#[derive(Debug, Clone, Default)]
pub struct ConnectorGraph {
    pairs: HashMap<SocketId, SocketId>,
    /// Rooms grown from each spawn-module socket. Diagnostic only.
    usage: HashMap<SocketId, u32>,
}

impl ConnectorGraph {
    pub fn is_paired(&self, socket: SocketId) -> bool {
        self.pairs.contains_key(&socket)
    }

    pub fn partner(&self, socket: SocketId) -> Option<SocketId> {
        self.pairs.get(&socket).copied()
    }

    /// Link `a` and `b` both ways. No-op if either side is already paired.
    pub fn pair(&mut self, a: SocketId, b: SocketId) -> bool {
        if a == b || self.is_paired(a) || self.is_paired(b) {
            return false;
        }
        self.pairs.insert(a, b);
        self.pairs.insert(b, a);
        true
    }

    /// Each pairing once, lower id first, in ascending order.
    pub fn pairings(&self) -> Vec<(SocketId, SocketId)> {
        let mut out: Vec<(SocketId, SocketId)> = self
            .pairs
            .iter()
            .filter(|(a, b)| a < b)
            .map(|(&a, &b)| (a, b))
            .collect();
        out.sort();
        out
    }

    pub fn pair_count(&self) -> usize {
        self.pairs.len() / 2
    }

    pub fn record_use(&mut self, socket: SocketId) {
        *self.usage.entry(socket).or_insert(0) += 1;
    }

    pub fn usage(&self, socket: SocketId) -> u32 {
        self.usage.get(&socket).copied().unwrap_or(0)
    }
}
