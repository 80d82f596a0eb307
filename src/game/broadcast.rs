//! Broadcast gateway - fan-out of server messages to connected peers
//!
//! Send failures are a transport concern: they are logged here and never
//! surfaced to the simulation.

use std::collections::HashMap;

use tokio::sync::{mpsc, watch};
use tracing::debug;
use uuid::Uuid;

use crate::ws::protocol::{ServerMsg, WorldSnapshot};

pub struct BroadcastGateway {
    peers: HashMap<Uuid, mpsc::UnboundedSender<ServerMsg>>,
    /// Latest world snapshot for the read-only HTTP endpoints
    snapshot_tx: watch::Sender<WorldSnapshot>,
}

impl BroadcastGateway {
    pub fn new(initial: WorldSnapshot) -> (Self, watch::Receiver<WorldSnapshot>) {
        let (snapshot_tx, snapshot_rx) = watch::channel(initial);
        (
            Self {
                peers: HashMap::new(),
                snapshot_tx,
            },
            snapshot_rx,
        )
    }

    pub fn register(&mut self, conn_id: Uuid, tx: mpsc::UnboundedSender<ServerMsg>) {
        self.peers.insert(conn_id, tx);
    }

    pub fn unregister(&mut self, conn_id: Uuid) {
        self.peers.remove(&conn_id);
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    /// Send to a single connection
    pub fn send_to(&self, conn_id: Uuid, msg: ServerMsg) {
        if let Some(tx) = self.peers.get(&conn_id) {
            if tx.send(msg).is_err() {
                debug!(conn_id = %conn_id, "peer channel closed, send dropped");
            }
        }
    }

    /// Send to every connection
    pub fn broadcast(&self, msg: ServerMsg) {
        for (conn_id, tx) in &self.peers {
            if tx.send(msg.clone()).is_err() {
                debug!(conn_id = %conn_id, "peer channel closed, broadcast dropped");
            }
        }
    }

    /// Publish the latest snapshot for HTTP readers
    pub fn publish_snapshot(&self, snapshot: WorldSnapshot) {
        let _ = self.snapshot_tx.send(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::world::WorldState;
    use crate::ws::protocol::Role;

    #[test]
    fn broadcast_reaches_all_registered_peers() {
        let (mut gateway, _snapshot_rx) = BroadcastGateway::new(WorldState::new().snapshot());
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        gateway.register(Uuid::new_v4(), tx_a);
        gateway.register(Uuid::new_v4(), tx_b);

        gateway.broadcast(ServerMsg::AssignPlayer {
            role: Role::Spectator,
            controls: None,
            position: None,
        });

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_ok());
    }

    #[test]
    fn dead_peer_does_not_poison_the_broadcast() {
        let (mut gateway, _snapshot_rx) = BroadcastGateway::new(WorldState::new().snapshot());
        let (tx_dead, rx_dead) = mpsc::unbounded_channel();
        drop(rx_dead);
        let (tx_live, mut rx_live) = mpsc::unbounded_channel();
        gateway.register(Uuid::new_v4(), tx_dead);
        gateway.register(Uuid::new_v4(), tx_live);

        gateway.broadcast(ServerMsg::GameStateUpdate(WorldState::new().snapshot()));

        assert!(rx_live.try_recv().is_ok());
    }
}
