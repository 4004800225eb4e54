//! Connection registry and heartbeat sweep
//!
//! The registry exclusively owns the identity-to-connection mapping. It is
//! an explicit object handed to the broadcast service rather than ambient
//! process state, and all access goes through its internal lock so
//! iteration never observes a partially-updated map.

use crate::connection::{Connection, ConnectionId, Outbound};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::info;

/// Registry of live persistent connections
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<ConnectionId, Arc<Connection>>>,
}

impl ConnectionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new connection around the given outbound sink
    pub async fn register(&self, sender: mpsc::Sender<Outbound>) -> Arc<Connection> {
        let id = ConnectionId::new();
        let connection = Arc::new(Connection::new(id, sender));
        self.connections
            .write()
            .await
            .insert(id, Arc::clone(&connection));
        connection
    }

    /// Remove a connection, cancelling its session first.
    ///
    /// Returns the removed connection, if it was registered.
    pub async fn unregister(&self, id: ConnectionId) -> Option<Arc<Connection>> {
        let removed = self.connections.write().await.remove(&id);
        if let Some(connection) = &removed {
            connection.close();
        }
        removed
    }

    /// Look up a connection by identity
    pub async fn get(&self, id: ConnectionId) -> Option<Arc<Connection>> {
        self.connections.read().await.get(&id).cloned()
    }

    /// Snapshot of all registered connections
    pub async fn connections(&self) -> Vec<Arc<Connection>> {
        self.connections.read().await.values().cloned().collect()
    }

    /// Number of registered connections
    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Whether no connections are registered
    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }

    /// Whether the connection is registered and acknowledged the last probe
    pub async fn is_alive(&self, id: ConnectionId) -> bool {
        match self.get(id).await {
            Some(connection) => connection.is_alive(),
            None => false,
        }
    }

    /// Record a probe acknowledgment
    pub async fn mark_alive(&self, id: ConnectionId) {
        if let Some(connection) = self.get(id).await {
            connection.mark_alive();
        }
    }

    /// One heartbeat cycle: reap connections that never acknowledged the
    /// previous probe, then clear the survivors' flags and probe them.
    ///
    /// A connection silent for two full sweep intervals is dead. Returns
    /// the number of connections reaped.
    pub async fn sweep(&self) -> usize {
        let mut reaped = Vec::new();
        {
            let mut connections = self.connections.write().await;
            connections.retain(|_, connection| {
                if connection.is_alive() {
                    true
                } else {
                    reaped.push(Arc::clone(connection));
                    false
                }
            });
        }

        for connection in &reaped {
            info!(conn_id = %connection.id(), "terminating dead connection");
            connection.close();
        }

        for connection in self.connections().await {
            connection.clear_alive();
            connection.send(Outbound::Probe);
        }

        reaped.len()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::MonitoringSession;

    async fn register_one(
        registry: &ConnectionRegistry,
        capacity: usize,
    ) -> (Arc<Connection>, mpsc::Receiver<Outbound>) {
        let (tx, rx) = mpsc::channel(capacity);
        (registry.register(tx).await, rx)
    }

    #[tokio::test]
    async fn test_register_and_lookup() {
        let registry = ConnectionRegistry::new();
        assert!(registry.is_empty().await);

        let (conn, _rx) = register_one(&registry, 4).await;
        assert_eq!(registry.len().await, 1);
        assert!(registry.get(conn.id()).await.is_some());
        assert!(registry.is_alive(conn.id()).await);
    }

    #[tokio::test]
    async fn test_unregister_closes_connection() {
        let registry = ConnectionRegistry::new();
        let (conn, _rx) = register_one(&registry, 4).await;

        let removed = registry.unregister(conn.id()).await.unwrap();
        assert!(!removed.is_open());
        assert!(registry.is_empty().await);
        assert!(registry.unregister(conn.id()).await.is_none());
    }

    #[tokio::test]
    async fn test_unregister_cancels_session() {
        let registry = ConnectionRegistry::new();
        let (conn, _rx) = register_one(&registry, 4).await;
        conn.install_session(MonitoringSession::new(tokio::spawn(
            std::future::pending::<()>(),
        )));

        registry.unregister(conn.id()).await;
        assert!(!conn.has_session());
    }

    #[tokio::test]
    async fn test_sweep_probes_survivors() {
        let registry = ConnectionRegistry::new();
        let (conn, mut rx) = register_one(&registry, 4).await;

        let reaped = registry.sweep().await;
        assert_eq!(reaped, 0);
        assert_eq!(registry.len().await, 1);
        // Flag cleared and a probe queued
        assert!(!conn.is_alive());
        assert!(matches!(rx.try_recv().unwrap(), Outbound::Probe));
    }

    #[tokio::test]
    async fn test_silent_connection_reaped_on_second_sweep() {
        let registry = ConnectionRegistry::new();
        let (conn, _rx) = register_one(&registry, 4).await;

        // First sweep: survives (was alive on registration), gets probed
        assert_eq!(registry.sweep().await, 0);
        // No acknowledgment arrives; second sweep reaps it
        assert_eq!(registry.sweep().await, 1);
        assert!(registry.is_empty().await);
        assert!(!conn.is_open());
    }

    #[tokio::test]
    async fn test_acknowledged_connection_survives_sweeps() {
        let registry = ConnectionRegistry::new();
        let (conn, _rx) = register_one(&registry, 8).await;

        for _ in 0..3 {
            registry.sweep().await;
            registry.mark_alive(conn.id()).await;
        }
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_reaped_connection_session_cancelled() {
        let registry = ConnectionRegistry::new();
        let (conn, _rx) = register_one(&registry, 4).await;
        conn.install_session(MonitoringSession::new(tokio::spawn(
            std::future::pending::<()>(),
        )));

        registry.sweep().await;
        registry.sweep().await;
        assert!(!conn.has_session());
    }

    #[tokio::test]
    async fn test_sweep_only_reaps_silent_connections() {
        let registry = ConnectionRegistry::new();
        let (responsive, _rx1) = register_one(&registry, 8).await;
        let (_silent, _rx2) = register_one(&registry, 8).await;

        registry.sweep().await;
        registry.mark_alive(responsive.id()).await;
        let reaped = registry.sweep().await;

        assert_eq!(reaped, 1);
        assert_eq!(registry.len().await, 1);
        assert!(registry.get(responsive.id()).await.is_some());
    }
}
