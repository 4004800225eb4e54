//! Broadcast service: the transport-facing surface of the realtime layer
//!
//! The service owns the connection registry and the session manager. The
//! transport (websocket handlers) calls into it on connect, on every
//! inbound message, on probe acknowledgments, and on disconnect; the
//! service replies by queueing envelopes on the connection's outbound
//! channel.

use crate::connection::{Connection, ConnectionId, Outbound};
use crate::monitor::SessionManager;
use crate::protocol::{Envelope, InboundMessage};
use crate::registry::ConnectionRegistry;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use verity_domain::result::now_millis;

/// Default interval between liveness sweeps
pub const DEFAULT_HEARTBEAT_SECS: u64 = 30;

/// Default outbound channel capacity per connection
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 32;

/// Coordinates connections, monitoring sessions, and fan-out
pub struct BroadcastService {
    registry: Arc<ConnectionRegistry>,
    sessions: SessionManager,
    heartbeat: Duration,
    outbound_capacity: usize,
}

impl BroadcastService {
    /// Create a service over the given session manager
    pub fn new(sessions: SessionManager, heartbeat: Duration, outbound_capacity: usize) -> Self {
        Self {
            registry: Arc::new(ConnectionRegistry::new()),
            sessions,
            heartbeat,
            outbound_capacity,
        }
    }

    /// The shared connection registry
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Per-connection outbound channel capacity
    pub fn outbound_capacity(&self) -> usize {
        self.outbound_capacity
    }

    /// Register a new connection and greet it.
    ///
    /// The caller owns the receiving half of the outbound channel and is
    /// responsible for draining it to the transport.
    pub async fn connect(&self, sender: mpsc::Sender<Outbound>) -> Arc<Connection> {
        let connection = self.registry.register(sender).await;
        connection.send_event(Envelope::ConnectionEstablished {
            connection_id: connection.id().to_string(),
            timestamp: now_millis(),
        });
        info!(conn_id = %connection.id(), "connection established");
        connection
    }

    /// Handle one inbound text message from a connection.
    ///
    /// A malformed or unrecognized message never tears the connection
    /// down; the peer gets an ERROR envelope and the connection stays up.
    pub async fn handle_message(&self, connection: &Arc<Connection>, raw: &str) {
        match InboundMessage::parse(raw) {
            Ok(InboundMessage::StartMonitoring) => {
                if self.sessions.stop(connection) {
                    connection.send_event(Envelope::monitoring_stopped());
                }
                self.sessions.start(connection);
                connection.send_event(Envelope::monitoring_started());
            }
            Ok(InboundMessage::StopMonitoring) => {
                if self.sessions.stop(connection) {
                    connection.send_event(Envelope::monitoring_stopped());
                }
            }
            Ok(InboundMessage::Ping) => {
                connection.mark_alive();
                connection.send_event(Envelope::Pong);
            }
            Err(e) => {
                debug!(conn_id = %connection.id(), "rejecting inbound message: {e}");
                connection.send_event(Envelope::Error {
                    message: e.to_string(),
                });
            }
        }
    }

    /// Record a transport-level probe acknowledgment (pong frame)
    pub async fn handle_probe_ack(&self, id: ConnectionId) {
        self.registry.mark_alive(id).await;
    }

    /// Tear down a connection: stop its session and drop it from the
    /// registry.
    pub async fn disconnect(&self, id: ConnectionId) {
        if let Some(connection) = self.registry.unregister(id).await {
            info!(conn_id = %connection.id(), "connection closed");
        }
    }

    /// Fan an envelope out to every open connection.
    ///
    /// Returns how many connections accepted the message. Slow peers with
    /// full channels are skipped, never waited on.
    pub async fn broadcast(&self, envelope: Envelope) -> usize {
        let mut delivered = 0;
        for connection in self.registry.connections().await {
            if connection.send_event(envelope.clone()) {
                delivered += 1;
            }
        }
        delivered
    }

    /// Spawn the background heartbeat loop.
    ///
    /// Every interval it reaps connections that never acknowledged the
    /// previous probe, then probes the survivors.
    pub fn spawn_heartbeat(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let service = Arc::clone(self);
        let period = self.heartbeat;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let reaped = service.registry.sweep().await;
                if reaped > 0 {
                    warn!(reaped, "reaped unresponsive connections");
                }
            }
        })
    }
}
