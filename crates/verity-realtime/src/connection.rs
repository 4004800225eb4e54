//! Per-connection state
//!
//! A `Connection` owns everything specific to one peer: the outbound sink,
//! the liveness flag the heartbeat sweep toggles, and the monitoring
//! session slot. The session handle lives on the connection itself so
//! teardown cannot leave an orphaned recurring task behind.

use crate::protocol::Envelope;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

/// Opaque connection identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Generate a fresh identity
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// What travels over a connection's outbound channel
#[derive(Debug, Clone)]
pub enum Outbound {
    /// A protocol envelope, serialized by the transport layer
    Event(Envelope),
    /// Liveness probe; the transport maps this to a ping frame
    Probe,
}

/// An active monitoring session's task handle
#[derive(Debug)]
pub struct MonitoringSession {
    handle: JoinHandle<()>,
}

impl MonitoringSession {
    pub(crate) fn new(handle: JoinHandle<()>) -> Self {
        Self { handle }
    }

    fn abort(&self) {
        self.handle.abort();
    }
}

/// A live persistent connection
pub struct Connection {
    id: ConnectionId,
    sender: mpsc::Sender<Outbound>,
    open: AtomicBool,
    alive: AtomicBool,
    session_generation: AtomicU64,
    session: Mutex<Option<MonitoringSession>>,
}

impl Connection {
    pub(crate) fn new(id: ConnectionId, sender: mpsc::Sender<Outbound>) -> Self {
        Self {
            id,
            sender,
            open: AtomicBool::new(true),
            alive: AtomicBool::new(true),
            session_generation: AtomicU64::new(0),
            session: Mutex::new(None),
        }
    }

    /// This connection's identity
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queue an outbound item without blocking.
    ///
    /// Returns false if the connection is closed or its channel is full -
    /// a slow peer loses messages rather than stalling the sender.
    pub fn send(&self, outbound: Outbound) -> bool {
        if !self.is_open() {
            return false;
        }
        match self.sender.try_send(outbound) {
            Ok(()) => true,
            Err(e) => {
                debug!(conn_id = %self.id, "dropping outbound message: {e}");
                false
            }
        }
    }

    /// Queue a protocol envelope
    pub fn send_event(&self, envelope: Envelope) -> bool {
        self.send(Outbound::Event(envelope))
    }

    /// Whether the transport is still considered open
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Relaxed)
    }

    /// Whether a probe acknowledgment arrived since the last sweep
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }

    /// Record a probe acknowledgment
    pub fn mark_alive(&self) {
        self.alive.store(true, Ordering::Relaxed);
    }

    /// Clear the liveness flag ahead of the next probe
    pub(crate) fn clear_alive(&self) {
        self.alive.store(false, Ordering::Relaxed);
    }

    /// Whether a monitoring session is currently installed
    pub fn has_session(&self) -> bool {
        self.session.lock().unwrap().is_some()
    }

    /// Bump the session generation; tasks from earlier generations must
    /// discard their in-flight results
    pub(crate) fn bump_session_generation(&self) -> u64 {
        self.session_generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// The current session generation
    pub(crate) fn current_session_generation(&self) -> u64 {
        self.session_generation.load(Ordering::SeqCst)
    }

    /// Install a session, aborting any previous one
    pub(crate) fn install_session(&self, session: MonitoringSession) {
        let mut slot = self.session.lock().unwrap();
        if let Some(old) = slot.replace(session) {
            old.abort();
        }
    }

    /// Cancel the active session, if any. Returns whether one existed.
    pub(crate) fn cancel_session(&self) -> bool {
        let taken = self.session.lock().unwrap().take();
        match taken {
            Some(session) => {
                session.abort();
                true
            }
            None => false,
        }
    }

    /// Force the connection closed: cancel the session and refuse further
    /// sends. The transport notices when the outbound channel drops.
    pub(crate) fn close(&self) {
        self.open.store(false, Ordering::Relaxed);
        self.cancel_session();
    }
}
