use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Lifecycle of an external connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Listener attached, messages are processed
    Open,
    /// Peer disconnected; terminal
    Closed,
}

/// Per-connection message counters, shared with in-flight handler tasks
#[derive(Debug, Default)]
pub struct SessionCounters {
    received: AtomicU64,
    responded: AtomicU64,
    dropped: AtomicU64,
}

impl SessionCounters {
    pub fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_responded(&self) {
        self.responded.fetch_add(1, Ordering::Relaxed);
    }

    /// A response could not be delivered because the channel was closed
    pub fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    pub fn responded(&self) -> u64 {
        self.responded.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Scope of one accepted external connection
#[derive(Debug, Clone)]
pub struct ConnectionSession {
    /// Unique session identifier
    pub session_id: String,

    /// Remote address of the peer
    pub peer: String,

    /// Timestamp when the connection was accepted (Unix epoch milliseconds)
    pub opened_at: u64,

    state: SessionState,
    counters: Arc<SessionCounters>,
}

impl ConnectionSession {
    /// Create a new session in the `Open` state
    pub fn new(session_id: String, peer: String, opened_at: u64) -> Self {
        Self {
            session_id,
            peer,
            opened_at,
            state: SessionState::Open,
            counters: Arc::new(SessionCounters::default()),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open
    }

    /// Enter the terminal state. Closing twice is a no-op.
    pub fn close(&mut self) {
        self.state = SessionState::Closed;
    }

    /// Counters handle for tasks that outlive a single read
    pub fn counters(&self) -> Arc<SessionCounters> {
        Arc::clone(&self.counters)
    }

    /// Age of the session in milliseconds at `now`
    pub fn age_millis(&self, now: u64) -> u64 {
        now.saturating_sub(self.opened_at)
    }
}
