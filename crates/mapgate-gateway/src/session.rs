//! Gateway session management.

use crate::error::GatewayError;
use crate::Result;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use mapgate_core::id::is_valid_session_id;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// A frame pushed onto a session's stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Path the client posts its messages to.
    Endpoint(String),

    /// A serialized JSON-RPC message.
    Message(String),
}

/// Write side of one client's stream.
///
/// The read side is handed to the transport when the handle is created.
/// Cancelling the handle ends that stream.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    sender: mpsc::Sender<Frame>,
    closed: CancellationToken,
    opened_at: DateTime<Utc>,
}

impl SessionHandle {
    /// Create a handle and the receiver its frames arrive on.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Frame>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let handle = Self {
            sender,
            closed: CancellationToken::new(),
            opened_at: Utc::now(),
        };
        (handle, receiver)
    }

    /// Token cancelled once the session is closed.
    pub fn closed_token(&self) -> CancellationToken {
        self.closed.clone()
    }

    /// Whether the session has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled() || self.sender.is_closed()
    }

    async fn deliver(&self, frame: Frame) -> bool {
        if self.is_closed() {
            return false;
        }
        tokio::select! {
            sent = self.sender.send(frame) => sent.is_ok(),
            _ = self.closed.cancelled() => false,
        }
    }
}

/// Process-wide map from session id to its open stream.
pub struct SessionRegistry {
    sessions: DashMap<String, SessionHandle>,
    max_sessions: usize,
}

impl SessionRegistry {
    /// Create a registry admitting at most `max_sessions` open sessions.
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            max_sessions,
        }
    }

    /// Register a new session.
    ///
    /// An id that is already registered is a protocol violation and is
    /// rejected rather than overwritten.
    pub fn open(&self, session_id: &str, handle: SessionHandle) -> Result<()> {
        if !is_valid_session_id(session_id) {
            return Err(GatewayError::InvalidParams(format!(
                "Invalid session id: {:?}",
                session_id
            )));
        }
        if self.sessions.len() >= self.max_sessions {
            return Err(GatewayError::TooManySessions(self.max_sessions));
        }

        match self.sessions.entry(session_id.to_string()) {
            Entry::Occupied(_) => Err(GatewayError::DuplicateSession(session_id.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(handle);
                info!(session_id, "Session opened");
                Ok(())
            }
        }
    }

    /// The live handle for a session.
    pub fn get(&self, session_id: &str) -> Option<SessionHandle> {
        self.sessions
            .get(session_id)
            .map(|entry| entry.value().clone())
            .filter(|handle| !handle.is_closed())
    }

    /// Deliver a frame on a session's stream.
    ///
    /// `SessionNotFound` means the client is gone; callers drop the frame.
    pub async fn send(&self, session_id: &str, frame: Frame) -> Result<()> {
        let handle = self
            .get(session_id)
            .ok_or_else(|| GatewayError::SessionNotFound(session_id.to_string()))?;

        if handle.deliver(frame).await {
            Ok(())
        } else {
            Err(GatewayError::SessionNotFound(session_id.to_string()))
        }
    }

    /// Remove a session and end its stream. Returns whether it was open.
    pub fn close(&self, session_id: &str) -> bool {
        match self.sessions.remove(session_id) {
            Some((_, handle)) => {
                handle.closed.cancel();
                let open_secs = (Utc::now() - handle.opened_at).num_seconds();
                info!(session_id, open_secs, "Session closed");
                true
            }
            None => {
                debug!(session_id, "Session already closed");
                false
            }
        }
    }

    /// Whether a session is registered and open.
    pub fn contains(&self, session_id: &str) -> bool {
        self.get(session_id).is_some()
    }

    /// Ids of all registered sessions.
    pub fn ids(&self) -> Vec<String> {
        self.sessions.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Number of registered sessions.
    pub fn count(&self) -> usize {
        self.sessions.len()
    }
}
