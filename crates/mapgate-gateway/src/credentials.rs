//! Credentials bound to sessions.

use dashmap::DashMap;
use mapgate_core::SecretString;
use tracing::debug;

/// Process-wide map from session id to the bearer credential the client
/// presented for it.
///
/// Entries live exactly as long as their session; the gateway removes them
/// on teardown.
#[derive(Default)]
pub struct CredentialStore {
    credentials: DashMap<String, SecretString>,
}

impl CredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a credential to a session, replacing any earlier one.
    pub fn set(&self, session_id: &str, credential: SecretString) {
        let replaced = self
            .credentials
            .insert(session_id.to_string(), credential)
            .is_some();
        debug!(session_id, replaced, "Bound session credential");
    }

    /// The credential bound to a session, if any.
    pub fn get(&self, session_id: &str) -> Option<SecretString> {
        self.credentials.get(session_id).map(|c| c.value().clone())
    }

    /// Drop a session's credential. Unknown ids are ignored.
    pub fn remove(&self, session_id: &str) {
        self.credentials.remove(session_id);
    }

    /// Number of bound credentials.
    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }
}
