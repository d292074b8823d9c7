//! ID generation utilities.

use uuid::Uuid;

/// Generate a fresh session identifier.
///
/// Session ids are random v4 UUIDs, so collisions are treated as protocol
/// violations rather than something to recover from.
pub fn session_id() -> String {
    Uuid::new_v4().to_string()
}

/// Check that a caller-supplied session id is well formed.
pub fn is_valid_session_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 128
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
