//! PTTH/1.0 reverse-HTTP channel plumbing (component F support).
//!
//! `POST /reverse` upgrades a forward connection into a channel the server
//! writes FCUP requests on (spec.md SS4.F, SS6). The raw HTTP/1.1 upgrade
//! mechanics are provided by `hyper`/`axum` (the out-of-scope external
//! collaborator from spec.md SS1); this module only keeps track of which
//! channel belongs to which session and serializes writes onto it.

use std::collections::HashMap;
use std::sync::Arc;

use hyper::upgrade::Upgraded;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::errors::{AppError, FcupError};

/// One PTTH/1.0 reverse-HTTP connection, held for the lifetime of the
/// forward connection that negotiated it.
pub struct ReverseChannel {
    io: Mutex<Upgraded>,
}

impl ReverseChannel {
    pub fn new(io: Upgraded) -> Self {
        Self { io: Mutex::new(io) }
    }

    /// Write a request's head and body. Callers must snapshot whatever
    /// session state they need under their own lock first: this function
    /// never takes a session reference, so it cannot accidentally hold a
    /// session mutex across the socket write (spec.md SS5).
    pub async fn write_request(&self, head: Vec<u8>, body: Vec<u8>) -> Result<(), FcupError> {
        let mut io = self.io.lock().await;
        io.write_all(&head)
            .await
            .map_err(|e| FcupError::WriteFailed { message: e.to_string() })?;
        io.write_all(&body)
            .await
            .map_err(|e| FcupError::WriteFailed { message: e.to_string() })?;
        io.flush()
            .await
            .map_err(|e| FcupError::WriteFailed { message: e.to_string() })
    }
}

/// At most one PTTH connection per forward connection (spec.md SS3
/// invariants). The rewrite keys this by Apple session ID rather than a raw
/// connection handle: the forward connection object itself is the
/// out-of-scope external collaborator, but the session ID is a stable
/// identifier both the client and this subsystem already carry on every
/// request.
#[derive(Default)]
pub struct ReverseChannelRegistry {
    by_session: Mutex<HashMap<String, Option<Arc<ReverseChannel>>>>,
}

impl ReverseChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a slot for `apple_session_id` before the upgrade completes,
    /// so two concurrent `/reverse` requests for the same session can't
    /// both win the race (spec.md SS7 `reverse_already_upgraded`, SS8
    /// scenario 6).
    pub async fn reserve(&self, apple_session_id: String) -> Result<(), AppError> {
        let mut map = self.by_session.lock().await;
        if map.contains_key(&apple_session_id) {
            return Err(AppError::ReverseAlreadyUpgraded);
        }
        map.insert(apple_session_id, None);
        Ok(())
    }

    /// Fill a previously reserved slot once the upgrade has actually
    /// completed.
    pub async fn fill(&self, apple_session_id: &str, channel: Arc<ReverseChannel>) {
        self.by_session
            .lock()
            .await
            .insert(apple_session_id.to_string(), Some(channel));
    }

    pub async fn get(&self, apple_session_id: &str) -> Option<Arc<ReverseChannel>> {
        self.by_session
            .lock()
            .await
            .get(apple_session_id)
            .cloned()
            .flatten()
    }

    pub async fn release(&self, apple_session_id: &str) {
        self.by_session.lock().await.remove(apple_session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reserve_twice_is_a_protocol_error() {
        let registry = ReverseChannelRegistry::new();
        registry.reserve("session-a".to_string()).await.unwrap();
        let err = registry.reserve("session-a".to_string()).await.unwrap_err();
        assert!(matches!(err, AppError::ReverseAlreadyUpgraded));
    }

    #[tokio::test]
    async fn get_before_fill_is_none() {
        let registry = ReverseChannelRegistry::new();
        registry.reserve("session-b".to_string()).await.unwrap();
        assert!(registry.get("session-b").await.is_none());
    }

    #[tokio::test]
    async fn release_clears_the_slot_for_a_future_reserve() {
        let registry = ReverseChannelRegistry::new();
        registry.reserve("session-c".to_string()).await.unwrap();
        registry.release("session-c").await;
        registry.reserve("session-c".to_string()).await.unwrap();
    }
}
