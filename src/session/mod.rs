//! A single playback session's mutable state (component C, "AirplayVideo"
//! in the original implementation).
//!
//! Construction fixes the identities and prefixes that the spec calls
//! immutable (`playback_uuid`, `local_uri_prefix`, `playback_location`);
//! everything else lives behind one `tokio::sync::Mutex` per session, held
//! only across the operation that needs it — never across a reverse-channel
//! socket write (see [`crate::fcup`]).

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::errors::SessionError;
use crate::media_store::MediaStore;
use crate::player::PlayerCallbacks;

/// Mutable fields guarded by [`Session`]'s mutex.
#[derive(Debug, Default)]
pub struct SessionState {
    pub apple_session_id: String,
    pub uri_prefix: Option<String>,
    pub language_name: Option<String>,
    pub language_code: Option<String>,
    pub start_position_seconds: f32,
    pub resume_position_seconds: f32,
    pub fcup_request_id: u64,
    pub next_uri_index: usize,
    pub master_playlist: Option<String>,
    pub media_store: Option<MediaStore>,
    pub disconnected: bool,
}

/// One playback session (spec.md SS3 Session/AirplayVideo).
pub struct Session {
    playback_uuid: String,
    local_uri_prefix: String,
    playback_location: String,
    lang: String,
    player: Arc<dyn PlayerCallbacks>,
    state: Mutex<SessionState>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("playback_uuid", &self.playback_uuid)
            .field("local_uri_prefix", &self.local_uri_prefix)
            .field("playback_location", &self.playback_location)
            .finish_non_exhaustive()
    }
}

fn require_uuid_len(field: &'static str, value: &str) -> Result<(), SessionError> {
    if value.len() != 36 {
        return Err(SessionError::InvalidUuidLength {
            field,
            len: value.len(),
        });
    }
    Ok(())
}

impl Session {
    pub fn new(
        playback_uuid: String,
        local_http_port: u16,
        lang: String,
        player: Arc<dyn PlayerCallbacks>,
    ) -> Result<Self, SessionError> {
        require_uuid_len("playback_uuid", &playback_uuid)?;
        let local_uri_prefix = format!("http://localhost:{local_http_port}");
        let playback_location = format!("{local_uri_prefix}/master.m3u8");
        Ok(Self {
            playback_uuid,
            local_uri_prefix,
            playback_location,
            lang,
            player,
            state: Mutex::new(SessionState::default()),
        })
    }

    /// The capability surface driving the local media player (component G).
    pub fn player(&self) -> &Arc<dyn PlayerCallbacks> {
        &self.player
    }

    pub fn playback_uuid(&self) -> &str {
        &self.playback_uuid
    }

    pub fn local_uri_prefix(&self) -> &str {
        &self.local_uri_prefix
    }

    pub fn playback_location(&self) -> &str {
        &self.playback_location
    }

    pub fn operator_lang(&self) -> &str {
        &self.lang
    }

    /// Direct access to the guarded mutable state, for handlers performing
    /// several related reads/writes under one lock acquisition.
    pub async fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().await
    }

    pub async fn set_apple_session_id(&self, apple_session_id: String) -> Result<(), SessionError> {
        require_uuid_len("apple_session_id", &apple_session_id)?;
        self.state.lock().await.apple_session_id = apple_session_id;
        Ok(())
    }

    pub async fn apple_session_id(&self) -> String {
        self.state.lock().await.apple_session_id.clone()
    }

    pub async fn set_uri_prefix(&self, uri_prefix: String) {
        self.state.lock().await.uri_prefix = Some(uri_prefix);
    }

    pub async fn uri_prefix(&self) -> Option<String> {
        self.state.lock().await.uri_prefix.clone()
    }

    pub async fn language_name(&self) -> Option<String> {
        self.state.lock().await.language_name.clone()
    }

    pub async fn set_language(&self, name: String, code: String) {
        let mut state = self.state.lock().await;
        state.language_name = Some(name);
        state.language_code = Some(code);
    }

    pub async fn start_position_seconds(&self) -> f32 {
        self.state.lock().await.start_position_seconds
    }

    pub async fn set_start_position_seconds(&self, value: f32) {
        self.state.lock().await.start_position_seconds = value;
    }

    pub async fn resume_position_seconds(&self) -> f32 {
        self.state.lock().await.resume_position_seconds
    }

    pub async fn set_resume_position_seconds(&self, value: f32) {
        self.state.lock().await.resume_position_seconds = value;
    }

    /// Increment and return the next FCUP request ID (monotonic per
    /// session, matching `get_next_FCUP_RequestID`'s pre-increment).
    pub async fn next_fcup_request_id(&self) -> u64 {
        let mut state = self.state.lock().await;
        state.fcup_request_id += 1;
        state.fcup_request_id
    }

    pub async fn next_uri_index(&self) -> usize {
        self.state.lock().await.next_uri_index
    }

    pub async fn set_next_uri_index(&self, value: usize) {
        self.state.lock().await.next_uri_index = value;
    }

    pub async fn store_master_playlist(&self, master_playlist: String, media_store: MediaStore) {
        let mut state = self.state.lock().await;
        state.master_playlist = Some(master_playlist);
        state.media_store = Some(media_store);
        state.next_uri_index = 0;
    }

    pub async fn master_playlist(&self) -> Option<String> {
        self.state.lock().await.master_playlist.clone()
    }

    pub async fn mark_disconnected(&self) {
        self.state.lock().await.disconnected = true;
    }

    pub async fn is_disconnected(&self) -> bool {
        self.state.lock().await.disconnected
    }

    /// Duration of the session's stored media, used by the registry's
    /// advertisement-pruning eviction policy. Zero if no media is stored
    /// yet.
    pub async fn stored_duration_seconds(&self) -> f32 {
        self.state
            .lock()
            .await
            .media_store
            .as_ref()
            .and_then(|store| store.get(0))
            .map(|item| item.duration)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::LoggingPlayer;

    fn uuid(tag: char) -> String {
        tag.to_string().repeat(36)
    }

    fn player() -> Arc<dyn PlayerCallbacks> {
        Arc::new(LoggingPlayer)
    }

    #[test]
    fn rejects_non_36_byte_uuid() {
        let err = Session::new("short".to_string(), 7100, "en".to_string(), player()).unwrap_err();
        assert!(matches!(err, SessionError::InvalidUuidLength { .. }));
    }

    #[tokio::test]
    async fn local_prefix_and_playback_location_derived_from_port() {
        let session = Session::new(uuid('a'), 7100, "en".to_string(), player()).unwrap();
        assert_eq!(session.local_uri_prefix(), "http://localhost:7100");
        assert_eq!(
            session.playback_location(),
            "http://localhost:7100/master.m3u8"
        );
    }

    #[tokio::test]
    async fn fcup_request_id_is_monotonic() {
        let session = Session::new(uuid('b'), 7100, "en".to_string(), player()).unwrap();
        assert_eq!(session.next_fcup_request_id().await, 1);
        assert_eq!(session.next_fcup_request_id().await, 2);
    }
}
