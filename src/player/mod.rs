//! Player callback surface (component G).
//!
//! The original implementation hands the session an opaque `void*` plus a
//! struct of function pointers to drive the native player process. The
//! rewrite replaces the opaque pointer with a tagged capability trait
//! (design note in spec.md SS9): anything that can play a local HLS URL,
//! report progress, and tear down on command implements [`PlayerCallbacks`].
//!
//! The actual native player integration is out of scope (spec.md SS1); the
//! default [`LoggingPlayer`] stands in for it so the rest of the subsystem
//! has something concrete to call.

use async_trait::async_trait;
use tracing::info;

/// Snapshot returned by `on_video_acquire_playback_info` (spec.md SS4.F
/// `/playback-info`, SS4.G).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlaybackInfo {
    pub duration: f32,
    pub position: f32,
    pub rate: f32,
    pub seek_start: f32,
    pub seek_duration: f32,
    pub ready_to_play: bool,
    pub playback_buffer_empty: bool,
    pub playback_buffer_full: bool,
    pub playback_likely_to_keep_up: bool,
}

/// Reason passed to `video_reset` (spec.md SS4.G, SS7
/// `player_reports_finished`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetReason {
    HlsShutdown,
}

/// Flags returned by `conn_teardown` describing what was torn down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeardownFlags {
    pub video: bool,
    pub audio: bool,
}

/// The capability set a [`crate::session::Session`] invokes to drive the
/// local media player (spec.md SS4.G).
#[async_trait]
pub trait PlayerCallbacks: Send + Sync {
    async fn on_video_play(&self, location: &str, start_position: f32);
    async fn on_video_scrub(&self, position: f32);
    async fn on_video_rate(&self, rate: f32);
    async fn on_video_stop(&self);
    async fn on_video_acquire_playback_info(&self) -> PlaybackInfo;
    /// Returns the last known playback position, to be stashed as the
    /// session's `resume_position_seconds`.
    async fn on_video_playlist_remove(&self) -> f32;
    async fn video_reset(&self, reason: ResetReason);
    async fn conn_reset(&self, cause: u8);
    async fn conn_teardown(&self) -> TeardownFlags;
}

/// Stand-in player that logs every callback instead of driving a real
/// native player process. Used as the crate's default capability until a
/// real player integration is wired in by an embedder.
#[derive(Debug, Default)]
pub struct LoggingPlayer;

#[async_trait]
impl PlayerCallbacks for LoggingPlayer {
    async fn on_video_play(&self, location: &str, start_position: f32) {
        info!(location, start_position, "on_video_play");
    }

    async fn on_video_scrub(&self, position: f32) {
        info!(position, "on_video_scrub");
    }

    async fn on_video_rate(&self, rate: f32) {
        info!(rate, "on_video_rate");
    }

    async fn on_video_stop(&self) {
        info!("on_video_stop");
    }

    async fn on_video_acquire_playback_info(&self) -> PlaybackInfo {
        PlaybackInfo::default()
    }

    async fn on_video_playlist_remove(&self) -> f32 {
        0.0
    }

    async fn video_reset(&self, reason: ResetReason) {
        info!(?reason, "video_reset");
    }

    async fn conn_reset(&self, cause: u8) {
        info!(cause, "conn_reset");
    }

    async fn conn_teardown(&self) -> TeardownFlags {
        TeardownFlags::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn logging_player_acquire_playback_info_defaults_to_zero() {
        let player = LoggingPlayer;
        let info = player.on_video_acquire_playback_info().await;
        assert_eq!(info, PlaybackInfo::default());
    }

    #[tokio::test]
    async fn logging_player_playlist_remove_returns_position() {
        let player = LoggingPlayer;
        assert_eq!(player.on_video_playlist_remove().await, 0.0);
    }
}
