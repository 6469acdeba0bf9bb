pub mod action;
pub mod control;
pub mod fp_setup;
pub mod hls;
pub mod play;
pub mod playback_info;
pub mod property;
pub mod reverse;
pub mod server_info;

use std::sync::Arc;

use crate::errors::AppError;
use crate::session::Session;
use crate::web::AppState;

/// Fetch the registry's `current` session (spec.md SS3), the one local HLS
/// GETs and player-control endpoints implicitly address.
///
/// A session marked disconnected (spec.md SS4.F step 7,
/// SS7 `player_reports_finished`) is treated as gone for the purposes of
/// every handler routed through here: spec.md SS5 requires its in-flight
/// FCUP responses and further commands be "discarded without effect on
/// player state" once marked, so this is where that discard actually
/// happens rather than leaving the flag unread.
pub(crate) async fn current_session(state: &AppState) -> Result<Arc<Session>, AppError> {
    let index = state
        .registry
        .current()
        .await
        .ok_or_else(|| AppError::not_found("session", "current"))?;
    let session = state
        .registry
        .get_by_index(index)
        .await
        .ok_or_else(|| AppError::not_found("session", "current"))?;
    if session.is_disconnected().await {
        return Err(AppError::not_found("session", "current"));
    }
    Ok(session)
}

/// Resolve the session a `/action` request belongs to. Unlike `/play`,
/// `/action`'s `unhandledURLResponse` schema (spec.md SS6) carries no
/// `playback_uuid`, so correlation falls back to the session ID every
/// forward request carries.
pub(crate) async fn current_session_for_action(
    state: &AppState,
    apple_session_id: &str,
) -> Result<Arc<Session>, AppError> {
    let session = state
        .registry
        .find_by_apple_session_id(apple_session_id)
        .await
        .ok_or_else(|| {
            AppError::Registry(crate::errors::RegistryError::NoSuchSession {
                uuid: apple_session_id.to_string(),
            })
        })?;
    if session.is_disconnected().await {
        return Err(AppError::Registry(crate::errors::RegistryError::NoSuchSession {
            uuid: apple_session_id.to_string(),
        }));
    }
    Ok(session)
}

/// Issue the next pending FCUP request for `session`, or — once every media
/// playlist has been fetched — hand off to the player (spec.md SS4.F
/// `/action` `unhandledURLResponse`, SS8 scenario 3).
pub(crate) async fn issue_next_fcup_or_play(
    state: &AppState,
    session: &Arc<Session>,
) -> Result<(), AppError> {
    let (next_index, total, uri) = {
        let guard = session.state().await;
        let store = guard
            .media_store
            .as_ref()
            .ok_or(crate::errors::SessionError::NoMediaStore)?;
        let uri = store.get(guard.next_uri_index).map(|item| item.uri.clone());
        (guard.next_uri_index, store.len(), uri)
    };

    if next_index < total {
        let uri = uri.expect("next_uri_index < len implies a media item exists");
        let apple_session_id = session.apple_session_id().await;
        let channel = state
            .reverse_channels
            .get(&apple_session_id)
            .await
            .ok_or(crate::errors::FcupError::NoReverseChannel)?;
        let request_id = session.next_fcup_request_id().await;
        crate::fcup::send_fcup_request(&channel, &apple_session_id, request_id, &uri).await?;
        session.set_next_uri_index(next_index + 1).await;
    } else {
        let start_position = session.start_position_seconds().await;
        session
            .player()
            .on_video_play(session.playback_location(), start_position)
            .await;
    }
    Ok(())
}
