//! `POST /play` (spec.md SS4.F, SS8 scenarios 1 and 4).

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use plist::Value;

use crate::errors::AppError;
use crate::session::Session;
use crate::web::extractors::{require_apple_session_id, Plist};
use crate::web::plist_ext;
use crate::web::responses::{disconnect_response, empty_response};
use crate::web::AppState;

/// `clientProcName` values this subsystem has been validated against; other
/// values are still served, just logged (spec.md SS4.F step 4, SPEC_FULL.md
/// SS3).
const SUPPORTED_CLIENT_PROC_NAMES: &[&str] = &["YouTube;"];

pub async fn play(
    State(state): State<AppState>,
    headers: HeaderMap,
    Plist(body): Plist,
) -> Response {
    match handle_play(&state, &headers, &body).await {
        Ok(response) => response,
        Err(err) => {
            // spec.md SS4.F step 7 / SS7 `unsupported_content_location`:
            // any failure in /play marks disconnect and tears the
            // connection down. `Connection: close` is the observable,
            // wire-level form of that mark (see `disconnect_response`).
            state.player.conn_reset(2).await;
            tracing::error!(error = %err, "/play failed");
            disconnect_response(StatusCode::BAD_REQUEST)
        }
    }
}

async fn handle_play(
    state: &AppState,
    headers: &HeaderMap,
    body: &Value,
) -> Result<Response, AppError> {
    let apple_session_id = require_apple_session_id(headers)?;
    let dict = plist_ext::as_dict(body)?;
    let playback_uuid = plist_ext::string(dict, "uuid")?;

    if let Some(session) = state.registry.get_by_uuid(&playback_uuid).await {
        session.set_apple_session_id(apple_session_id).await?;
        let resume_position = session.resume_position_seconds().await;
        let start_position = session.start_position_seconds().await;
        let position = resume_position.max(start_position);
        session
            .player()
            .on_video_play(session.playback_location(), position)
            .await;
        return Ok(empty_response(StatusCode::OK));
    }

    let content_location = plist_ext::string(dict, "Content-Location")?;
    let client_proc_name = plist_ext::string(dict, "clientProcName")?;
    if !SUPPORTED_CLIENT_PROC_NAMES.contains(&client_proc_name.as_str()) {
        tracing::warn!(client_proc_name = %client_proc_name, "clientProcName not in supported list");
    }
    let start_position_seconds =
        plist_ext::optional_real(dict, "Start-Position-Seconds").unwrap_or(0.0);

    if !content_location.ends_with("/master.m3u8") {
        return Err(AppError::UnsupportedContentLocation { content_location });
    }
    let uri_prefix = content_location
        .strip_suffix("/master.m3u8")
        .expect("checked above")
        .to_string();

    let session = Arc::new(Session::new(
        playback_uuid,
        state.config.web.port,
        state.config.session.lang.clone(),
        state.player.clone(),
    )?);
    session.set_apple_session_id(apple_session_id.clone()).await?;
    session.set_uri_prefix(uri_prefix).await;
    session.set_start_position_seconds(start_position_seconds).await;

    state.registry.insert_new(session.clone()).await?;

    if let Err(err) = issue_initial_fcup_request(&state, &session, &apple_session_id, &content_location).await {
        session.mark_disconnected().await;
        return Err(err);
    }

    Ok(empty_response(StatusCode::OK))
}

async fn issue_initial_fcup_request(
    state: &AppState,
    session: &Arc<Session>,
    apple_session_id: &str,
    content_location: &str,
) -> Result<(), AppError> {
    let request_id = session.next_fcup_request_id().await;
    let channel = state
        .reverse_channels
        .get(apple_session_id)
        .await
        .ok_or(crate::errors::FcupError::NoReverseChannel)?;
    crate::fcup::send_fcup_request(&channel, apple_session_id, request_id, content_location).await?;
    Ok(())
}
