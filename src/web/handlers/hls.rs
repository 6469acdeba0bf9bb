//! Local HLS channel: `GET /master.m3u8` and media-playlist GETs (spec.md
//! SS4.F).

use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::Response;

use crate::errors::AppError;
use crate::playlist;
use crate::web::handlers::current_session;
use crate::web::responses::m3u8_response;
use crate::web::AppState;

pub async fn master_m3u8(State(state): State<AppState>) -> Result<Response, AppError> {
    let session = current_session(&state).await?;
    let master = session
        .master_playlist()
        .await
        .ok_or_else(|| AppError::not_found("master playlist", session.playback_uuid()))?;
    Ok(m3u8_response(master))
}

/// Fallback route: any other GET is a media-playlist request keyed by
/// whatever path component the local player asks for (spec.md SS4.F "GET
/// /<any>").
pub async fn media_playlist(
    State(state): State<AppState>,
    method: Method,
    uri: axum::http::Uri,
) -> Result<Response, AppError> {
    if method != Method::GET {
        return Err(AppError::not_found("route", uri.path()));
    }

    let session = current_session(&state).await?;
    let playlist_text = {
        let guard = session.state().await;
        let media_store = guard
            .media_store
            .as_ref()
            .ok_or_else(|| AppError::not_found("media playlist", uri.path()))?;
        let item = media_store
            .lookup(uri.path())
            .ok_or_else(|| AppError::not_found("media playlist", uri.path()))?;
        item.playlist
            .clone()
            .ok_or_else(|| AppError::not_found("media playlist", uri.path()))?
    };

    let expanded = playlist::expand_condensed_uri(&playlist_text)?;
    Ok(m3u8_response(expanded))
}
