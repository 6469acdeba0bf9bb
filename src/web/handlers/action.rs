//! `POST /action` (spec.md SS4.F, SS8 scenarios 2 and 3).

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use plist::{Dictionary, Value};

use crate::errors::AppError;
use crate::media_store::MediaStore;
use crate::playlist;
use crate::session::Session;
use crate::web::extractors::{require_apple_session_id, Plist};
use crate::web::handlers::{current_session_for_action, issue_next_fcup_or_play};
use crate::web::plist_ext;
use crate::web::responses::empty_response;
use crate::web::AppState;

pub async fn action(
    State(state): State<AppState>,
    headers: HeaderMap,
    Plist(body): Plist,
) -> Result<Response, AppError> {
    let dict = plist_ext::as_dict(&body)?;
    let action_type = plist_ext::string(dict, "type")?;

    match action_type.as_str() {
        "playlistRemove" => handle_playlist_remove(&state, dict).await,
        "playlistInsert" => {
            tracing::info!("playlistInsert accepted but not implemented");
            Ok(empty_response(StatusCode::OK))
        }
        "unhandledURLResponse" => handle_unhandled_url_response(&state, &headers, dict).await,
        other => Err(AppError::validation(format!("unknown /action type {other:?}"))),
    }
}

async fn handle_playlist_remove(state: &AppState, dict: &Dictionary) -> Result<Response, AppError> {
    let params = plist_ext::dict_field(dict, "params")?;
    let item = plist_ext::dict_field(params, "item")?;
    let playback_uuid = plist_ext::string(item, "uuid")?;

    let index = state
        .registry
        .index_of(&playback_uuid)
        .await
        .ok_or_else(|| AppError::Registry(crate::errors::RegistryError::NoSuchSession {
            uuid: playback_uuid.clone(),
        }))?;
    let session = state
        .registry
        .get_by_index(index)
        .await
        .expect("index_of just returned this index");

    if state.registry.current().await == Some(index) {
        state.registry.clear_current_if(index).await;
        let last_position = session.player().on_video_playlist_remove().await;
        session.set_resume_position_seconds(last_position).await;
    }

    Ok(empty_response(StatusCode::OK))
}

async fn handle_unhandled_url_response(
    state: &AppState,
    headers: &HeaderMap,
    dict: &Dictionary,
) -> Result<Response, AppError> {
    let apple_session_id = require_apple_session_id(headers)?;
    let session = current_session_for_action(state, &apple_session_id).await?;

    let params = plist_ext::dict_field(dict, "params")?;
    let url = plist_ext::string(params, "FCUP_Response_URL")?;
    let raw_data = plist_ext::data(params, "FCUP_Response_Data")?;
    let _status_code = plist_ext::optional_uint(params, "FCUP_Response_StatusCode");
    let _request_id = plist_ext::optional_uint(params, "FCUP_Response_RequestID");
    let text = String::from_utf8(raw_data)
        .map_err(|_| AppError::validation("FCUP_Response_Data is not valid UTF-8"))?;

    if url.ends_with("/master.m3u8") {
        store_master_playlist(&session, &text).await?;
    } else {
        store_media_playlist(&session, &text).await?;
    }

    issue_next_fcup_or_play(state, &session).await?;
    Ok(empty_response(StatusCode::OK))
}

async fn store_master_playlist(session: &Arc<Session>, text: &str) -> Result<(), AppError> {
    let stored_language_name = session.language_name().await;
    let selection = playlist::select_master_playlist_language(
        text,
        stored_language_name.as_deref(),
        session.operator_lang(),
    )?;
    if selection.changed {
        session
            .set_language(selection.language_name.clone(), selection.language_code.clone())
            .await;
    }

    let uri_prefix = session
        .uri_prefix()
        .await
        .ok_or(crate::errors::SessionError::NoMediaStore)?;
    let uri_table =
        playlist::extract_media_uri_table(&selection.master_playlist, &uri_prefix)?;
    let rewritten = playlist::adjust_master_playlist(
        &selection.master_playlist,
        &uri_prefix,
        session.local_uri_prefix(),
    )?;
    let media_store = MediaStore::create(uri_table);
    session.store_master_playlist(rewritten, media_store).await;
    Ok(())
}

async fn store_media_playlist(session: &Arc<Session>, text: &str) -> Result<(), AppError> {
    let mut guard = session.state().await;
    let target_index = guard
        .next_uri_index
        .checked_sub(1)
        .ok_or_else(|| AppError::validation("no media playlist fetch was pending"))?;
    let media_store = guard
        .media_store
        .as_mut()
        .ok_or(crate::errors::SessionError::NoMediaStore)?;
    media_store
        .store(target_index, text.to_string())
        .map_err(AppError::validation)?;
    Ok(())
}
