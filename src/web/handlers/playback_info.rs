//! `GET /playback-info` (spec.md SS4.F, SS6).

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use plist::{Dictionary, Value};

use crate::errors::AppError;
use crate::player::ResetReason;
use crate::web::handlers::current_session;
use crate::web::responses::{disconnect_response, empty_response, xml_plist_response};
use crate::web::AppState;

pub async fn playback_info(State(state): State<AppState>) -> Result<Response, AppError> {
    let session = current_session(&state).await?;
    let info = session.player().on_video_acquire_playback_info().await;

    if info.duration == -1.0 {
        session.mark_disconnected().await;
        session.player().video_reset(ResetReason::HlsShutdown).await;
        return Ok(disconnect_response(StatusCode::OK));
    }
    if info.position == -1.0 {
        return Ok(empty_response(StatusCode::OK));
    }

    let mut loaded_range = Dictionary::new();
    loaded_range.insert("start".to_string(), Value::Real(info.position as f64));
    loaded_range.insert(
        "duration".to_string(),
        Value::Real((info.duration - info.position) as f64),
    );

    let mut seekable_range = Dictionary::new();
    seekable_range.insert("start".to_string(), Value::Real(info.seek_start as f64));
    seekable_range.insert("duration".to_string(), Value::Real(info.seek_duration as f64));

    let mut dict = Dictionary::new();
    dict.insert("duration".to_string(), Value::Real(info.duration as f64));
    dict.insert("position".to_string(), Value::Real(info.position as f64));
    dict.insert("rate".to_string(), Value::Real(info.rate as f64));
    dict.insert("readyToPlay".to_string(), Value::Boolean(info.ready_to_play));
    dict.insert(
        "playbackBufferEmpty".to_string(),
        Value::Boolean(info.playback_buffer_empty),
    );
    dict.insert(
        "playbackBufferFull".to_string(),
        Value::Boolean(info.playback_buffer_full),
    );
    dict.insert(
        "playbackLikelyToKeepUp".to_string(),
        Value::Boolean(info.playback_likely_to_keep_up),
    );
    dict.insert(
        "loadedTimeRanges".to_string(),
        Value::Array(vec![Value::Dictionary(loaded_range)]),
    );
    dict.insert(
        "seekableTimeRanges".to_string(),
        Value::Array(vec![Value::Dictionary(seekable_range)]),
    );

    Ok(xml_plist_response(StatusCode::OK, Value::Dictionary(dict)))
}
