//! `POST /scrub`, `POST /rate`, `POST /stop` (spec.md SS4.F).

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Response;

use crate::errors::AppError;
use crate::web::handlers::current_session;
use crate::web::responses::empty_response;
use crate::web::AppState;

fn parse_query_f32(params: &HashMap<String, String>, key: &str) -> Result<f32, AppError> {
    params
        .get(key)
        .ok_or_else(|| AppError::validation(format!("missing query parameter {key:?}")))?
        .parse::<f32>()
        .map_err(|_| AppError::validation(format!("query parameter {key:?} is not a number")))
}

pub async fn scrub(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let position = parse_query_f32(&params, "position")?;
    let session = current_session(&state).await?;
    session.player().on_video_scrub(position).await;
    Ok(empty_response(StatusCode::OK))
}

pub async fn rate(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let rate = parse_query_f32(&params, "value")?;
    let session = current_session(&state).await?;
    session.player().on_video_rate(rate).await;
    Ok(empty_response(StatusCode::OK))
}

pub async fn stop(State(state): State<AppState>) -> Result<Response, AppError> {
    let session = current_session(&state).await?;
    session.player().on_video_stop().await;
    Ok(empty_response(StatusCode::OK))
}
