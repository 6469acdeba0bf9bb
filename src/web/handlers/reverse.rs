//! `POST /reverse` — the PTTH/1.0 upgrade (spec.md SS4.F, SS6, SS8 scenario
//! 6).

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Response;

use crate::errors::AppError;
use crate::reverse_channel::ReverseChannel;
use crate::web::extractors::require_apple_session_id;
use crate::web::AppState;

pub async fn reverse(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
) -> Result<Response, AppError> {
    let apple_session_id = require_apple_session_id(&headers)?;
    let purpose = headers
        .get("X-Apple-Purpose")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let connection = headers
        .get(header::CONNECTION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let upgrade = headers
        .get(header::UPGRADE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    tracing::info!(
        apple_session_id = %apple_session_id,
        purpose,
        connection,
        upgrade,
        "reverse channel upgrade requested"
    );

    // Reserve the slot synchronously so two concurrent `/reverse` calls for
    // the same session can't both win the race before either upgrade
    // completes (spec.md SS8 scenario 6).
    state.reverse_channels.reserve(apple_session_id.clone()).await?;

    let on_upgrade = hyper::upgrade::on(request);
    let registry = state.reverse_channels.clone();
    let session_id_for_task = apple_session_id.clone();
    tokio::spawn(async move {
        match on_upgrade.await {
            Ok(upgraded) => {
                let channel = Arc::new(ReverseChannel::new(upgraded));
                registry.fill(&session_id_for_task, channel).await;
            }
            Err(err) => {
                tracing::error!(error = %err, "reverse channel upgrade failed");
                registry.release(&session_id_for_task).await;
            }
        }
    });

    Ok(Response::builder()
        .status(StatusCode::SWITCHING_PROTOCOLS)
        .header(header::CONNECTION, "Upgrade")
        .header(header::UPGRADE, "PTTH/1.0")
        .body(Body::empty())
        .expect("static headers and an empty body always build"))
}
