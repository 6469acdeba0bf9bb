//! Request extractors specific to this subsystem's wire format.

use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::HeaderMap;
use plist::Value;

use crate::errors::AppError;

/// A request body decoded as a property list (binary or XML — the codec
/// autodetects the encoding, per spec.md SS1's external plist collaborator).
pub struct Plist(pub Value);

#[async_trait]
impl<S> FromRequest<S> for Plist
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::validation(format!("failed to read request body: {e}")))?;
        let value = Value::from_reader(std::io::Cursor::new(bytes))?;
        Ok(Plist(value))
    }
}

/// Read the required `X-Apple-Session-ID` header (spec.md SS3, SS4.F).
pub fn require_apple_session_id(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .get("X-Apple-Session-ID")
        .ok_or_else(|| AppError::validation("missing X-Apple-Session-ID header"))?
        .to_str()
        .map_err(|_| AppError::validation("X-Apple-Session-ID header is not valid UTF-8"))
        .map(str::to_string)
}
