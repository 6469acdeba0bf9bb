//! `POST /fp-setup2` (spec.md SS4.F, SS7 `fp_version_unsupported`).
//!
//! Only FairPlay v3 is implemented by the mirroring/keying subsystem (out
//! of scope here per spec.md SS1); v2 setup is rejected outright.

use axum::http::StatusCode;

pub async fn fp_setup2() -> StatusCode {
    StatusCode::MISDIRECTED_REQUEST
}
