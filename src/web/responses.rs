//! Response helpers shared across handlers (component F).
//!
//! Three response shapes recur through the subsystem: an XML property list
//! (forward-HTTP control responses, spec.md SS4.F), an M3U8 playlist body
//! (the local HLS channel, spec.md SS4.F), and an empty status-only body
//! (`errorCode`-less acks and 4xx rejections).

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use plist::Value;

/// Serialize `value` as an XML plist with the
/// `text/x-apple-plist+xml` content type spec.md SS4.F specifies for every
/// forward-HTTP plist response.
pub fn xml_plist_response(status: StatusCode, value: Value) -> Response {
    let mut buf = Vec::new();
    if let Err(err) = plist::to_writer_xml(&mut buf, &value) {
        tracing::error!(error = %err, "failed to serialize plist response");
        return (StatusCode::INTERNAL_SERVER_ERROR, "plist serialization failed").into_response();
    }
    (status, [(header::CONTENT_TYPE, "text/x-apple-plist+xml")], buf).into_response()
}

/// Serve an M3U8 playlist body with the headers spec.md SS4.F mandates for
/// the local HLS channel (`GET /master.m3u8` and media-playlist GETs).
pub fn m3u8_response(body: String) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/x-mpegURL; charset=utf-8")
        .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .header("Access-Control-Allow-Headers", "Content-type")
        .header(header::DATE, http_date_now())
        .body(Body::from(body))
        .expect("static headers and a String body always build")
}

/// An empty, `Content-Length: 0` acknowledgement — used for control
/// endpoints (`/scrub`, `/rate`, `/stop`, resumed `/play`, `playlistRemove`)
/// that have no body to return.
pub fn empty_response(status: StatusCode) -> Response {
    Response::builder()
        .status(status)
        .header(header::CONTENT_LENGTH, "0")
        .body(Body::empty())
        .expect("static headers and an empty body always build")
}

/// An empty response carrying `Connection: close` — the wire-level
/// counterpart of a session being "marked disconnect" (spec.md SS4.F step 7
/// `unsupported_content_location`, SS7 `player_reports_finished`). The
/// original implementation's `http_response_set_disconnect` tells the HTTP
/// layer to close the underlying TCP connection once this response has
/// gone out; `Connection: close` is the equivalent instruction for the
/// `hyper` server this crate's HTTP layer is built on.
pub fn disconnect_response(status: StatusCode) -> Response {
    Response::builder()
        .status(status)
        .header(header::CONTENT_LENGTH, "0")
        .header(header::CONNECTION, "close")
        .body(Body::empty())
        .expect("static headers and an empty body always build")
}

fn http_date_now() -> String {
    Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
