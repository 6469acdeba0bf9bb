//! Handler-level integration tests driving the built `axum::Router` with
//! `tower::ServiceExt::oneshot`, matching the teacher's
//! `tests/api_routes_test.rs` pattern.

use std::sync::Arc;

use airplay_hls_session::config::Config;
use airplay_hls_session::player::LoggingPlayer;
use airplay_hls_session::web::WebServer;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use plist::{Dictionary, Value};
use tower::ServiceExt;

fn test_config() -> Config {
    let mut config = Config::default();
    config.web.port = 0;
    config.session.lang = "en".to_string();
    config
}

fn uuid(tag: char) -> String {
    tag.to_string().repeat(36)
}

fn binary_plist(dict: Dictionary) -> Vec<u8> {
    let mut buf = Vec::new();
    plist::to_writer_binary(&mut buf, &Value::Dictionary(dict)).unwrap();
    buf
}

#[tokio::test]
async fn server_info_reports_expected_feature_bits() {
    let app = WebServer::test_router(test_config(), Arc::new(LoggingPlayer));

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/server-info")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(content_type, "text/x-apple-plist+xml");

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value: Value = plist::from_bytes(&body).unwrap();
    let dict = value.as_dictionary().unwrap();
    assert_eq!(dict.get("features").unwrap().as_unsigned_integer(), Some(0x27F));
    assert_eq!(dict.get("protovers").unwrap().as_string(), Some("1.0"));
    assert_eq!(dict.get("osBuildVersion").unwrap().as_string(), Some("12B435"));
}

#[tokio::test]
async fn play_without_session_header_is_rejected() {
    let app = WebServer::test_router(test_config(), Arc::new(LoggingPlayer));

    let mut dict = Dictionary::new();
    dict.insert("uuid".to_string(), Value::String(uuid('a')));
    dict.insert(
        "Content-Location".to_string(),
        Value::String("http://client:7000/x/master.m3u8".to_string()),
    );
    let body = binary_plist(dict);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/play")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn play_without_reverse_channel_is_bad_request() {
    // No `/reverse` upgrade has happened for this Apple session ID, so the
    // FCUP issuer has nowhere to write the initial request — spec.md SS4.F
    // step 7 / SS7: any /play failure responds 400.
    let app = WebServer::test_router(test_config(), Arc::new(LoggingPlayer));

    let mut dict = Dictionary::new();
    dict.insert("uuid".to_string(), Value::String(uuid('b')));
    dict.insert(
        "Content-Location".to_string(),
        Value::String("http://client:7000/x/master.m3u8".to_string()),
    );
    dict.insert("clientProcName".to_string(), Value::String("YouTube;".to_string()));
    let body = binary_plist(dict);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/play")
                .header("X-Apple-Session-ID", uuid('s'))
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn play_rejects_content_location_without_master_suffix() {
    let app = WebServer::test_router(test_config(), Arc::new(LoggingPlayer));

    let mut dict = Dictionary::new();
    dict.insert("uuid".to_string(), Value::String(uuid('c')));
    dict.insert(
        "Content-Location".to_string(),
        Value::String("http://client:7000/x/not-a-playlist".to_string()),
    );
    dict.insert("clientProcName".to_string(), Value::String("YouTube;".to_string()));
    let body = binary_plist(dict);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/play")
                .header("X-Apple-Session-ID", uuid('s'))
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn play_requires_client_proc_name() {
    // spec.md SS6 lists `clientProcName` as required alongside `uuid` and
    // `Content-Location`; only `Start-Position-Seconds` is optional.
    let app = WebServer::test_router(test_config(), Arc::new(LoggingPlayer));

    let mut dict = Dictionary::new();
    dict.insert("uuid".to_string(), Value::String(uuid('d')));
    dict.insert(
        "Content-Location".to_string(),
        Value::String("http://client:7000/x/master.m3u8".to_string()),
    );
    let body = binary_plist(dict);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/play")
                .header("X-Apple-Session-ID", uuid('s'))
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn play_failure_response_marks_the_connection_for_close() {
    // spec.md SS4.F step 7: any /play failure "marks disconnect" — the
    // observable, wire-level form of that mark is `Connection: close` on
    // the 400 response (see `web::responses::disconnect_response`).
    let app = WebServer::test_router(test_config(), Arc::new(LoggingPlayer));

    let mut dict = Dictionary::new();
    dict.insert("uuid".to_string(), Value::String(uuid('e')));
    dict.insert(
        "Content-Location".to_string(),
        Value::String("http://client:7000/x/master.m3u8".to_string()),
    );
    dict.insert("clientProcName".to_string(), Value::String("YouTube;".to_string()));
    let body = binary_plist(dict);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/play")
                .header("X-Apple-Session-ID", uuid('s'))
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers().get("connection").unwrap().to_str().unwrap(),
        "close"
    );
}

#[tokio::test]
async fn scrub_with_no_current_session_is_not_found() {
    let app = WebServer::test_router(test_config(), Arc::new(LoggingPlayer));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/scrub?position=12.5")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn set_property_rejects_unsupported_target() {
    let app = WebServer::test_router(test_config(), Arc::new(LoggingPlayer));

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/setProperty?somethingUnsupported")
                .body(Body::from(binary_plist(Dictionary::new())))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn set_property_accepts_noop_end_time_properties() {
    let app = WebServer::test_router(test_config(), Arc::new(LoggingPlayer));

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/setProperty?reverseEndTime")
                .body(Body::from(binary_plist(Dictionary::new())))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value: Value = plist::from_bytes(&body).unwrap();
    let dict = value.as_dictionary().unwrap();
    assert_eq!(dict.get("errorCode").unwrap().as_signed_integer(), Some(0));
}

#[tokio::test]
async fn fp_setup2_is_misdirected_request() {
    let app = WebServer::test_router(test_config(), Arc::new(LoggingPlayer));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/fp-setup2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::MISDIRECTED_REQUEST);
}

#[tokio::test]
async fn master_m3u8_with_no_current_session_is_not_found() {
    let app = WebServer::test_router(test_config(), Arc::new(LoggingPlayer));

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/master.m3u8")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
