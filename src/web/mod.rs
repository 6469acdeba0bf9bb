//! Web layer: forward-HTTP protocol handlers, the PTTH/1.0 reverse-HTTP
//! upgrade, and the local HLS channel (component F).
//!
//! All three ride the same `axum::Router` and listener: the "reverse"
//! channel is just a forward connection that `/reverse` upgraded in place,
//! and the local HLS endpoints are served from the same port the forward
//! handlers are (see DESIGN.md for why this collapses spec.md's
//! per-session local port into one shared one).

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::player::PlayerCallbacks;
use crate::registry::SessionRegistry;
use crate::reverse_channel::ReverseChannelRegistry;

pub mod extractors;
pub mod handlers;
pub mod plist_ext;
pub mod responses;

/// Shared state every handler sees (component D's registry, component E's
/// reverse-channel table, and the player capability every session is
/// constructed with).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<SessionRegistry>,
    pub reverse_channels: Arc<ReverseChannelRegistry>,
    pub player: Arc<dyn PlayerCallbacks>,
}

pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub async fn new(config: Config, player: Arc<dyn PlayerCallbacks>) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", config.web.host, config.web.port).parse()?;
        let registry = Arc::new(SessionRegistry::new(
            config.session.registry_capacity,
            config.session.min_video_duration_seconds,
        ));
        let state = AppState {
            config: Arc::new(config),
            registry,
            reverse_channels: Arc::new(ReverseChannelRegistry::new()),
            player,
        };

        let app = Self::create_router(state);
        Ok(Self { app, addr })
    }

    /// Build the router without binding a listener. Used by integration
    /// tests (`tests/`) that exercise handlers with
    /// `tower::ServiceExt::oneshot`, matching the teacher's
    /// `tests/api_routes_test.rs` pattern.
    pub fn test_router(config: Config, player: Arc<dyn PlayerCallbacks>) -> Router {
        let registry = Arc::new(SessionRegistry::new(
            config.session.registry_capacity,
            config.session.min_video_duration_seconds,
        ));
        let state = AppState {
            config: Arc::new(config),
            registry,
            reverse_channels: Arc::new(ReverseChannelRegistry::new()),
            player,
        };
        Self::create_router(state)
    }

    fn create_router(state: AppState) -> Router {
        Router::new()
            // Forward-HTTP protocol handlers (spec.md SS6).
            .route("/server-info", get(handlers::server_info::server_info))
            .route("/scrub", post(handlers::control::scrub))
            .route("/rate", post(handlers::control::rate))
            .route("/stop", post(handlers::control::stop))
            .route("/setProperty", put(handlers::property::set_property))
            .route("/getProperty", get(handlers::property::get_property))
            .route("/fp-setup2", post(handlers::fp_setup::fp_setup2))
            .route("/reverse", post(handlers::reverse::reverse))
            .route("/play", post(handlers::play::play))
            .route("/action", post(handlers::action::action))
            .route("/playback-info", get(handlers::playback_info::playback_info))
            // Local HLS channel (spec.md SS4.F): master playlist on its own
            // route, every other GET falls through to the media-playlist
            // lookup keyed by request path.
            .route("/master.m3u8", get(handlers::hls::master_m3u8))
            .fallback(handlers::hls::media_playlist)
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    pub async fn serve(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        axum::serve(listener, self.app).await?;
        Ok(())
    }

    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}
