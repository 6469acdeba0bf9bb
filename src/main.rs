use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use airplay_hls_session::config::Config;
use airplay_hls_session::player::{LoggingPlayer, PlayerCallbacks};
use airplay_hls_session::web::WebServer;

#[derive(Parser)]
#[command(name = "airplay-hls-session")]
#[command(version = "0.1.0")]
#[command(about = "AirPlay receiver HLS video session subsystem")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Operator's colon-separated preferred-language list (overrides config file)
    #[arg(short, long, value_name = "LANG")]
    lang: Option<String>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = if cli.log_level == "trace" {
        format!("airplay_hls_session={},tower_http=trace", cli.log_level)
    } else {
        format!("airplay_hls_session={}", cli.log_level)
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting AirPlay HLS session service v{}",
        env!("CARGO_PKG_VERSION")
    );

    std::env::set_var("CONFIG_FILE", &cli.config);
    let mut config = Config::load()?;
    info!("Configuration loaded from: {}", cli.config);

    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }
    if let Some(lang) = cli.lang {
        config.session.lang = lang;
    }

    let player: Arc<dyn PlayerCallbacks> = Arc::new(LoggingPlayer);
    let web_server = WebServer::new(config, player).await?;

    info!(
        "Starting web server on {}:{}",
        web_server.host(),
        web_server.port()
    );
    web_server.serve().await?;

    Ok(())
}
