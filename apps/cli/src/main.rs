mod args;
mod config;
mod dirs;

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use app_api::AppContext;
use http_api::HttpState;
use monitor_app::{AppState, ensure_app_data_dir};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn setup_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = args::parse_args().map_err(|err| {
        eprintln!("{err}");
        args::print_help();
        io::Error::new(io::ErrorKind::InvalidInput, "invalid arguments")
    })?;
    if args.help {
        args::print_help();
        return Ok(());
    }
    setup_logging(args.debug);

    let config = config::load_or_create().map_err(io::Error::other)?;
    if config.created {
        info!(
            path = %config.file.display(),
            port = config.config.port,
            "created default config"
        );
    }

    let data_dir = dirs::resolve_data_dir(args.data_dir).map_err(io::Error::other)?;
    info!(
        dir = %data_dir.paths.app_data_dir.display(),
        existing = data_dir.matched_existing,
        "using data dir"
    );
    let paths = data_dir.paths;
    ensure_app_data_dir(&paths).map_err(|err| io::Error::other(err.to_string()))?;

    // Transcript roots are resolved per request so that directories created
    // after startup are picked up.
    let app_state = AppState::new(paths.db_path.clone(), None);
    app_state
        .initialize()
        .map_err(|err| io::Error::other(format!("failed to initialize database: {err}")))?;

    let mut context = AppContext::new(app_state, paths.app_data_dir);
    context.stream_recent_limit = config.config.recent_limit;
    let token_interval = Duration::from_secs(config.config.token_update_interval_secs);
    let state = HttpState::new(context, token_interval);
    let router = http_api::router(state);

    let port = args.port.unwrap_or(config.config.port);
    let (listener, actual_port, used_fallback) = bind_port(port).await?;
    if used_fallback {
        warn!(port, actual_port, "configured port unavailable; using fallback");
    }

    info!("hook monitor listening on http://127.0.0.1:{actual_port}");
    info!("stream endpoint ws://127.0.0.1:{actual_port}/stream");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("hook monitor stopped");
    Ok(())
}

async fn bind_port(port: u16) -> Result<(tokio::net::TcpListener, u16, bool), io::Error> {
    if port == 0 {
        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let actual_port = listener.local_addr()?.port();
        return Ok((listener, actual_port, false));
    }

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => Ok((listener, port, false)),
        Err(_) => {
            let listener =
                tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
            let actual_port = listener.local_addr()?.port();
            Ok((listener, actual_port, true))
        }
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}
