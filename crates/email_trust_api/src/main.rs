//! Email Trust API Server
//!
//! Accepts an email address and reports whether its domain can receive mail,
//! publishes SPF and DMARC records, is a disposable provider, and where its
//! primary mail server is located.

use anyhow::Context;
use axum::{extract::DefaultBodyLimit, http::Method, Router};
use email_trust_core::{build_http_client, DomainAnalyzer};
use std::{sync::Arc, time::Duration};
use tokio::{net::TcpListener, signal, sync::oneshot};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api_handler;
mod config;
mod routes;

use config::{load_config, AppConfig};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<DomainAnalyzer>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config().context("Failed to load configuration")?;

    init_tracing(&config);

    info!("Starting Email Trust API v{}", env!("CARGO_PKG_VERSION"));

    let analyzer_config = config.upstream.analyzer_config();
    let client = build_http_client(&analyzer_config).context("Failed to build HTTP client")?;
    let analyzer = DomainAnalyzer::from_config(&analyzer_config, client);

    let app_state = AppState {
        analyzer: Arc::new(analyzer),
    };
    let app = create_router(app_state, &config);

    let listener = TcpListener::bind((config.server.host.as_str(), config.server.port))
        .await
        .with_context(|| {
            format!(
                "Failed to bind {}:{}",
                config.server.host, config.server.port
            )
        })?;

    info!("Server listening on {}", listener.local_addr()?);
    info!("Validation API: POST http://{}/validate", listener.local_addr()?);

    serve_with_grace(
        listener,
        app,
        Duration::from_secs(config.server.shutdown_timeout_secs),
    )
    .await
}

/// Create the main application router
fn create_router(state: AppState, config: &AppConfig) -> Router {
    let mut router = routes::build_routes(Arc::new(state))
        .layer(DefaultBodyLimit::max(config.security.max_body_size_bytes))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    if config.security.enable_cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([axum::http::header::CONTENT_TYPE]),
        );
    }

    router.layer(CompressionLayer::new())
}

/// Initialize tracing and logging
fn init_tracing(config: &AppConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.observability.log_level.clone().into());

    if config.observability.json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Serve until a shutdown signal arrives, then give in-flight requests at
/// most `grace` to finish before returning.
async fn serve_with_grace(listener: TcpListener, app: Router, grace: Duration) -> anyhow::Result<()> {
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.await;
            })
            .await
    });

    tokio::select! {
        result = &mut server => {
            result.context("Server task failed")?.context("Server error")?;
            return Ok(());
        }
        _ = shutdown_signal() => {}
    }

    let _ = stop_tx.send(());

    match tokio::time::timeout(grace, server).await {
        Ok(result) => {
            result.context("Server task failed")?.context("Server error")?;
            info!("Server shut down gracefully");
        }
        Err(_) => {
            warn!(
                "In-flight requests did not finish within {:?}; abandoning them",
                grace
            );
        }
    }

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
