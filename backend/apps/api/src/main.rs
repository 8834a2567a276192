//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors.

use auth::{AnyBackend, AuthConfig, ContextRegistry, auth_router, with_client_context};
use axum::{
    http,
    http::{Method, header},
};
use platform::config::{env_parse, env_var};
use portal::{PortalConfig, portal_router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_PORT: u16 = 31113;
const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,portal=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let development = cfg!(debug_assertions);

    // Auth backend and configuration
    let backend = Arc::new(AnyBackend::from_env(development));
    let auth_config = if development {
        AuthConfig::development()
    } else {
        AuthConfig::default()
    }
    .with_env_overrides();

    tracing::info!(
        backend = backend.kind(),
        session_sync = ?auth_config.session_sync,
        registration_recovery = ?auth_config.registration_recovery,
        "Auth configured"
    );

    let settle_timeout = auth_config.guard_settle_timeout;
    let registry = Arc::new(ContextRegistry::new(backend, Arc::new(auth_config)));
    let _sweeper = registry.spawn_sweeper(SWEEP_INTERVAL);

    let portal_config = PortalConfig::default().with_env_overrides();

    // CORS configuration
    let frontend_origins = env_var("FRONTEND_ORIGINS")
        .unwrap_or_else(|| "http://localhost:40922,http://127.0.0.1:40922".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let routes = auth_router::<AnyBackend>()
        .merge(portal_router::<AnyBackend>(portal_config, settle_timeout));
    let app = with_client_context(routes, registry)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let port = env_parse("API_PORT", DEFAULT_PORT);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
