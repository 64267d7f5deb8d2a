use std::net::SocketAddr;

use axum::http::{header, HeaderName, HeaderValue, Method};
use dotenvy::dotenv;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use team_polls::{
    config::Config,
    db,
    middleware::identity::{MEMBER_HEADER, TEAM_HEADER},
    routes, state,
};

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("team_polls=info,tower_http=info")),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let store = match db::connection::init_store(&config).await {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to initialize storage: {}", e);
            std::process::exit(1);
        }
    };

    let app_state = state::AppState::new(store);

    let origin = config.cors_origin.parse::<HeaderValue>().unwrap_or_else(|_| {
        error!("Failed to parse CORS origin: {}", config.cors_origin);
        std::process::exit(1);
    });

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::USER_AGENT,
            HeaderName::from_static(TEAM_HEADER),
            HeaderName::from_static(MEMBER_HEADER),
            HeaderName::from_static("x-requested-with"),
        ]);

    let app = routes::app(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_addr.parse().unwrap_or_else(|_| {
        error!("Failed to parse SERVER_ADDR: {}", config.server_addr);
        std::process::exit(1);
    });

    info!(%addr, cors_origin = %config.cors_origin, storage = ?config.storage, "server starting");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind to address {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
