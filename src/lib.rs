//! # Aldenaire Kitchen
//!
//! Ordering backend for the Aldenaire Kitchen restaurant site: a menu
//! catalog, order placement with atomic line-item persistence, customer
//! reviews, and a contact form, all speaking JSON over HTTP.
//!
//! The order workflow is the core: validate the payload, resolve each line
//! against the catalog inside one transaction, price it from the catalog
//! (never the client's claimed price), and commit header plus lines
//! together or not at all.
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{
        HeaderName, HeaderValue, Method,
        header::{ACCEPT, AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE, ORIGIN},
    },
    routing::get,
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod contact;
pub mod database;
pub mod error;
pub mod menu;
pub mod models;
pub mod orders;
pub mod reviews;
pub mod routes;
pub mod state;
pub mod utils;

use config::Config;
use routes::{
    create_contact_handler, create_order_handler, create_review_handler, list_contact_handler,
    list_orders_handler, list_reviews_handler, menu_handler,
};
use state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/menu", get(menu_handler))
        .route(
            "/orders",
            get(list_orders_handler).post(create_order_handler),
        )
        .route(
            "/reviews",
            get(list_reviews_handler).post(create_review_handler),
        )
        .route(
            "/contact",
            get(list_contact_handler).post(create_contact_handler),
        )
        .layer(cors)
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            ACCEPT,
            ORIGIN,
            CACHE_CONTROL,
            HeaderName::from_static("x-requested-with"),
        ])
        .max_age(Duration::from_secs(60 * 60 * 24))
}

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = AppState::new().await;

    info!("Starting server...");
    let app = router(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
