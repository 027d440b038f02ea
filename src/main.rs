//! Marketplace Transaction Server - Main Application Entry Point
//!
//! This is a REST API server for a peer-to-peer marketplace's
//! transaction lifecycle: starting a transaction from a listing,
//! branching by payment process (free, preauthorize, postpay, PayU
//! checkout), handling the PayU gateway's asynchronous callback, and
//! recording shipping addresses and order-status transitions.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries)
//! - **Authentication**: member access tokens with SHA-256 hashing
//! - **Gateway**: PayU hosted checkout, SHA-512 request/response hashes
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool
//! 3. Run database migrations
//! 4. Build HTTP router with routes and middleware
//! 5. Start server on configured port

mod config;
mod db;
mod error;
mod handlers;
mod middleware;
mod models;
mod services;
mod state;

use tracing_subscriber::EnvFilter;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration
    let config = config::Config::from_env()?;
    config.validate_gateway()?;
    tracing::info!("Configuration loaded");

    // Create database pool
    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    // Run migrations
    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    let server_port = config.server_port;
    let state = AppState::new(pool, config);

    // Create authenticated routes (API endpoints)
    let authenticated_routes = Router::new()
        // Checkout planning
        .route(
            "/api/v1/listings/{id}/checkout",
            get(handlers::checkout::checkout_plan),
        )
        // Transaction lifecycle
        .route(
            "/api/v1/transactions",
            post(handlers::transactions::create_transaction),
        )
        .route(
            "/api/v1/transactions/{id}",
            get(handlers::transactions::get_transaction),
        )
        .route(
            "/api/v1/transactions/{id}/pickup",
            get(handlers::transactions::pickup),
        )
        .route(
            "/api/v1/transactions/{id}/seller-address",
            put(handlers::addresses::save_seller_address),
        )
        .route(
            "/api/v1/transactions/{id}/decline",
            post(handlers::transactions::decline_transaction),
        )
        // Address form helpers
        .route(
            "/api/v1/pincode/{pincode}",
            get(handlers::pincode::lookup_pincode),
        )
        // Apply authentication middleware to all routes in this group
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ));

    // Combine authenticated routes with public routes
    let app = Router::new()
        // Public routes (no authentication required)
        .route("/health", get(handlers::health::health_check))
        // The gateway posts here; the response hash is the authentication
        .route("/payu/callback", post(handlers::payu::payu_callback))
        // Merge authenticated routes
        .merge(authenticated_routes)
        // Add distributed tracing middleware for observability
        .layer(TraceLayer::new_for_http())
        // Share state with all handlers
        .with_state(state);

    // Bind to network address and start server
    let addr = format!("0.0.0.0:{server_port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Start serving HTTP requests
    axum::serve(listener, app).await?;

    Ok(())
}
