use axum::extract::State;
use axum::{http::Method, response::Json, routing::get, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

mod config;
mod database;
mod dtos;
mod errors;
mod handlers;
mod models;
mod routes;
mod services;
mod state;

use config::AppConfig;
use database::connection::{ensure_indexes, get_db_client};
use services::mail_service::EmailService;
use state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = AppConfig::from_env();

    let db = match get_db_client(&config).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("❌ Failed to connect to MongoDB: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = ensure_indexes(&db, config.reset.otp_ttl).await {
        tracing::warn!("Failed to create indexes: {}", e);
    }

    let addr = SocketAddr::new(
        config.host.parse().expect("HOST must be an IP address"),
        config.port,
    );

    let mailer = Arc::new(EmailService::new(config.mail.clone()));
    let app_state = AppState::new(db, config, mailer);

    let app = build_router(app_state);
    start_server(app, addr).await;
}

fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .nest(
            "/api/v1/admin",
            routes::auth::routes().merge(routes::auth_otp_routes::auth_otp_routes()),
        )
        .layer(cors)
        .with_state(app_state)
}

async fn start_server(app: Router, addr: SocketAddr) {
    tracing::info!("🚀 Server starting on {}", addr);

    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("server error: {}", e);
            }
        }
        Err(e) => {
            tracing::error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    }
}

async fn root_handler() -> &'static str {
    "🍽️ Welcome to Project Menucard"
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    use mongodb::bson::doc;

    let db_status = match state.db.run_command(doc! {"ping": 1}).await {
        Ok(_) => "connected",
        Err(_) => "disconnected",
    };

    Json(json!({
        "status": "healthy",
        "database": db_status,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
