use axum::{routing::post, Router};

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sign-up", post(crate::handlers::auth::register))
        .route("/login", post(crate::handlers::auth::login))
}
