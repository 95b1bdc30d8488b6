//! API routes for the deconfliction server.

pub mod check;

use crate::config::Config;
use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

pub fn routes() -> Router<Arc<Config>> {
    Router::new()
        .route("/health", get(health))
        .route("/check", post(check::check_mission))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}
