//! Mission check endpoint.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use deconflict_core::{analyze, DeconflictError, MissionReport, MissionRequest, MissionStatus, SafetyRules};

use crate::config::Config;

#[derive(Debug, Default, Deserialize)]
pub struct CheckQuery {
    /// Safety buffer override, meters
    pub buffer: Option<f64>,
    /// Sampling step override, seconds
    pub dt: Option<f64>,
    pub use_3d: Option<bool>,
}

impl CheckQuery {
    fn rules(&self, defaults: &SafetyRules) -> SafetyRules {
        SafetyRules::new(
            self.buffer.unwrap_or(defaults.safety_buffer_m),
            self.dt.unwrap_or(defaults.sample_step_s),
            self.use_3d.unwrap_or(defaults.use_3d),
        )
    }
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub status: MissionStatus,
    pub report: MissionReport,
}

type ApiError = (StatusCode, Json<Value>);

pub async fn check_mission(
    State(config): State<Arc<Config>>,
    Query(query): Query<CheckQuery>,
    Json(payload): Json<MissionRequest>,
) -> Result<Json<CheckResponse>, ApiError> {
    let rules = query.rules(&config.default_rules);
    let mission_id = payload.mission.mission_id.clone();

    let outcome = tokio::task::spawn_blocking(move || {
        analyze(&payload.mission, &payload.flights, &rules)
    })
    .await
    .map_err(|err| {
        tracing::error!("Mission analysis task failed: {}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Mission analysis failed" })),
        )
    })?;

    match outcome {
        Ok((status, report)) => {
            tracing::info!(
                mission_id = %mission_id,
                status = %status,
                conflicts = report.conflicts.len(),
                "mission checked"
            );
            Ok(Json(CheckResponse { status, report }))
        }
        Err(err) => {
            tracing::warn!(mission_id = %mission_id, kind = err.kind(), "mission rejected: {}", err);
            Err(rejection(&err))
        }
    }
}

fn rejection(err: &DeconflictError) -> ApiError {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({
            "error": err.to_string(),
            "kind": err.kind()
        })),
    )
}
