//! HTTP handlers for solar plan endpoints

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use serde::Serialize;
use shared::{GenerateProgramRequest, PlanDraft};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::{plan::SolarPlan, PlanService};
use crate::AppState;

/// Envelope returned by the voice assistant endpoint
#[derive(Debug, Serialize)]
pub struct ProgramResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ProgramData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramData {
    pub plan_id: Uuid,
    pub solar_plan: PlanDraft,
}

impl ProgramResponse {
    fn failure(status: StatusCode, error: impl Into<String>) -> (StatusCode, Json<Self>) {
        (
            status,
            Json(Self {
                success: false,
                data: None,
                error: Some(error.into()),
            }),
        )
    }
}

/// Generate a solar plan for a user
/// POST /vapi/generate-program
///
/// Called by the voice assistant with the user's answers. Every outcome is
/// reported in the `{success, data | error}` envelope.
pub async fn generate_program(
    State(state): State<AppState>,
    body: Bytes,
) -> (StatusCode, Json<ProgramResponse>) {
    let request: GenerateProgramRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!("Rejected generate-program payload: {}", e);
            return ProgramResponse::failure(
                StatusCode::BAD_REQUEST,
                format!("Invalid request body: {}", e),
            );
        }
    };

    tracing::info!("Generating solar plan for {}", request.user_id);

    let service = PlanService::new(state.db.clone());
    match service.generate(&request, &state.gemini).await {
        Ok(generated) => (
            StatusCode::OK,
            Json(ProgramResponse {
                success: true,
                data: Some(ProgramData {
                    plan_id: generated.plan_id,
                    solar_plan: generated.plan,
                }),
                error: None,
            }),
        ),
        Err(AppError::NotFound(_)) => ProgramResponse::failure(
            StatusCode::NOT_FOUND,
            "Weather data not found for the given user ID.",
        ),
        Err(e) => {
            tracing::error!("Error generating solar plan: {:?}", e);
            ProgramResponse::failure(StatusCode::INTERNAL_SERVER_ERROR, failure_message(&e))
        }
    }
}

/// Envelope text for a failed generation; internal detail stays in the logs
fn failure_message(error: &AppError) -> String {
    match error {
        AppError::DatabaseError(_) | AppError::Configuration(_) => {
            "Internal server error while generating the solar plan.".to_string()
        }
        other => other.to_string(),
    }
}

/// List the current user's plans, newest first
pub async fn list_plans(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<SolarPlan>>> {
    let service = PlanService::new(state.db);
    let plans = service.list_plans(&current_user.0.user_id).await?;
    Ok(Json(plans))
}

/// Get the current user's active plan
pub async fn get_active_plan(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<SolarPlan>> {
    let service = PlanService::new(state.db);
    let plan = service.active_plan(&current_user.0.user_id).await?;
    Ok(Json(plan))
}
