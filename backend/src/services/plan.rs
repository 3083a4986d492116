//! Solar plan generation and lifecycle
//!
//! A user has at most one active plan. Creating a plan deactivates the
//! previous ones in the same transaction, serialized per user with an
//! advisory lock; superseded plans are kept as history.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use shared::{normalize_plan, GenerateProgramRequest, PlanDraft};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::external::GeminiClient;
use crate::services::prompt::build_prompt;
use crate::services::weather::WeatherService;

/// Persisted solar plan
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SolarPlan {
    pub id: Uuid,
    pub user_id: String,
    pub recommended_capacity_kw: f64,
    pub total_solar_panel: i64,
    pub panel_rating: f64,
    pub tilt_angle: f64,
    pub solar_panel_type: String,
    pub location: String,
    pub required_area_sq_m: f64,
    pub estimated_monthly_generation_kwh: f64,
    pub estimated_monthly_savings_inr: f64,
    pub estimated_cost_inr: f64,
    pub payback_period_years: f64,
    pub maintenance_advice: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deactivated_at: Option<DateTime<Utc>>,
}

/// A newly generated plan as returned to the caller
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedPlan {
    pub plan_id: Uuid,
    pub plan: PlanDraft,
}

const PLAN_COLUMNS: &str = "id, user_id, recommended_capacity_kw, total_solar_panel, panel_rating, \
     tilt_angle, solar_panel_type, location, required_area_sq_m, \
     estimated_monthly_generation_kwh, estimated_monthly_savings_inr, estimated_cost_inr, \
     payback_period_years, maintenance_advice, notes, is_active, created_at, deactivated_at";

/// Plan service
#[derive(Clone)]
pub struct PlanService {
    db: PgPool,
}

impl PlanService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Generate a plan from the user's weather record and answers, then make
    /// it the user's active plan
    pub async fn generate(
        &self,
        request: &GenerateProgramRequest,
        model: &GeminiClient,
    ) -> AppResult<GeneratedPlan> {
        let record = WeatherService::new(self.db.clone())
            .find_record(&request.user_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("Weather data for the given user ID".to_string())
            })?;

        let prompt = build_prompt(request, &record.monthly_summaries, &record.location_label);
        let text = model.generate(&prompt).await?;
        let raw = parse_model_json(&text)?;
        let draft = normalize_plan(&raw);

        let plan = self.create_active_plan(&request.user_id, &draft).await?;

        Ok(GeneratedPlan {
            plan_id: plan.id,
            plan: draft,
        })
    }

    /// Store a draft as the user's only active plan
    pub async fn create_active_plan(&self, user_id: &str, draft: &PlanDraft) -> AppResult<SolarPlan> {
        let mut tx = self.db.begin().await?;

        // Serialize concurrent supersessions for the same user
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let deactivated = sqlx::query(
            r#"
            UPDATE solar_plans
            SET is_active = FALSE, deactivated_at = clock_timestamp()
            WHERE user_id = $1 AND is_active
            "#,
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let plan = sqlx::query_as::<_, SolarPlan>(&format!(
            r#"
            INSERT INTO solar_plans (
                user_id, recommended_capacity_kw, total_solar_panel, panel_rating, tilt_angle,
                solar_panel_type, location, required_area_sq_m, estimated_monthly_generation_kwh,
                estimated_monthly_savings_inr, estimated_cost_inr, payback_period_years,
                maintenance_advice, notes, is_active, created_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, TRUE,
                clock_timestamp()
            )
            RETURNING {}
            "#,
            PLAN_COLUMNS
        ))
        .bind(user_id)
        .bind(draft.recommended_capacity_kw)
        .bind(draft.total_solar_panel)
        .bind(draft.panel_rating)
        .bind(draft.tilt_angle)
        .bind(&draft.solar_panel_type)
        .bind(&draft.location)
        .bind(draft.required_area_sq_m)
        .bind(draft.estimated_monthly_generation_kwh)
        .bind(draft.estimated_monthly_savings_inr)
        .bind(draft.estimated_cost_inr)
        .bind(draft.payback_period_years)
        .bind(&draft.maintenance_advice)
        .bind(&draft.notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            "Created plan {} for {} (superseded {})",
            plan.id,
            user_id,
            deactivated
        );

        Ok(plan)
    }

    /// All plans of a user, newest first
    pub async fn list_plans(&self, user_id: &str) -> AppResult<Vec<SolarPlan>> {
        let plans = sqlx::query_as::<_, SolarPlan>(&format!(
            "SELECT {} FROM solar_plans WHERE user_id = $1 ORDER BY created_at DESC",
            PLAN_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(plans)
    }

    /// The user's active plan
    pub async fn active_plan(&self, user_id: &str) -> AppResult<SolarPlan> {
        sqlx::query_as::<_, SolarPlan>(&format!(
            "SELECT {} FROM solar_plans WHERE user_id = $1 AND is_active",
            PLAN_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Active plan".to_string()))
    }
}

/// Parse the model's answer as JSON, tolerating a Markdown code fence
pub fn parse_model_json(text: &str) -> AppResult<Value> {
    serde_json::from_str(strip_code_fence(text)).map_err(|e| {
        AppError::upstream(
            "Generative model",
            format!("response is not valid JSON: {}", e),
        )
    })
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string (```json), which may share a line with the body
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };

    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}
