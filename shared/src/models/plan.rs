//! Solar plan models

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A fully-typed solar plan recommendation, ready to persist.
///
/// Field names follow the JSON schema the generative model is asked to
/// produce, so a normalized draft serializes back into the same shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDraft {
    pub recommended_capacity_kw: f64,
    pub total_solar_panel: i64,
    /// Panel rating in watts
    pub panel_rating: f64,
    /// Tilt angle in degrees
    pub tilt_angle: f64,
    pub solar_panel_type: String,
    pub location: String,
    pub required_area_sq_m: f64,
    pub estimated_monthly_generation_kwh: f64,
    pub estimated_monthly_savings_inr: f64,
    pub estimated_cost_inr: f64,
    pub payback_period_years: f64,
    pub maintenance_advice: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Parameters collected from the user for plan generation.
///
/// The voice assistant forwards whatever the user said, so every parameter
/// is kept as raw JSON and only rendered into the prompt.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateProgramRequest {
    /// Monthly electricity units consumed
    #[serde(default)]
    pub units_consumed: Value,
    /// Shade condition on the roof
    #[serde(default)]
    pub shade: Value,
    /// Local dust or pollution condition
    #[serde(default)]
    pub weather_condition: Value,
    /// Snow or heavy rain months per year
    #[serde(default)]
    pub snow_cover: Value,
    /// Total electrical load of the house
    #[serde(default)]
    pub total_ele_load: Value,
    pub user_id: String,
}

/// Render a user-supplied parameter for display
pub fn display_parameter(value: &Value) -> String {
    match value {
        Value::Null => "not specified".to_string(),
        Value::String(s) if s.trim().is_empty() => "not specified".to_string(),
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}
