//! WebAssembly module for the Solar Planner platform
//!
//! Provides client-side computation for:
//! - Monthly aggregation of archive weather data
//! - Normalization of generated solar plans
//! - Coordinate validation before submission

use serde_json::Value;
use validator::Validate;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;

/// Aggregate an archive `daily` object (as JSON) into monthly summaries (as JSON)
pub fn aggregate_series_json(daily_json: &str) -> Result<String, String> {
    let series: DailySeries =
        serde_json::from_str(daily_json).map_err(|e| format!("Invalid daily series JSON: {}", e))?;
    let aggregation = shared::aggregate_series(&series).map_err(|e| e.to_string())?;

    if aggregation.skipped_days > 0 {
        log_warning(&format!(
            "Skipped {} days with missing weather values",
            aggregation.skipped_days
        ));
    }

    serde_json::to_string(&aggregation.summaries).map_err(|e| e.to_string())
}

/// Normalize generated plan text (as JSON) into a complete plan (as JSON)
pub fn normalize_plan_json(plan_json: &str) -> Result<String, String> {
    let raw: Value =
        serde_json::from_str(plan_json).map_err(|e| format!("Invalid plan JSON: {}", e))?;
    serde_json::to_string(&shared::normalize_plan(&raw)).map_err(|e| e.to_string())
}

/// Aggregate daily archive data into an array of monthly summaries
#[wasm_bindgen(js_name = aggregateDailySeries)]
pub fn aggregate_daily_series(daily_json: &str) -> Result<JsValue, JsValue> {
    let summaries = aggregate_series_json(daily_json).map_err(|e| JsValue::from_str(&e))?;
    js_sys::JSON::parse(&summaries)
}

/// Normalize a generated solar plan
#[wasm_bindgen(js_name = normalizeSolarPlan)]
pub fn normalize_solar_plan(plan_json: &str) -> Result<JsValue, JsValue> {
    let plan = normalize_plan_json(plan_json).map_err(|e| JsValue::from_str(&e))?;
    js_sys::JSON::parse(&plan)
}

/// Check coordinates are within valid latitude/longitude bounds
#[wasm_bindgen(js_name = isValidLocation)]
pub fn is_valid_location(latitude: f64, longitude: f64) -> bool {
    LocationInput {
        latitude,
        longitude,
    }
    .validate()
    .is_ok()
}

#[cfg(target_arch = "wasm32")]
fn log_warning(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

#[cfg(not(target_arch = "wasm32"))]
fn log_warning(_message: &str) {}
