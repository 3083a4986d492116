//! Route definitions for the Solar Planner platform

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Routes called by external services, mounted at the root
pub fn integration_routes() -> Router<AppState> {
    Router::new()
        // Auth provider user sync (signed, not session authenticated)
        .route("/clerk-webhook", post(handlers::handle_clerk_webhook))
        // Voice assistant plan generation
        .route("/vapi/generate-program", post(handlers::generate_program))
}

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        .merge(protected_routes(state))
}

/// Session-authenticated routes
fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/me", get(handlers::get_profile))
        .route("/location/reverse", get(handlers::reverse_geocode))
        .nest("/weather", weather_routes())
        .nest("/plans", plan_routes())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Weather record routes
fn weather_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::get_weather).put(handlers::submit_location),
        )
        .route("/exists", get(handlers::weather_exists))
}

/// Solar plan routes
fn plan_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_plans))
        .route("/active", get(handlers::get_active_plan))
}
