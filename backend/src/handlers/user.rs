//! HTTP handlers for the user profile

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::{user::UserProfile, UserService};
use crate::AppState;

/// Get the current user's synced profile
pub async fn get_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<UserProfile>> {
    let service = UserService::new(state.db);
    let profile = service.get_by_clerk_id(&current_user.0.user_id).await?;
    Ok(Json(profile))
}
