//! User profile sync from the auth provider

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Webhook event envelope
#[derive(Debug, Deserialize)]
pub struct ClerkEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Event types that carry a user payload to sync
pub const SYNCED_EVENTS: [&str; 2] = ["user.created", "user.updated"];

/// User object as delivered by the auth provider
#[derive(Debug, Clone, Deserialize)]
pub struct ClerkUser {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub email_addresses: Vec<ClerkEmailAddress>,
    pub primary_email_address_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClerkEmailAddress {
    pub id: Option<String>,
    pub email_address: String,
}

impl ClerkUser {
    /// `"{first} {last}"` with missing parts dropped
    pub fn display_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }

    /// The primary address when identified, otherwise the first listed
    pub fn primary_email(&self) -> Option<&str> {
        let primary = self.primary_email_address_id.as_deref().and_then(|primary| {
            self.email_addresses
                .iter()
                .find(|address| address.id.as_deref() == Some(primary))
        });

        primary
            .or_else(|| self.email_addresses.first())
            .map(|address| address.email_address.as_str())
    }
}

/// Synced user profile
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub clerk_id: String,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User service for profile sync
#[derive(Clone)]
pub struct UserService {
    db: PgPool,
}

impl UserService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Insert or refresh the profile for an auth provider user
    pub async fn upsert_from_clerk(&self, user: &ClerkUser) -> AppResult<UserProfile> {
        let email = user.primary_email().ok_or_else(|| AppError::Validation {
            field: "email_addresses".to_string(),
            message: "User has no email address".to_string(),
        })?;

        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO users (clerk_id, name, email, image)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (clerk_id) DO UPDATE
            SET name = EXCLUDED.name,
                email = EXCLUDED.email,
                image = EXCLUDED.image,
                updated_at = NOW()
            RETURNING id, clerk_id, name, email, image, created_at, updated_at
            "#,
        )
        .bind(&user.id)
        .bind(user.display_name())
        .bind(email)
        .bind(&user.image_url)
        .fetch_one(&self.db)
        .await?;

        tracing::info!("Synced user profile {}", profile.clerk_id);

        Ok(profile)
    }

    /// Get a profile by auth provider id
    pub async fn get_by_clerk_id(&self, clerk_id: &str) -> AppResult<UserProfile> {
        sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT id, clerk_id, name, email, image, created_at, updated_at
            FROM users
            WHERE clerk_id = $1
            "#,
        )
        .bind(clerk_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user(value: serde_json::Value) -> ClerkUser {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_display_name_trims_missing_parts() {
        let full = user(json!({ "id": "user_1", "first_name": "Asha", "last_name": "Patil" }));
        assert_eq!(full.display_name(), "Asha Patil");

        let first_only = user(json!({ "id": "user_1", "first_name": "Asha", "last_name": null }));
        assert_eq!(first_only.display_name(), "Asha");

        let neither = user(json!({ "id": "user_1" }));
        assert_eq!(neither.display_name(), "");
    }

    #[test]
    fn test_primary_email_preferred() {
        let clerk_user = user(json!({
            "id": "user_1",
            "primary_email_address_id": "idn_2",
            "email_addresses": [
                { "id": "idn_1", "email_address": "old@example.com" },
                { "id": "idn_2", "email_address": "asha@example.com" }
            ]
        }));
        assert_eq!(clerk_user.primary_email(), Some("asha@example.com"));
    }

    #[test]
    fn test_first_email_when_primary_unknown() {
        let clerk_user = user(json!({
            "id": "user_1",
            "primary_email_address_id": "idn_9",
            "email_addresses": [{ "id": "idn_1", "email_address": "first@example.com" }]
        }));
        assert_eq!(clerk_user.primary_email(), Some("first@example.com"));

        let no_email = user(json!({ "id": "user_1", "email_addresses": [] }));
        assert_eq!(no_email.primary_email(), None);
    }

    #[test]
    fn test_event_envelope() {
        let event: ClerkEvent = serde_json::from_value(json!({
            "type": "session.created",
            "object": "event",
            "data": { "id": "sess_1" }
        }))
        .unwrap();
        assert_eq!(event.event_type, "session.created");
        assert!(!SYNCED_EVENTS.contains(&event.event_type.as_str()));
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_upsert_refreshes_existing_profile(pool: PgPool) {
        let service = UserService::new(pool);
        let created = service
            .upsert_from_clerk(&user(json!({
                "id": "user_1",
                "first_name": "Asha",
                "email_addresses": [{ "id": "idn_1", "email_address": "asha@example.com" }]
            })))
            .await
            .unwrap();

        let updated = service
            .upsert_from_clerk(&user(json!({
                "id": "user_1",
                "first_name": "Asha",
                "last_name": "Patil",
                "image_url": "https://img.example.com/asha.png",
                "email_addresses": [{ "id": "idn_1", "email_address": "asha@example.com" }]
            })))
            .await
            .unwrap();

        assert_eq!(created.id, updated.id);
        assert_eq!(updated.name, "Asha Patil");
        let stored = service.get_by_clerk_id("user_1").await.unwrap();
        assert_eq!(stored.image.as_deref(), Some("https://img.example.com/asha.png"));
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_user_without_email_is_rejected(pool: PgPool) {
        let error = UserService::new(pool)
            .upsert_from_clerk(&user(json!({ "id": "user_2", "email_addresses": [] })))
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::Validation { .. }));
    }
}
