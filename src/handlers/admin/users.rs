// POST /api/admin/users, PUT /api/admin/users/me

use axum::extract::{rejection::JsonRejection, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::app::AppState;
use crate::auth::{Role, User};
use crate::error::ApiError;
use crate::middleware::{AdminSession, ApiResponse, ApiResult};
use crate::validation::{Checker, Validate, ValidationError};

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct NewUserInput {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NewUser {
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
}

impl Validate for NewUserInput {
    type Output = NewUser;

    fn validate(self) -> Result<NewUser, ValidationError> {
        let mut c = Checker::new();
        let email = c.email("email", self.email);
        let password = self.password.unwrap_or_default();
        if password.chars().count() < MIN_PASSWORD_LEN {
            c.fail("password", format!("Must be at least {} characters", MIN_PASSWORD_LEN));
        }
        // new back-office accounts are admins unless told otherwise
        let role = match self.role.as_deref().map(str::parse::<Role>) {
            None => Role::Admin,
            Some(Ok(role)) => role,
            Some(Err(reason)) => {
                c.fail("role", reason);
                Role::Anonymous
            }
        };
        c.finish(NewUser { email, password, role })
    }
}

/// Body of `PUT /api/admin/users/me`; bare metadata objects are accepted too
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MetadataUpdate {
    Wrapped { data: Map<String, Value> },
    Bare(Map<String, Value>),
}

impl MetadataUpdate {
    fn into_map(self) -> Map<String, Value> {
        match self {
            MetadataUpdate::Wrapped { data } => data,
            MetadataUpdate::Bare(map) => map,
        }
    }
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<NewUserInput>, JsonRejection>,
) -> ApiResult<User> {
    let Json(input) = body.map_err(|e| ApiError::invalid_json(e.body_text()))?;
    let new_user = input.validate().map_err(crate::services::WriteError::from)?;

    let user = state
        .identity
        .create_user(&new_user.email, &new_user.password, new_user.role)
        .await?;
    tracing::info!("created {} user {}", new_user.role, new_user.email);
    Ok(ApiResponse::success(user))
}

pub async fn update_me(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminSession>,
    body: Result<Json<MetadataUpdate>, JsonRejection>,
) -> ApiResult<User> {
    let Json(update) = body.map_err(|e| ApiError::invalid_json(e.body_text()))?;
    let user = state
        .identity
        .update_user(&admin.session.access_token, update.into_map())
        .await?;
    Ok(ApiResponse::success(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_defaults_to_admin() {
        let input = NewUserInput { email: Some("ops@example.com".into()), password: Some("longenough".into()), role: None };
        let user = input.validate().unwrap();
        assert_eq!(user.role, Role::Admin);
    }

    #[test]
    fn short_password_and_bad_role_are_reported_together() {
        let input = NewUserInput {
            email: Some("ops@example.com".into()),
            password: Some("short".into()),
            role: Some("superuser".into()),
        };
        let err = input.validate().unwrap_err();
        assert!(err.field_errors.contains_key("password"));
        assert!(err.field_errors.contains_key("role"));
    }

    #[test]
    fn metadata_accepts_wrapped_and_bare_bodies() {
        let wrapped: MetadataUpdate = serde_json::from_str(r#"{"data":{"display_name":"Ops"}}"#).unwrap();
        assert_eq!(wrapped.into_map()["display_name"], "Ops");
        let bare: MetadataUpdate = serde_json::from_str(r#"{"display_name":"Ops"}"#).unwrap();
        assert_eq!(bare.into_map()["display_name"], "Ops");
    }
}
