// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::auth::{DenyReason, GateState, IdentityError};
use crate::services::WriteError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: BTreeMap<String, String>,
    },
    InvalidJson(String),

    // 401 Unauthorized
    Unauthorized { message: String, redirect: Option<String> },

    // 403 Forbidden
    Forbidden { message: String, redirect: Option<String> },

    // 404 Not Found
    NotFound(String),

    // 405 Method Not Allowed
    MethodNotAllowed(String),

    // 500 with an operator remediation hint (tables/columns missing)
    SetupRequired { message: String, code: &'static str, hint: String },

    // 500 Internal Server Error
    InternalServerError { message: String, hint: Option<String> },

    // 502 Bad Gateway (identity/store service issues)
    BadGateway(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::ValidationError { .. } => 400,
            ApiError::InvalidJson(_) => 400,
            ApiError::Unauthorized { .. } => 401,
            ApiError::Forbidden { .. } => 403,
            ApiError::NotFound(_) => 404,
            ApiError::MethodNotAllowed(_) => 405,
            ApiError::SetupRequired { .. } => 500,
            ApiError::InternalServerError { .. } => 500,
            ApiError::BadGateway(_) => 502,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::InvalidJson(msg) => msg,
            ApiError::Unauthorized { message, .. } => message,
            ApiError::Forbidden { message, .. } => message,
            ApiError::NotFound(msg) => msg,
            ApiError::MethodNotAllowed(msg) => msg,
            ApiError::SetupRequired { message, .. } => message,
            ApiError::InternalServerError { message, .. } => message,
            ApiError::BadGateway(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::Unauthorized { .. } => "UNAUTHORIZED",
            ApiError::Forbidden { .. } => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::MethodNotAllowed(_) => "METHOD_NOT_ALLOWED",
            ApiError::SetupRequired { code, .. } => *code,
            ApiError::InternalServerError { .. } => "STORE_ERROR",
            ApiError::BadGateway(_) => "BAD_GATEWAY",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Structured extras under `details`, when the error has any
    pub fn details(&self) -> Option<Value> {
        match self {
            ApiError::ValidationError { field_errors, .. } if !field_errors.is_empty() => {
                Some(json!({ "field_errors": field_errors }))
            }
            ApiError::Unauthorized { redirect: Some(redirect), .. }
            | ApiError::Forbidden { redirect: Some(redirect), .. } => Some(json!({ "redirect": redirect })),
            ApiError::SetupRequired { hint, .. } => Some(json!({ "hint": hint })),
            ApiError::InternalServerError { hint: Some(hint), .. } => Some(json!({ "hint": hint })),
            _ => None,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "success": false,
            "error": self.message(),
            "code": self.error_code()
        });
        if let Some(details) = self.details() {
            response["details"] = details;
        }
        response
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized { message: message.into(), redirect: None }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        ApiError::BadGateway(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }

    /// Rejection for a gate that did not end in `Authenticated`
    pub fn from_gate(state: &GateState) -> Self {
        let redirect = state.redirect();
        match state {
            GateState::Unauthenticated(DenyReason::Permission) => ApiError::Forbidden {
                message: "Admin role required".to_string(),
                redirect,
            },
            GateState::Unauthenticated(DenyReason::Error) => ApiError::Unauthorized {
                message: "Unable to verify session".to_string(),
                redirect,
            },
            _ => ApiError::Unauthorized {
                message: "Authentication required".to_string(),
                redirect,
            },
        }
    }
}

// Convert other error types to ApiError
impl From<WriteError> for ApiError {
    fn from(err: WriteError) -> Self {
        let hint = err.remediation();
        match err {
            WriteError::Validation(e) => ApiError::ValidationError {
                message: e.to_string(),
                field_errors: e.field_errors,
            },
            WriteError::SchemaMissing { .. } => ApiError::SetupRequired {
                message: err.to_string(),
                code: "SCHEMA_MISSING",
                hint: hint.unwrap_or_default(),
            },
            WriteError::ColumnMissing { .. } => ApiError::SetupRequired {
                message: err.to_string(),
                code: "COLUMN_MISSING",
                hint: hint.unwrap_or_default(),
            },
            WriteError::Store(msg) => {
                tracing::error!("Store error: {}", msg);
                ApiError::InternalServerError { message: msg, hint }
            }
            WriteError::NotFound { .. } => ApiError::not_found(err.to_string()),
            WriteError::Immutable(_) => ApiError::MethodNotAllowed(err.to_string()),
        }
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::InvalidCredentials(msg) => ApiError::unauthorized(msg),
            IdentityError::ConfigMissing(what) => {
                ApiError::service_unavailable(format!("Identity service not configured ({})", what))
            }
            IdentityError::Rejected { status: 401, message } => ApiError::unauthorized(message),
            IdentityError::Rejected { status, message } if (400..500).contains(&status) => {
                ApiError::bad_request(message)
            }
            other => {
                tracing::error!("Identity service error: {}", other);
                ApiError::bad_gateway(other.to_string())
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Resource;
    use crate::validation::ValidationError;

    #[test]
    fn validation_errors_carry_field_errors() {
        let err: ApiError = WriteError::Validation(ValidationError::new("logo_url", "Must be a valid URL")).into();
        assert_eq!(err.status_code(), 400);
        let body = err.to_json();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["details"]["field_errors"]["logo_url"], "Must be a valid URL");
    }

    #[test]
    fn missing_table_is_500_with_hint() {
        let err: ApiError = WriteError::SchemaMissing { table: "courses".into() }.into();
        assert_eq!(err.status_code(), 500);
        let body = err.to_json();
        assert_eq!(body["code"], "SCHEMA_MISSING");
        assert!(body["details"]["hint"].as_str().unwrap().contains("courses"));
    }

    #[test]
    fn immutable_and_not_found_statuses() {
        let immutable: ApiError = WriteError::Immutable(Resource::Inquiry).into();
        assert_eq!(immutable.status_code(), 405);
        let missing: ApiError = WriteError::NotFound { resource: Resource::Course, id: 9 }.into();
        assert_eq!(missing.status_code(), 404);
        assert!(missing.to_json().get("details").is_none());
    }

    #[test]
    fn gate_rejections_include_redirect() {
        let err = ApiError::from_gate(&GateState::Unauthenticated(DenyReason::Permission));
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.to_json()["details"]["redirect"], "/admin/login?reason=permission");

        let err = ApiError::from_gate(&GateState::Unauthenticated(DenyReason::Error));
        assert_eq!(err.status_code(), 401);
    }

    #[test]
    fn bad_credentials_are_401() {
        let err: ApiError = IdentityError::InvalidCredentials("Invalid login credentials".into()).into();
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.message(), "Invalid login credentials");
    }
}
