use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::{DenyReason, GateState, Role, Session};
use crate::error::ApiError;

/// Admin session that passed the gate, injected into request extensions
#[derive(Clone, Debug)]
pub struct AdminSession {
    pub session: Session,
    pub role: Role,
}

/// Resolve the bearer token against the identity service and let only
/// admins through.
///
/// No token or an unknown token is 401 `unauthorized`, an identity failure is
/// 401 `error`, a non-admin role is 403 `permission`. The login redirect is
/// returned in `details.redirect`.
pub async fn admin_gate(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = bearer_token(&headers) else {
        return Err(ApiError::from_gate(&GateState::Unauthenticated(DenyReason::Unauthorized)));
    };

    let lookup = state.identity.get_session(token).await;
    let gate = GateState::resolve(lookup.as_ref().map(Option::as_ref));
    if !gate.is_authenticated() {
        tracing::debug!("admin gate rejected request: {:?}", gate);
        return Err(ApiError::from_gate(&gate));
    }

    if let Ok(Some(session)) = lookup {
        request.extensions_mut().insert(AdminSession { session, role: Role::Admin });
    }

    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer ...` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_bearer_tokens() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer token-7"));
        assert_eq!(bearer_token(&headers), Some("token-7"));
    }
}
