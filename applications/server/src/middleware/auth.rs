/// Authentication middleware
use crate::{error::ServerError, services::AuthService};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use dharma_core::UserId;
use std::sync::Arc;

/// Identity of the bearer token holder, stored in request extensions.
/// Can be used as an extractor in handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub is_admin: bool,
}

impl AuthenticatedUser {
    pub fn require_admin(&self) -> Result<(), ServerError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(ServerError::Forbidden("Admin access required".to_string()))
        }
    }

    /// Admins may act on anyone, other users only on themselves
    pub fn require_self_or_admin(&self, user_id: UserId) -> Result<(), ServerError> {
        if self.is_admin || self.user_id == user_id {
            Ok(())
        } else {
            Err(ServerError::Forbidden(
                "Cannot modify another user's account".to_string(),
            ))
        }
    }
}

/// Middleware that extracts and validates JWT from Authorization header
pub async fn auth_middleware(
    State(auth_service): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let token = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| ServerError::Auth("Missing bearer token".to_string()))?;

    let identity = auth_service.verify_access_token(token).map_err(|e| {
        tracing::warn!("Token verification failed: {}", e);
        ServerError::Auth("Invalid or expired token".to_string())
    })?;

    request.extensions_mut().insert(AuthenticatedUser {
        user_id: identity.user_id,
        is_admin: identity.is_admin,
    });

    Ok(next.run(request).await)
}

/// Implement FromRequestParts so AuthenticatedUser can be used as an extractor
#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .copied()
            .ok_or_else(|| ServerError::Auth("Not authenticated".to_string()))
    }
}
