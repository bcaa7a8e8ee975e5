//! Access guard: resolves a bearer token to a stored, active user and
//! installs it as the request's [`AuthUser`].

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_helpers::{AppError, AuthUser, JwtAuth, bearer_token};
use std::sync::Arc;

use crate::error::{UserError, UserResult};
use crate::repository::UserRepository;

#[derive(Clone)]
pub struct AuthGuard {
    jwt: JwtAuth,
    users: Arc<dyn UserRepository>,
}

impl AuthGuard {
    pub fn new(jwt: JwtAuth, users: Arc<dyn UserRepository>) -> Self {
        Self { jwt, users }
    }

    pub async fn authenticate(&self, token: &str) -> UserResult<AuthUser> {
        let claims = self.jwt.verify(token).map_err(|e| {
            tracing::debug!("JWT verification failed: {}", e);
            UserError::Unauthorized("Not authorized, token failed".to_string())
        })?;

        let user = self
            .users
            .get_by_id(claims.sub)
            .await?
            .ok_or_else(|| UserError::Unauthorized("User not found".to_string()))?;

        if !user.is_active {
            return Err(UserError::Unauthorized("Account is inactive".to_string()));
        }

        Ok(AuthUser::from(&user))
    }
}

/// Runs on every request. No token: passes through anonymously, and
/// private handlers reject via the `AuthUser` extractor. A token that
/// does not resolve to an active user is a 401 here.
pub async fn auth_guard(
    State(guard): State<AuthGuard>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(token) = bearer_token(request.headers()) {
        let user = guard.authenticate(&token).await?;
        tracing::debug!(user_id = %user.id, "Request authenticated");
        request.extensions_mut().insert(user);
    }

    Ok(next.run(request).await)
}
