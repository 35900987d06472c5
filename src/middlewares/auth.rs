use anyhow::anyhow;
use axum::{
    extract::{FromRequestParts, Request},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::Response,
};
use tower_sessions::Session;

use crate::{
    error::AppError,
    models::sessions::{UserSession, VerifiedUser, USER_SESSION_KEY},
};

pub async fn auth_middleware(
    session: Session,
    req: Request,
    next: Next,
) -> Result<Response, (StatusCode, String)> {
    // Check if the session has a user session
    match session.get::<UserSession>(USER_SESSION_KEY).await {
        Ok(Some(_user_session)) => {
            // User is authenticated, continue
            Ok(next.run(req).await)
        }
        Ok(None) => {
            // No user session found
            Err((StatusCode::UNAUTHORIZED, "Unauthorized".to_string()))
        }
        Err(e) => {
            // Session error
            tracing::error!(error = %e, "failed to read session");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

/// Resolves the caller from the session written by the auth service.
impl<S> FromRequestParts<S> for VerifiedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, message)| AppError::Unauthorized(anyhow!(message)))?;

        let user_session = session
            .get::<UserSession>(USER_SESSION_KEY)
            .await
            .map_err(|_| AppError::Unauthorized(anyhow!("Cannot find user session")))?;

        match user_session {
            Some(user_data) => Ok(user_data.into()),
            None => Err(AppError::Unauthorized(anyhow!("User session not found"))),
        }
    }
}
