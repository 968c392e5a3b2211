//! Authentication middleware
//!
//! Runs the [`Authenticator`](super::Authenticator) once per request and
//! stores the resulting [`Identity`] in the request extensions. Handlers that
//! need a caller take [`AuthUser`]; routes with no caller requirement never
//! look at it.

use super::gate::AuthOutcome;
use super::identity::Identity;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use classroom_shared::AuthError;
use std::ops::Deref;

/// Authenticated caller, as established by [`auth_middleware`]
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl Deref for AuthUser {
    type Target = Identity;

    fn deref(&self) -> &Identity {
        &self.0
    }
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(AuthUser)
            .ok_or(ApiError::Unauthenticated(AuthError::MissingCredential))
    }
}

/// Authenticate every request passing through this layer.
///
/// A request without a bearer token continues anonymously; one with a
/// rejected token is answered here and never reaches a handler.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match state.authenticator().authenticate(authorization).await {
        AuthOutcome::Authenticated(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        AuthOutcome::Anonymous => next.run(request).await,
        AuthOutcome::Rejected(kind) => ApiError::from(kind).into_response(),
    }
}
