//! Authentication routes
//!
//! Sign-up, login and logout are reachable without an identity and sit
//! outside the authentication layer; a stale token on a login request must
//! not block the login. `current_user` is mounted behind it.

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::AuthService;
use crate::state::AppState;
use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use classroom_shared::{AuthToken, LoginRequest, MessageResponse, SignupRequest, User};

/// Routes reachable without authentication
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

/// POST /api/v1/auth/signup
async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = AuthService::signup(state.db(), req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /api/v1/auth/login
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthToken>> {
    let token = AuthService::login(state.users(), state.jwt(), req).await?;
    Ok(Json(token))
}

/// POST /api/v1/auth/logout
async fn logout(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Json<MessageResponse>> {
    let authorization = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    AuthService::logout(state.authenticator(), authorization).await?;
    Ok(Json(MessageResponse::new("Logged out")))
}

/// GET /api/v1/auth/user
pub async fn current_user(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<User>> {
    let profile = AuthService::profile(state.users(), &user).await?;
    Ok(Json(profile))
}
