//! Account routes for the authenticated caller

use super::auth::current_user;
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::AuthService;
use crate::state::AppState;
use axum::{
    extract::State,
    routing::{get, put},
    Json, Router,
};
use classroom_shared::{ChangePasswordRequest, MessageResponse};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(current_user))
        .route("/password", put(change_password))
}

/// PUT /api/v1/user/password
async fn change_password(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    AuthService::change_password(state.db(), &user, req).await?;
    Ok(Json(MessageResponse::new("Password changed")))
}
