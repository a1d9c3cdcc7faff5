use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::{AppError, AppResult};
use crate::models::Role;

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

/// `POST /auth/login/:role`
pub async fn login(
    Path(role): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> AppResult<Json<Value>> {
    let role = Role::parse(&role)
        .ok_or_else(|| AppError::validation("role", format!("unknown role `{role}`")))?;
    let token = state.auth.login(&payload.email, &payload.password, role).await?;
    Ok(Json(json!({ "token": token })))
}
