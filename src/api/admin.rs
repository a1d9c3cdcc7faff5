use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::extract::{Authenticated, CurrentAdmin, CurrentPayoutManager};
use crate::api::WindowQuery;
use crate::app::AppState;
use crate::error::AppResult;
use crate::models::{Course, User, WalletTransaction};
use crate::services::{BalanceReport, DashboardStats, NewCourse, NewUser};

/// `GET /admin/dashboard-stats`
pub async fn dashboard_stats(
    CurrentPayoutManager(_admin): CurrentPayoutManager,
    State(state): State<AppState>,
    Query(window): Query<WindowQuery>,
) -> AppResult<Json<DashboardStats>> {
    let window = window.resolve()?;
    Ok(Json(state.reports.dashboard(window).await))
}

/// `POST /admin/users`
pub async fn create_user(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<NewUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = state.catalog.create_user(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /admin/users`
pub async fn list_users(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Json<Vec<User>> {
    Json(state.catalog.list_users().await)
}

/// `PUT /admin/users/:id/deactivate`
pub async fn deactivate_user(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<User>> {
    Ok(Json(state.catalog.deactivate_user(id).await?))
}

/// `POST /admin/courses`
pub async fn create_course(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<NewCourse>,
) -> AppResult<(StatusCode, Json<Course>)> {
    let course = state.catalog.create_course(&admin, payload).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

/// `GET /courses` - read-only for every role.
pub async fn list_courses(
    Authenticated(_user): Authenticated,
    State(state): State<AppState>,
) -> Json<Vec<Course>> {
    Json(state.catalog.list_courses().await)
}

/// `GET /admin/users/:id/balance`
pub async fn user_balance(
    CurrentPayoutManager(_admin): CurrentPayoutManager,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BalanceReport>> {
    Ok(Json(state.wallet.balance(id).await?))
}

/// `GET /admin/payout/transactions/:user_id`
pub async fn payout_transactions(
    CurrentPayoutManager(_admin): CurrentPayoutManager,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Vec<WalletTransaction>>> {
    Ok(Json(state.wallet.transactions(user_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct PayoutPayload {
    pub user_id: Uuid,
    pub amount: i64,
    pub description: String,
    /// Idempotency token; resubmitting the same request id returns the
    /// original transaction.
    pub request_id: Uuid,
}

/// `POST /admin/payout`
pub async fn payout(
    CurrentPayoutManager(_admin): CurrentPayoutManager,
    State(state): State<AppState>,
    Json(payload): Json<PayoutPayload>,
) -> AppResult<(StatusCode, Json<WalletTransaction>)> {
    let entry = state
        .wallet
        .payout(
            payload.user_id,
            payload.amount,
            payload.description,
            payload.request_id,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}
