use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::extract::{CurrentChecker, CurrentExpert};
use crate::api::WindowQuery;
use crate::app::AppState;
use crate::error::AppResult;
use crate::models::Question;
use crate::services::report_service::CheckerStats;
use crate::services::{PageOf, QueueFilters};
use crate::workflow::{BulkReport, FinalizeInput};

// Kept flat: query-string deserialization does not cope with
// `#[serde(flatten)]` around numeric fields.
#[derive(Debug, Default, Deserialize)]
pub struct QueueQuery {
    pub search: Option<String>,
    pub maker: Option<Uuid>,
    pub course: Option<Uuid>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

impl QueueQuery {
    fn filters(&self) -> QueueFilters {
        QueueFilters {
            search: self.search.clone(),
            maker: self.maker,
            course: self.course,
        }
    }
}

/// `GET /questions/pending` - the checker queue.
pub async fn pending(
    CurrentChecker(_checker): CurrentChecker,
    State(state): State<AppState>,
    Query(query): Query<QueueQuery>,
) -> Json<PageOf<Question>> {
    Json(state.queue.pending(&query.filters(), query.page, query.limit).await)
}

/// `GET /questions/reviewed` - audit view of past decisions.
pub async fn reviewed(
    CurrentChecker(_checker): CurrentChecker,
    State(state): State<AppState>,
    Query(query): Query<QueueQuery>,
) -> Json<PageOf<Question>> {
    Json(state.queue.reviewed(&query.filters(), query.page, query.limit).await)
}

/// `PUT /questions/:id/approve`
pub async fn approve(
    CurrentChecker(checker): CurrentChecker,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Question>> {
    Ok(Json(state.flow.approve(&checker, id).await?))
}

#[derive(Debug, Deserialize)]
pub struct BulkApprovePayload {
    pub ids: Vec<Uuid>,
}

/// `PUT /questions/approve-bulk` - partial success is reported per id.
pub async fn approve_bulk(
    CurrentChecker(checker): CurrentChecker,
    State(state): State<AppState>,
    Json(payload): Json<BulkApprovePayload>,
) -> Json<BulkReport> {
    Json(state.flow.approve_bulk(&checker, &payload.ids).await)
}

#[derive(Debug, Deserialize)]
pub struct RejectPayload {
    pub comments: String,
}

/// `PUT /questions/:id/reject`
pub async fn reject(
    CurrentChecker(checker): CurrentChecker,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RejectPayload>,
) -> AppResult<Json<Question>> {
    Ok(Json(state.flow.reject(&checker, id, &payload.comments).await?))
}

/// `GET /questions/awaiting-finalization` - the expert queue.
pub async fn awaiting_finalization(
    CurrentExpert(_expert): CurrentExpert,
    State(state): State<AppState>,
    Query(query): Query<QueueQuery>,
) -> Json<PageOf<Question>> {
    Json(
        state
            .queue
            .awaiting_finalization(&query.filters(), query.page, query.limit)
            .await,
    )
}

/// `POST /questions/:id/approve` - the expert's terminal transition.
pub async fn finalize(
    CurrentExpert(expert): CurrentExpert,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<FinalizeInput>,
) -> AppResult<Json<Question>> {
    Ok(Json(state.flow.finalize(&expert, id, payload).await?))
}

/// `GET /checker/dashboard`
pub async fn checker_dashboard(
    CurrentChecker(checker): CurrentChecker,
    State(state): State<AppState>,
    Query(window): Query<WindowQuery>,
) -> AppResult<Json<CheckerStats>> {
    let window = window.resolve()?;
    Ok(Json(state.reports.checker_stats(checker.id, window).await?))
}
