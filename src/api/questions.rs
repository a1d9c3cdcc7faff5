use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::extract::{CurrentMaker, CurrentViewer};
use crate::api::WindowQuery;
use crate::app::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{Question, Role};
use crate::services::report_service::MakerStats;
use crate::workflow::{BulkReport, QuestionInput, SubmitMode};

#[derive(Debug, Deserialize)]
pub struct SaveQuestionPayload {
    /// Present when editing an existing draft.
    #[serde(default)]
    pub id: Option<Uuid>,
    pub submit: SubmitMode,
    #[serde(flatten)]
    pub input: QuestionInput,
}

/// `POST /questions` - create a question, or rewrite an existing
/// draft, as Draft or Pending.
pub async fn save(
    CurrentMaker(maker): CurrentMaker,
    State(state): State<AppState>,
    Json(payload): Json<SaveQuestionPayload>,
) -> AppResult<(StatusCode, Json<Question>)> {
    match payload.id {
        Some(id) => {
            let question = state
                .flow
                .update_draft(&maker, id, payload.input, payload.submit)
                .await?;
            Ok((StatusCode::OK, Json(question)))
        }
        None => {
            let question = state.flow.create(&maker, payload.input, payload.submit).await?;
            Ok((StatusCode::CREATED, Json(question)))
        }
    }
}

/// `GET /questions/:id` - makers see their own questions; reviewing
/// roles see any.
pub async fn get_one(
    CurrentViewer(user): CurrentViewer,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Question>> {
    let db = state.store.read().await;
    let question = db.question(id)?;
    if user.role == Role::Maker && question.maker != user.id {
        return Err(AppError::forbidden("question belongs to another maker"));
    }
    Ok(Json(question.clone()))
}

#[derive(Debug, Deserialize)]
pub struct DeletePayload {
    pub ids: Vec<Uuid>,
}

/// `DELETE /questions` - bulk delete, Draft only.
pub async fn delete_bulk(
    CurrentMaker(maker): CurrentMaker,
    State(state): State<AppState>,
    Json(payload): Json<DeletePayload>,
) -> Json<BulkReport> {
    Json(state.flow.delete_drafts(&maker, &payload.ids).await)
}

#[derive(Debug, Deserialize)]
pub struct ResubmitPayload {
    /// Response chosen from the fixed set.
    pub maker_comments: String,
    #[serde(flatten)]
    pub input: QuestionInput,
}

/// `PUT /questions/:id/resubmit` - Rejected back to Pending.
pub async fn resubmit(
    CurrentMaker(maker): CurrentMaker,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ResubmitPayload>,
) -> AppResult<Json<Question>> {
    let question = state
        .flow
        .resubmit(&maker, id, payload.input, &payload.maker_comments)
        .await?;
    Ok(Json(question))
}

/// `GET /questions/dashboard` - the maker's own performance counters.
pub async fn dashboard(
    CurrentMaker(maker): CurrentMaker,
    State(state): State<AppState>,
    Query(window): Query<WindowQuery>,
) -> AppResult<Json<MakerStats>> {
    let window = window.resolve()?;
    Ok(Json(state.reports.maker_stats(maker.id, window).await?))
}
