use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::extract::{Authenticated, CurrentAdmin, CurrentMaker};
use crate::app::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{QuestionPaper, Role};
use crate::services::NewPaper;

/// `GET /papers/available` - papers a maker can still claim.
pub async fn available(
    CurrentMaker(_maker): CurrentMaker,
    State(state): State<AppState>,
) -> Json<Vec<QuestionPaper>> {
    Json(state.claims.list_available().await)
}

/// `PUT /papers/:id/claim`
pub async fn claim(
    CurrentMaker(maker): CurrentMaker,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<QuestionPaper>> {
    Ok(Json(state.claims.claim(id, &maker).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct ClaimedQuery {
    #[serde(default)]
    pub all: bool,
}

/// `GET /papers/claimed` - a maker's own claims, or every claim when
/// an admin asks with `?all=true`.
pub async fn claimed(
    Authenticated(user): Authenticated,
    State(state): State<AppState>,
    Query(query): Query<ClaimedQuery>,
) -> AppResult<Json<Vec<QuestionPaper>>> {
    let papers = match (user.role, query.all) {
        (Role::Admin, _) => state.claims.list_claimed().await,
        (Role::Maker, false) => state.claims.list_claimed_by(user.id).await,
        (Role::Maker, true) => {
            return Err(AppError::forbidden("only admins may list all claims"))
        }
        _ => return Err(AppError::forbidden("no claim listing for this role")),
    };
    Ok(Json(papers))
}

/// `PUT /papers/:id/release` - admin override of a stuck claim.
pub async fn release(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<QuestionPaper>> {
    Ok(Json(state.claims.release(id).await?))
}

/// `POST /admin/papers`
pub async fn create(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<NewPaper>,
) -> AppResult<(StatusCode, Json<QuestionPaper>)> {
    let paper = state.catalog.create_paper(payload).await?;
    Ok((StatusCode::CREATED, Json(paper)))
}

/// `GET /papers`
pub async fn list(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Json<Vec<QuestionPaper>> {
    Json(state.catalog.list_papers().await)
}
