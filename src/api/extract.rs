//! Auth extractors.
//!
//! Each handler requires a capability through one of these wrappers;
//! the bearer token is resolved once and the authenticated user is
//! handed to the core explicitly.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::app::AppState;
use crate::error::AppError;
use crate::models::{Capability, User};

/// Any logged-in, active user.
pub struct Authenticated(pub User);

#[async_trait]
impl FromRequestParts<AppState> for Authenticated {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthorized)?;
        let token = header.strip_prefix("Bearer ").ok_or(AppError::Unauthorized)?;
        let user = state.auth.authenticate(token).await?;
        Ok(Authenticated(user))
    }
}

async fn require(
    parts: &mut Parts,
    state: &AppState,
    capability: Capability,
) -> Result<User, AppError> {
    let Authenticated(user) = Authenticated::from_request_parts(parts, state).await?;
    if !user.role.allows(capability) {
        return Err(AppError::forbidden(format!(
            "the {} role cannot perform this action",
            user.role
        )));
    }
    Ok(user)
}

pub struct CurrentMaker(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentMaker {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        Ok(Self(require(parts, state, Capability::AuthorQuestions).await?))
    }
}

pub struct CurrentChecker(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentChecker {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        Ok(Self(require(parts, state, Capability::ReviewQuestions).await?))
    }
}

pub struct CurrentExpert(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentExpert {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        Ok(Self(require(parts, state, Capability::FinalizeQuestions).await?))
    }
}

pub struct CurrentAdmin(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        Ok(Self(require(parts, state, Capability::ManageCatalog).await?))
    }
}

/// Holder of the payout capability (balances, ledgers, payouts,
/// org-wide dashboards).
pub struct CurrentPayoutManager(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentPayoutManager {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        Ok(Self(require(parts, state, Capability::ManagePayouts).await?))
    }
}

/// Any role that participates in the workflow may read a question.
pub struct CurrentViewer(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentViewer {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        Ok(Self(require(parts, state, Capability::ViewQuestions).await?))
    }
}
