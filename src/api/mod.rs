//! HTTP surface - api layer
//!
//! Thin axum handlers over the core services. All authorization flows
//! through the extractors in [`extract`]; handlers never branch on
//! ambient state.

pub mod admin;
pub mod auth_routes;
pub mod extract;
pub mod papers;
pub mod questions;
pub mod review;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::Method;
use axum::routing::{get, post, put};
use axum::Router;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tower_http::cors::CorsLayer;

use crate::app::AppState;
use crate::error::AppResult;
use crate::services::Window;

/// Reporting window as it arrives on the dashboard query strings:
/// either a named timeframe or an explicit date range.
#[derive(Debug, Default, Deserialize)]
pub struct WindowQuery {
    pub timeframe: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl WindowQuery {
    pub fn resolve(&self) -> AppResult<Window> {
        if self.start_date.is_some() || self.end_date.is_some() {
            return Ok(Window {
                start: self.start_date,
                end: self.end_date,
            });
        }
        match &self.timeframe {
            Some(timeframe) => Window::from_timeframe(timeframe),
            None => Ok(Window::default()),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    Router::new()
        .route("/auth/login/:role", post(auth_routes::login))
        // claim manager
        .route("/papers/available", get(papers::available))
        .route("/papers/claimed", get(papers::claimed))
        .route("/papers/:id/claim", put(papers::claim))
        .route("/papers/:id/release", put(papers::release))
        .route("/papers", get(papers::list))
        // authoring
        .route(
            "/questions",
            post(questions::save).delete(questions::delete_bulk),
        )
        .route("/questions/dashboard", get(questions::dashboard))
        .route("/questions/:id/resubmit", put(questions::resubmit))
        // review queue
        .route("/questions/pending", get(review::pending))
        .route("/questions/reviewed", get(review::reviewed))
        .route(
            "/questions/awaiting-finalization",
            get(review::awaiting_finalization),
        )
        .route("/questions/approve-bulk", put(review::approve_bulk))
        .route(
            "/questions/:id/approve",
            put(review::approve).post(review::finalize),
        )
        .route("/questions/:id/reject", put(review::reject))
        .route("/questions/:id", get(questions::get_one))
        .route("/checker/dashboard", get(review::checker_dashboard))
        // admin
        .route("/admin/dashboard-stats", get(admin::dashboard_stats))
        .route("/admin/users", post(admin::create_user).get(admin::list_users))
        .route("/admin/users/:id/deactivate", put(admin::deactivate_user))
        .route("/admin/users/:id/balance", get(admin::user_balance))
        .route("/admin/courses", post(admin::create_course))
        .route("/courses", get(admin::list_courses))
        .route("/admin/papers", post(papers::create))
        .route("/admin/payout", post(admin::payout))
        .route(
            "/admin/payout/transactions/:user_id",
            get(admin::payout_transactions),
        )
        .layer(cors)
        .with_state(state)
}
