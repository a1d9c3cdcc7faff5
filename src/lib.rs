//! # Question Workflow Portal
//!
//! Backend for a multi-role exam-question pipeline: makers author
//! questions against claimed question papers, checkers review them,
//! experts finalize them, and an admin manages the catalog and
//! payouts.
//!
//! ## Architecture
//!
//! The system is a strict four-layer stack:
//!
//! ### 1. Store
//! - `store` - single logical datastore behind one lock, with the
//!   secondary indexes the queues and reports need
//!
//! ### 2. Services
//! - `services::claim_service` - exclusive paper claims (check-and-set)
//! - `services::review_service` - filtered, paginated review queues
//! - `services::report_service` - derived dashboards and leaderboards
//! - `services::wallet_service` - append-only ledger, idempotent payouts
//! - `services::catalog_service` - admin provisioning
//!
//! ### 3. Workflow
//! - `workflow::QuestionFlow` - the question lifecycle state machine;
//!   every status change goes through it
//!
//! ### 4. API
//! - `api` - axum handlers and auth extractors; `app` wires the layers
//!   together and serves

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;
pub mod workflow;

// Re-export the types most callers need.
pub use app::{App, AppState};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{Question, QuestionPaper, QuestionStatus, Role, User};
pub use workflow::{QuestionFlow, QuestionInput, SubmitMode};
