//! Question lifecycle state machine - workflow layer
//!
//! Core responsibility: every status change of a question goes through
//! here, and nowhere else.
//!
//! Transition table (actor, from -> to):
//! 1. maker: new -> Draft | Pending, Draft -> Pending, Draft -> deleted
//! 2. checker: Pending -> Approved | Rejected
//! 3. maker: Rejected -> Pending (resubmission, canned response)
//! 4. expert: Approved -> Finalised
//!
//! Preconditions are re-checked against the persisted state inside a
//! single store write section, so a concurrent bulk approve and a
//! maker submission on the same id cannot corrupt state. Any attempt
//! outside the table fails with `InvalidTransition` and mutates
//! nothing.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{
    Question, QuestionStatus, ReviewAction, TransactionKind, User, WalletTransaction,
};
use crate::store::{Database, Store};
use crate::utils::logging::truncate_text;
use crate::workflow::input::{FinalizeInput, QuestionInput, SubmitMode};
use crate::workflow::responses;

/// Per-item outcome report for bulk operations. Partial success is
/// expected; failures are reported per id, never thrown for the whole
/// batch.
#[derive(Debug, Default, Serialize)]
pub struct BulkReport {
    pub succeeded: Vec<Uuid>,
    pub failed: Vec<BulkFailure>,
}

#[derive(Debug, Serialize)]
pub struct BulkFailure {
    pub id: Uuid,
    pub kind: &'static str,
    pub error: String,
}

impl BulkReport {
    fn record(&mut self, id: Uuid, result: AppResult<Question>) {
        match result {
            Ok(_) => self.succeeded.push(id),
            Err(e) => self.failed.push(BulkFailure {
                id,
                kind: e.kind(),
                error: e.to_string(),
            }),
        }
    }
}

/// Question lifecycle engine.
pub struct QuestionFlow {
    store: Arc<Store>,
    earning_per_approved_question: i64,
}

impl QuestionFlow {
    pub fn new(store: Arc<Store>, config: &Config) -> Self {
        Self {
            store,
            earning_per_approved_question: config.earning_per_approved_question,
        }
    }

    // ========== maker transitions ==========

    /// new -> Draft | Pending. Requires the paper to be claimed by this
    /// maker and not exhausted; Pending additionally passes the
    /// submission gate.
    pub async fn create(
        &self,
        maker: &User,
        input: QuestionInput,
        mode: SubmitMode,
    ) -> AppResult<Question> {
        let mut db = self.store.write().await;

        let paper = db.paper(input.question_paper)?;
        if paper.used_by != Some(maker.id) {
            return Err(AppError::forbidden(
                "question paper is not claimed by this maker",
            ));
        }
        if paper.is_exhausted() {
            return Err(AppError::Conflict(
                "question paper has reached its approved question limit".to_string(),
            ));
        }
        db.course(input.course)?;

        let now = Utc::now();
        let question = Question {
            id: Uuid::new_v4(),
            question_paper: input.question_paper,
            course: input.course,
            maker: maker.id,
            subject: input.subject,
            unit: input.unit,
            unit_no: input.unit_no,
            topic: input.topic,
            question_number: input.question_number,
            complexity: input.complexity,
            keywords: input.keywords,
            frequently_asked: input.frequently_asked,
            question: input.question,
            options: input.options,
            explanation: input.explanation,
            reference: input.reference,
            status: match mode {
                SubmitMode::Draft => QuestionStatus::Draft,
                SubmitMode::Pending => QuestionStatus::Pending,
            },
            checker_comments: None,
            maker_comments: None,
            created_at: now,
            updated_at: now,
        };

        if mode == SubmitMode::Pending {
            question.validate_submission()?;
        }

        let question = db.insert_question(question);
        if mode == SubmitMode::Pending {
            db.record_event(&question, maker.id, ReviewAction::Submitted, None);
        }

        info!(
            "[question {}] created as {} by {} ({})",
            question.id,
            question.status,
            maker.email,
            truncate_text(&question.question.text, 60),
        );
        Ok(question)
    }

    /// Draft edit, optionally promoting Draft -> Pending. The persisted
    /// result carries exactly the last-written fields; nothing survives
    /// from intermediate drafts.
    pub async fn update_draft(
        &self,
        maker: &User,
        id: Uuid,
        input: QuestionInput,
        mode: SubmitMode,
    ) -> AppResult<Question> {
        let mut db = self.store.write().await;

        let mut question = db.question(id)?.clone();
        if question.maker != maker.id {
            return Err(AppError::forbidden("question belongs to another maker"));
        }
        if question.status != QuestionStatus::Draft {
            return Err(AppError::InvalidTransition {
                from: question.status,
                action: "update",
            });
        }

        // Paper and course references are fixed at creation.
        apply_input(&mut question, input);
        if mode == SubmitMode::Pending {
            question.validate_submission()?;
            question.status = QuestionStatus::Pending;
        }

        let question = db.replace_question(question)?;
        if mode == SubmitMode::Pending {
            db.record_event(&question, maker.id, ReviewAction::Submitted, None);
            info!("[question {}] submitted for review by {}", id, maker.email);
        }
        Ok(question)
    }

    /// Bulk delete; Draft only, own questions only.
    pub async fn delete_drafts(&self, maker: &User, ids: &[Uuid]) -> BulkReport {
        let mut db = self.store.write().await;
        let mut report = BulkReport::default();
        for &id in ids {
            report.record(id, delete_one(&mut db, maker, id));
        }
        info!(
            "draft delete by {}: {} removed, {} failed",
            maker.email,
            report.succeeded.len(),
            report.failed.len()
        );
        report
    }

    /// Rejected -> Pending with a canned response and re-validated
    /// content.
    pub async fn resubmit(
        &self,
        maker: &User,
        id: Uuid,
        input: QuestionInput,
        response: &str,
    ) -> AppResult<Question> {
        if !responses::is_valid_response(response) {
            return Err(AppError::validation(
                "maker_comments",
                "response must be selected from the fixed response set",
            ));
        }

        let mut db = self.store.write().await;

        let mut question = db.question(id)?.clone();
        if question.maker != maker.id {
            return Err(AppError::forbidden("question belongs to another maker"));
        }
        if question.status != QuestionStatus::Rejected {
            return Err(AppError::InvalidTransition {
                from: question.status,
                action: "resubmit",
            });
        }

        apply_input(&mut question, input);
        question.validate_submission()?;
        question.status = QuestionStatus::Pending;
        question.maker_comments = Some(response.to_string());

        let fingerprint = question.content_fingerprint();
        let question = db.replace_question(question)?;
        db.record_event(&question, maker.id, ReviewAction::Resubmitted, Some(fingerprint));

        info!("[question {}] resubmitted by {}: {}", id, maker.email, response);
        Ok(question)
    }

    // ========== checker transitions ==========

    /// Pending -> Approved. Increments the paper counter in the same
    /// write section; reaching the paper limit releases the claim.
    pub async fn approve(&self, checker: &User, id: Uuid) -> AppResult<Question> {
        let mut db = self.store.write().await;
        let question = approve_one(&mut db, checker, id, self.earning_per_approved_question)?;
        info!("[question {}] ✓ approved by {}", id, checker.email);
        Ok(question)
    }

    /// Pending -> Approved over a set of ids, atomically per item.
    pub async fn approve_bulk(&self, checker: &User, ids: &[Uuid]) -> BulkReport {
        let mut db = self.store.write().await;
        let mut report = BulkReport::default();
        for &id in ids {
            report.record(
                id,
                approve_one(&mut db, checker, id, self.earning_per_approved_question),
            );
        }
        info!(
            "bulk approve by {}: {} approved, {} failed",
            checker.email,
            report.succeeded.len(),
            report.failed.len()
        );
        report
    }

    /// Pending -> Rejected; checker comments are mandatory.
    pub async fn reject(&self, checker: &User, id: Uuid, comments: &str) -> AppResult<Question> {
        if comments.trim().is_empty() {
            return Err(AppError::validation(
                "checker_comments",
                "rejection requires checker comments",
            ));
        }

        let mut db = self.store.write().await;

        let mut question = db.question(id)?.clone();
        if question.status != QuestionStatus::Pending {
            return Err(AppError::InvalidTransition {
                from: question.status,
                action: "reject",
            });
        }

        question.status = QuestionStatus::Rejected;
        question.checker_comments = Some(comments.trim().to_string());
        question.updated_at = Utc::now();

        let fingerprint = question.content_fingerprint();
        let question = db.replace_question(question)?;
        db.record_event(&question, checker.id, ReviewAction::Rejected, Some(fingerprint));

        warn!("[question {}] ⚠️ rejected by {}", id, checker.email);
        Ok(question)
    }

    // ========== expert transition ==========

    /// Approved -> Finalised (terminal). Full metadata required.
    pub async fn finalize(
        &self,
        expert: &User,
        id: Uuid,
        input: FinalizeInput,
    ) -> AppResult<Question> {
        let mut db = self.store.write().await;

        let mut question = db.question(id)?.clone();
        if question.status != QuestionStatus::Approved {
            return Err(AppError::InvalidTransition {
                from: question.status,
                action: "finalise",
            });
        }

        if let Some(unit_no) = input.unit_no {
            question.unit_no = Some(unit_no);
        }
        if let Some(topic) = input.topic {
            question.topic = topic;
        }
        if let Some(complexity) = input.complexity {
            question.complexity = Some(complexity);
        }
        if let Some(explanation) = input.explanation {
            question.explanation = explanation;
        }
        question.validate_finalization()?;
        question.status = QuestionStatus::Finalised;
        question.updated_at = Utc::now();

        let question = db.replace_question(question)?;
        db.record_event(&question, expert.id, ReviewAction::Finalised, None);

        info!("[question {}] ✓ finalised by {}", id, expert.email);
        Ok(question)
    }
}

/// Copy maker-editable fields onto an existing question. Paper, course,
/// maker and creation time are fixed.
fn apply_input(question: &mut Question, input: QuestionInput) {
    question.subject = input.subject;
    question.unit = input.unit;
    question.unit_no = input.unit_no;
    question.topic = input.topic;
    question.question_number = input.question_number;
    question.complexity = input.complexity;
    question.keywords = input.keywords;
    question.frequently_asked = input.frequently_asked;
    question.question = input.question;
    question.options = input.options;
    question.explanation = input.explanation;
    question.reference = input.reference;
    question.updated_at = Utc::now();
}

fn delete_one(db: &mut Database, maker: &User, id: Uuid) -> AppResult<Question> {
    let question = db.question(id)?;
    if question.maker != maker.id {
        return Err(AppError::forbidden("question belongs to another maker"));
    }
    if question.status != QuestionStatus::Draft {
        return Err(AppError::InvalidTransition {
            from: question.status,
            action: "delete",
        });
    }
    db.remove_question(id)
}

/// The single Pending -> Approved step, shared by the single and bulk
/// entry points. Runs entirely inside the caller's write section.
fn approve_one(
    db: &mut Database,
    checker: &User,
    id: Uuid,
    earning: i64,
) -> AppResult<Question> {
    let mut question = db.question(id)?.clone();
    if question.status != QuestionStatus::Pending {
        return Err(AppError::InvalidTransition {
            from: question.status,
            action: "approve",
        });
    }
    // The one-correct-option invariant is re-checked at write time.
    question.validate_submission()?;

    let paper = db.paper_mut(question.question_paper)?;
    if paper.is_exhausted() {
        return Err(AppError::Conflict(
            "approving would exceed the paper's approved question limit".to_string(),
        ));
    }
    paper.approved_question_count += 1;
    let exhausted = paper.is_exhausted();
    if exhausted {
        // System-triggered release: the paper is fully authored.
        paper.used_by = None;
    }
    let paper_id = paper.id;

    question.status = QuestionStatus::Approved;
    question.updated_at = Utc::now();
    let fingerprint = question.content_fingerprint();
    let question = db.replace_question(question)?;
    db.record_event(&question, checker.id, ReviewAction::Approved, Some(fingerprint));

    if earning > 0 {
        db.apply_transaction(WalletTransaction {
            id: Uuid::new_v4(),
            user: question.maker,
            amount: earning,
            kind: TransactionKind::Earning,
            description: format!("Approved question {}", question.id),
            request_id: None,
            created_at: Utc::now(),
        })?;
    }

    if exhausted {
        info!("[paper {}] fully authored, claim released", paper_id);
    }
    Ok(question)
}
