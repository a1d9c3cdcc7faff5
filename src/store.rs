//! In-memory entity store.
//!
//! One logical datastore behind a single `RwLock`. Services take the
//! write guard once per operation, so a claim check-and-set, a status
//! transition plus its counter increment, or a balance check plus a
//! ledger append are each naturally atomic. Guards are never held
//! across an `.await`.
//!
//! Questions carry secondary indexes (by status, maker and paper) so
//! the review queue and the report pages never full-scan. The status
//! and maker indexes are ordered by `(created_at, id)`, which gives the
//! queue a stable newest-first order that cannot skip or duplicate
//! items across pages under concurrent inserts.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    Course, Question, QuestionPaper, QuestionStatus, ReviewAction, ReviewEvent, User,
    WalletTransaction,
};

/// Stable sort key for question listings.
pub type QuestionKey = (DateTime<Utc>, Uuid);

#[derive(Default)]
pub struct Database {
    users: HashMap<Uuid, User>,
    users_by_email: HashMap<String, Uuid>,
    courses: HashMap<Uuid, Course>,
    papers: HashMap<Uuid, QuestionPaper>,
    questions: HashMap<Uuid, Question>,
    by_status: HashMap<QuestionStatus, BTreeSet<QuestionKey>>,
    by_maker: HashMap<Uuid, BTreeSet<QuestionKey>>,
    by_paper: HashMap<Uuid, BTreeSet<Uuid>>,
    transactions: Vec<WalletTransaction>,
    /// Payout idempotency: request id to the transaction it produced.
    payout_requests: HashMap<Uuid, Uuid>,
    events: Vec<ReviewEvent>,
}

/// Shared handle over the database.
#[derive(Default)]
pub struct Store {
    db: RwLock<Database>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, Database> {
        self.db.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, Database> {
        self.db.write().await
    }
}

// ========== users ==========

impl Database {
    pub fn insert_user(&mut self, user: User) -> AppResult<User> {
        if self.users_by_email.contains_key(&user.email) {
            return Err(AppError::Conflict(format!(
                "a user with email {} already exists",
                user.email
            )));
        }
        self.users_by_email.insert(user.email.clone(), user.id);
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    pub fn user(&self, id: Uuid) -> AppResult<&User> {
        self.users.get(&id).ok_or_else(|| AppError::not_found("user", id))
    }

    pub fn user_mut(&mut self, id: Uuid) -> AppResult<&mut User> {
        self.users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("user", id))
    }

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users_by_email.get(email).and_then(|id| self.users.get(id))
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }
}

// ========== courses ==========

impl Database {
    pub fn insert_course(&mut self, course: Course) -> Course {
        self.courses.insert(course.id, course.clone());
        course
    }

    pub fn course(&self, id: Uuid) -> AppResult<&Course> {
        self.courses
            .get(&id)
            .ok_or_else(|| AppError::not_found("course", id))
    }

    pub fn courses(&self) -> impl Iterator<Item = &Course> {
        self.courses.values()
    }
}

// ========== question papers ==========

impl Database {
    pub fn insert_paper(&mut self, paper: QuestionPaper) -> QuestionPaper {
        self.papers.insert(paper.id, paper.clone());
        paper
    }

    pub fn paper(&self, id: Uuid) -> AppResult<&QuestionPaper> {
        self.papers
            .get(&id)
            .ok_or_else(|| AppError::not_found("question paper", id))
    }

    pub fn paper_mut(&mut self, id: Uuid) -> AppResult<&mut QuestionPaper> {
        self.papers
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("question paper", id))
    }

    pub fn papers(&self) -> impl Iterator<Item = &QuestionPaper> {
        self.papers.values()
    }
}

// ========== questions & indexes ==========

impl Database {
    fn index_question(&mut self, question: &Question) {
        let key = (question.created_at, question.id);
        self.by_status.entry(question.status).or_default().insert(key);
        self.by_maker.entry(question.maker).or_default().insert(key);
        self.by_paper
            .entry(question.question_paper)
            .or_default()
            .insert(question.id);
    }

    fn unindex_question(&mut self, question: &Question) {
        let key = (question.created_at, question.id);
        if let Some(set) = self.by_status.get_mut(&question.status) {
            set.remove(&key);
        }
        if let Some(set) = self.by_maker.get_mut(&question.maker) {
            set.remove(&key);
        }
        if let Some(set) = self.by_paper.get_mut(&question.question_paper) {
            set.remove(&question.id);
        }
    }

    pub fn insert_question(&mut self, question: Question) -> Question {
        self.index_question(&question);
        self.questions.insert(question.id, question.clone());
        question
    }

    /// Replace an existing question, keeping the indexes consistent.
    /// `created_at` is the stable half of the sort key and must not
    /// change across replacements.
    pub fn replace_question(&mut self, question: Question) -> AppResult<Question> {
        let previous = self
            .questions
            .remove(&question.id)
            .ok_or_else(|| AppError::not_found("question", question.id))?;
        self.unindex_question(&previous);
        Ok(self.insert_question(question))
    }

    pub fn remove_question(&mut self, id: Uuid) -> AppResult<Question> {
        let question = self
            .questions
            .remove(&id)
            .ok_or_else(|| AppError::not_found("question", id))?;
        self.unindex_question(&question);
        Ok(question)
    }

    pub fn question(&self, id: Uuid) -> AppResult<&Question> {
        self.questions
            .get(&id)
            .ok_or_else(|| AppError::not_found("question", id))
    }

    /// Questions in one status, newest first.
    pub fn questions_with_status(
        &self,
        status: QuestionStatus,
    ) -> impl Iterator<Item = &Question> {
        self.by_status
            .get(&status)
            .into_iter()
            .flat_map(|set| set.iter().rev())
            .filter_map(|(_, id)| self.questions.get(id))
    }

    /// Questions authored by one maker, newest first.
    pub fn questions_by_maker(&self, maker: Uuid) -> impl Iterator<Item = &Question> {
        self.by_maker
            .get(&maker)
            .into_iter()
            .flat_map(|set| set.iter().rev())
            .filter_map(|(_, id)| self.questions.get(id))
    }

    pub fn questions_on_paper(&self, paper: Uuid) -> impl Iterator<Item = &Question> {
        self.by_paper
            .get(&paper)
            .into_iter()
            .flat_map(|set| set.iter())
            .filter_map(|id| self.questions.get(id))
    }

    pub fn count_with_status(&self, status: QuestionStatus) -> usize {
        self.by_status.get(&status).map_or(0, |set| set.len())
    }
}

// ========== review events ==========

impl Database {
    pub fn record_event(
        &mut self,
        question: &Question,
        actor: Uuid,
        action: ReviewAction,
        fingerprint: Option<String>,
    ) {
        self.events.push(ReviewEvent {
            id: Uuid::new_v4(),
            question: question.id,
            paper: question.question_paper,
            maker: question.maker,
            actor,
            action,
            fingerprint,
            at: Utc::now(),
        });
    }

    pub fn events(&self) -> &[ReviewEvent] {
        &self.events
    }
}

// ========== wallet ledger ==========

impl Database {
    /// Append a ledger entry and update the cached user balance.
    ///
    /// When the entry carries a `request_id` already seen, the original
    /// transaction is returned unchanged and nothing is appended.
    pub fn apply_transaction(
        &mut self,
        transaction: WalletTransaction,
    ) -> AppResult<WalletTransaction> {
        if let Some(request_id) = transaction.request_id {
            if let Some(existing_id) = self.payout_requests.get(&request_id) {
                let existing = self
                    .transactions
                    .iter()
                    .find(|t| t.id == *existing_id)
                    .expect("payout request index points at a recorded transaction");
                return Ok(existing.clone());
            }
            self.payout_requests.insert(request_id, transaction.id);
        }

        let user = self.user_mut(transaction.user)?;
        user.balance += transaction.signed_amount();
        if transaction.signed_amount() > 0 {
            user.total_earned += transaction.amount;
        }
        self.transactions.push(transaction.clone());
        Ok(transaction)
    }

    pub fn transactions_for(&self, user: Uuid) -> impl Iterator<Item = &WalletTransaction> {
        self.transactions.iter().filter(move |t| t.user == user)
    }
}
