//! Question paper claims - services layer
//!
//! Enforces single-maker exclusivity over a paper. The claim is a
//! conditional update executed under one store write section, so two
//! makers racing for the same paper are serialized and the loser gets
//! `AlreadyClaimed` rather than a silent overwrite.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{QuestionPaper, User};
use crate::store::Store;

pub struct ClaimService {
    store: Arc<Store>,
}

impl ClaimService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Claim a paper for a maker.
    ///
    /// Check-and-set on `used_by`: succeeds when the paper is
    /// available, is an idempotent no-op when this maker already holds
    /// it, and fails with `AlreadyClaimed` otherwise.
    pub async fn claim(&self, paper_id: Uuid, maker: &User) -> AppResult<QuestionPaper> {
        let mut db = self.store.write().await;
        let paper = db.paper_mut(paper_id)?;

        match paper.used_by {
            None => {
                paper.used_by = Some(maker.id);
                info!("[paper {}] ✓ claimed by {}", paper_id, maker.email);
                Ok(paper.clone())
            }
            Some(holder) if holder == maker.id => Ok(paper.clone()),
            Some(_) => Err(AppError::AlreadyClaimed { paper: paper_id }),
        }
    }

    /// Clear the claim. Admin-only at the API boundary; the state
    /// machine also releases internally when a paper is exhausted.
    pub async fn release(&self, paper_id: Uuid) -> AppResult<QuestionPaper> {
        let mut db = self.store.write().await;
        let paper = db.paper_mut(paper_id)?;
        if paper.used_by.take().is_some() {
            info!("[paper {}] claim released", paper_id);
        }
        Ok(paper.clone())
    }

    /// Papers with no claim holder.
    pub async fn list_available(&self) -> Vec<QuestionPaper> {
        let db = self.store.read().await;
        let mut papers: Vec<QuestionPaper> = db
            .papers()
            .filter(|p| p.is_available() && !p.is_exhausted())
            .cloned()
            .collect();
        papers.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        papers
    }

    /// Papers currently claimed by one maker.
    pub async fn list_claimed_by(&self, maker_id: Uuid) -> Vec<QuestionPaper> {
        let db = self.store.read().await;
        let mut papers: Vec<QuestionPaper> = db
            .papers()
            .filter(|p| p.used_by == Some(maker_id))
            .cloned()
            .collect();
        papers.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        papers
    }

    /// All claimed papers, for the admin view.
    pub async fn list_claimed(&self) -> Vec<QuestionPaper> {
        let db = self.store.read().await;
        let mut papers: Vec<QuestionPaper> = db
            .papers()
            .filter(|p| p.used_by.is_some())
            .cloned()
            .collect();
        papers.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        papers
    }
}
