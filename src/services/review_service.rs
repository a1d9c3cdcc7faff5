//! Review queue - services layer
//!
//! Paginated, filtered views over questions for checkers and experts.
//! Ordering is stable newest-first on `(created_at, id)`, so pages do
//! not skip or duplicate items when questions are inserted
//! concurrently.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::models::{Question, QuestionStatus};
use crate::store::Store;

/// Filters shared by the queue views. Search is a case-insensitive
/// substring match over the question text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueueFilters {
    pub search: Option<String>,
    pub maker: Option<Uuid>,
    pub course: Option<Uuid>,
}

impl QueueFilters {
    fn matches(&self, question: &Question) -> bool {
        if let Some(maker) = self.maker {
            if question.maker != maker {
                return false;
            }
        }
        if let Some(course) = self.course {
            if question.course != course {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            if !needle.is_empty() && !question.question.text.to_lowercase().contains(&needle) {
                return false;
            }
        }
        true
    }
}

/// One page of results plus the pagination envelope the dashboards
/// need.
#[derive(Debug, Serialize)]
pub struct PageOf<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub limit: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

pub struct ReviewQueue {
    store: Arc<Store>,
    default_page_size: usize,
    max_page_size: usize,
}

impl ReviewQueue {
    pub fn new(store: Arc<Store>, config: &Config) -> Self {
        Self {
            store,
            default_page_size: config.default_page_size,
            max_page_size: config.max_page_size,
        }
    }

    /// Pending questions for the checker queue.
    pub async fn pending(
        &self,
        filters: &QueueFilters,
        page: Option<usize>,
        limit: Option<usize>,
    ) -> PageOf<Question> {
        self.list(&[QuestionStatus::Pending], filters, page, limit).await
    }

    /// Already-reviewed questions, for audit.
    pub async fn reviewed(
        &self,
        filters: &QueueFilters,
        page: Option<usize>,
        limit: Option<usize>,
    ) -> PageOf<Question> {
        self.list(
            &[
                QuestionStatus::Approved,
                QuestionStatus::Rejected,
                QuestionStatus::Finalised,
            ],
            filters,
            page,
            limit,
        )
        .await
    }

    /// Approved questions waiting for expert pickup.
    pub async fn awaiting_finalization(
        &self,
        filters: &QueueFilters,
        page: Option<usize>,
        limit: Option<usize>,
    ) -> PageOf<Question> {
        self.list(&[QuestionStatus::Approved], filters, page, limit).await
    }

    async fn list(
        &self,
        statuses: &[QuestionStatus],
        filters: &QueueFilters,
        page: Option<usize>,
        limit: Option<usize>,
    ) -> PageOf<Question> {
        let page = page.unwrap_or(1).max(1);
        let limit = limit
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size);

        let db = self.store.read().await;

        // Each status index is already newest-first; merge and re-sort
        // on the shared key when a view spans several statuses.
        let mut matched: Vec<&Question> = statuses
            .iter()
            .flat_map(|status| db.questions_with_status(*status))
            .filter(|q| filters.matches(q))
            .collect();
        if statuses.len() > 1 {
            matched.sort_by(|a, b| {
                b.created_at
                    .cmp(&a.created_at)
                    .then_with(|| b.id.cmp(&a.id))
            });
        }

        let total_items = matched.len();
        let total_pages = total_items.div_ceil(limit).max(1);
        let items = matched
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .cloned()
            .collect();

        PageOf {
            items,
            page,
            limit,
            total_items,
            total_pages,
        }
    }
}
