//! Payout/report aggregator - services layer
//!
//! Everything here is derived: per-user statistics, dashboard
//! summaries and leaderboards are recomputed from the question set and
//! the append-only review event log, never stored.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{QuestionStatus, ReviewAction, ReviewEvent, Role};
use crate::store::Store;

/// Half-open reporting window; `None` bounds are unbounded.
#[derive(Debug, Clone, Copy, Default)]
pub struct Window {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl Window {
    /// Named timeframe used by the dashboard pages.
    pub fn from_timeframe(timeframe: &str) -> AppResult<Self> {
        let now = Utc::now();
        let start = match timeframe {
            "today" => Some(now - Duration::days(1)),
            "week" => Some(now - Duration::weeks(1)),
            "month" => Some(now - Duration::days(30)),
            "all" => None,
            other => {
                return Err(AppError::validation(
                    "timeframe",
                    format!("unknown timeframe `{other}`"),
                ))
            }
        };
        Ok(Self { start, end: None })
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        if let Some(start) = self.start {
            if at < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if at >= end {
                return false;
            }
        }
        true
    }
}

/// Per-maker performance counters for one window.
#[derive(Debug, Default, Serialize)]
pub struct MakerStats {
    pub created: usize,
    pub approved: usize,
    pub rejected: usize,
    pub drafted: usize,
    /// Questions now Approved/Finalised that were rejected at least
    /// once along the way.
    pub historical_rejections: usize,
    /// Rejections overturned without a content change.
    pub false_rejections: usize,
}

/// Per-checker decision counters for one window.
#[derive(Debug, Default, Serialize)]
pub struct CheckerStats {
    pub reviewed: usize,
    pub approved: usize,
    pub rejected: usize,
    /// Rejections by this checker later overturned unchanged.
    pub false_rejections: usize,
}

#[derive(Debug, Default, Serialize)]
pub struct StatusDistribution {
    pub draft: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub finalised: usize,
}

#[derive(Debug, Serialize)]
pub struct MakerLeaderboardEntry {
    pub user: Uuid,
    pub name: String,
    #[serde(flatten)]
    pub stats: MakerStats,
}

#[derive(Debug, Serialize)]
pub struct CheckerLeaderboardEntry {
    pub user: Uuid,
    pub name: String,
    #[serde(flatten)]
    pub stats: CheckerStats,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub status_distribution: StatusDistribution,
    pub maker_leaderboard: Vec<MakerLeaderboardEntry>,
    pub checker_leaderboard: Vec<CheckerLeaderboardEntry>,
}

pub struct ReportService {
    store: Arc<Store>,
}

impl ReportService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Counters for one maker's dashboard.
    pub async fn maker_stats(&self, maker: Uuid, window: Window) -> AppResult<MakerStats> {
        let db = self.store.read().await;
        db.user(maker)?;

        let mut stats = MakerStats::default();
        for question in db.questions_by_maker(maker) {
            if window.contains(question.created_at) {
                stats.created += 1;
                if question.status == QuestionStatus::Draft {
                    stats.drafted += 1;
                }
            }
        }

        let by_question = events_by_question(db.events());
        for event in db.events() {
            if event.maker != maker || !window.contains(event.at) {
                continue;
            }
            match event.action {
                ReviewAction::Approved => stats.approved += 1,
                ReviewAction::Rejected => stats.rejected += 1,
                _ => {}
            }
        }
        for events in by_question.values() {
            if events.first().map(|e| e.maker) != Some(maker) {
                continue;
            }
            let overturned = overturned_rejections(events);
            stats.false_rejections += overturned
                .iter()
                .filter(|e| window.contains(e.at))
                .count();
            if question_overcame_rejection(events, &window) {
                stats.historical_rejections += 1;
            }
        }

        Ok(stats)
    }

    /// Counters for one checker's dashboard.
    pub async fn checker_stats(&self, checker: Uuid, window: Window) -> AppResult<CheckerStats> {
        let db = self.store.read().await;
        db.user(checker)?;

        let mut stats = CheckerStats::default();
        for event in db.events() {
            if event.actor != checker || !window.contains(event.at) {
                continue;
            }
            match event.action {
                ReviewAction::Approved => stats.approved += 1,
                ReviewAction::Rejected => stats.rejected += 1,
                _ => {}
            }
        }
        stats.reviewed = stats.approved + stats.rejected;

        let by_question = events_by_question(db.events());
        for events in by_question.values() {
            stats.false_rejections += overturned_rejections(events)
                .iter()
                .filter(|e| e.actor == checker && window.contains(e.at))
                .count();
        }

        Ok(stats)
    }

    /// Org-wide dashboard: status distribution plus maker and checker
    /// leaderboards.
    pub async fn dashboard(&self, window: Window) -> DashboardStats {
        let db = self.store.read().await;

        let mut distribution = StatusDistribution::default();
        let mut makers: HashMap<Uuid, MakerStats> = HashMap::new();

        for status in [
            QuestionStatus::Draft,
            QuestionStatus::Pending,
            QuestionStatus::Approved,
            QuestionStatus::Rejected,
            QuestionStatus::Finalised,
        ] {
            for question in db.questions_with_status(status) {
                if !window.contains(question.created_at) {
                    continue;
                }
                match status {
                    QuestionStatus::Draft => distribution.draft += 1,
                    QuestionStatus::Pending => distribution.pending += 1,
                    QuestionStatus::Approved => distribution.approved += 1,
                    QuestionStatus::Rejected => distribution.rejected += 1,
                    QuestionStatus::Finalised => distribution.finalised += 1,
                }
                let entry = makers.entry(question.maker).or_default();
                entry.created += 1;
                if status == QuestionStatus::Draft {
                    entry.drafted += 1;
                }
            }
        }

        let mut checkers: HashMap<Uuid, CheckerStats> = HashMap::new();
        for event in db.events() {
            if !window.contains(event.at) {
                continue;
            }
            match event.action {
                ReviewAction::Approved => {
                    makers.entry(event.maker).or_default().approved += 1;
                    checkers.entry(event.actor).or_default().approved += 1;
                }
                ReviewAction::Rejected => {
                    makers.entry(event.maker).or_default().rejected += 1;
                    checkers.entry(event.actor).or_default().rejected += 1;
                }
                _ => {}
            }
        }

        let by_question = events_by_question(db.events());
        for events in by_question.values() {
            for rejection in overturned_rejections(events) {
                if !window.contains(rejection.at) {
                    continue;
                }
                makers.entry(rejection.maker).or_default().false_rejections += 1;
                checkers.entry(rejection.actor).or_default().false_rejections += 1;
            }
            if question_overcame_rejection(events, &window) {
                if let Some(first) = events.first() {
                    makers.entry(first.maker).or_default().historical_rejections += 1;
                }
            }
        }

        let mut maker_leaderboard: Vec<MakerLeaderboardEntry> = makers
            .into_iter()
            .filter_map(|(id, stats)| {
                let user = db.user(id).ok()?;
                Some(MakerLeaderboardEntry {
                    user: id,
                    name: user.name.clone(),
                    stats,
                })
            })
            .collect();
        maker_leaderboard.sort_by(|a, b| {
            b.stats
                .approved
                .cmp(&a.stats.approved)
                .then_with(|| b.stats.created.cmp(&a.stats.created))
                .then_with(|| a.name.cmp(&b.name))
        });

        let mut checker_leaderboard: Vec<CheckerLeaderboardEntry> = checkers
            .into_iter()
            .filter_map(|(id, mut stats)| {
                let user = db.user(id).ok()?;
                // Experts also emit events; the checker board only
                // ranks checkers.
                if user.role != Role::Checker {
                    return None;
                }
                stats.reviewed = stats.approved + stats.rejected;
                Some(CheckerLeaderboardEntry {
                    user: id,
                    name: user.name.clone(),
                    stats,
                })
            })
            .collect();
        checker_leaderboard.sort_by(|a, b| {
            b.stats
                .reviewed
                .cmp(&a.stats.reviewed)
                .then_with(|| a.name.cmp(&b.name))
        });

        DashboardStats {
            status_distribution: distribution,
            maker_leaderboard,
            checker_leaderboard,
        }
    }
}

fn events_by_question(events: &[ReviewEvent]) -> HashMap<Uuid, Vec<&ReviewEvent>> {
    let mut map: HashMap<Uuid, Vec<&ReviewEvent>> = HashMap::new();
    // The log is append-only, so per-question slices stay chronological.
    for event in events {
        map.entry(event.question).or_default().push(event);
    }
    map
}

/// Rejections later overturned: a Rejected event whose fingerprint
/// reappears on a later Approved event, i.e. the checker's decision was
/// reversed without the maker changing anything.
fn overturned_rejections<'a>(events: &[&'a ReviewEvent]) -> Vec<&'a ReviewEvent> {
    events
        .iter()
        .enumerate()
        .filter(|(i, e)| {
            e.action == ReviewAction::Rejected
                && e.fingerprint.is_some()
                && events[i + 1..].iter().any(|later| {
                    later.action == ReviewAction::Approved
                        && later.fingerprint == e.fingerprint
                })
        })
        .map(|(_, e)| *e)
        .collect()
}

/// Whether the question was rejected at least once and subsequently
/// approved, with the approval inside the window.
fn question_overcame_rejection(events: &[&ReviewEvent], window: &Window) -> bool {
    let mut rejected_seen = false;
    for event in events {
        match event.action {
            ReviewAction::Rejected => rejected_seen = true,
            ReviewAction::Approved if rejected_seen && window.contains(event.at) => {
                return true;
            }
            _ => {}
        }
    }
    false
}
