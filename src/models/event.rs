use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewAction {
    Submitted,
    Approved,
    Rejected,
    Resubmitted,
    Finalised,
}

/// Append-only audit trail of workflow decisions. The report aggregator
/// derives leaderboards, historical rejections and overturned
/// (false) rejections from this log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewEvent {
    pub id: Uuid,
    pub question: Uuid,
    pub paper: Uuid,
    /// Maker who owns the question (denormalized for reports).
    pub maker: Uuid,
    /// User who performed the action.
    pub actor: Uuid,
    pub action: ReviewAction,
    /// Content fingerprint at the time of the action, where relevant
    /// (rejections and approvals).
    pub fingerprint: Option<String>,
    pub at: DateTime<Utc>,
}
